// Copyright 2026 the Halcyon authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Halcyon Core
//!
//! Backend-agnostic Render Hardware Interface (RHI) contracts: opaque
//! handles, descriptor structs, bit-flag sets, error types, and the traits
//! ([`rhi::GpuDevice`], [`rhi::CommandList`], [`rhi::GpuFactory`]) that every
//! backend implements. No backend code lives here; concrete implementations
//! are provided by `halcyon-infra`.

#![warn(missing_docs)]

pub mod rhi;
pub mod utils;
