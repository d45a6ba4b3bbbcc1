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

//! # Halcyon Infra
//!
//! Concrete implementations of the `halcyon-core` RHI contract. One module
//! per backend, each a full execution model with its native binding,
//! synchronization, and barrier vocabulary.

#![warn(missing_docs)]

pub mod graphics;
