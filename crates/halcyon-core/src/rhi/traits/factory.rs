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

use crate::rhi::api::{AdapterInfo, BackendKind, DeviceConfig};
use crate::rhi::error::DeviceError;
use crate::rhi::traits::GpuDevice;
use std::fmt::Debug;
use std::sync::Arc;

/// The entry point of one backend: enumerates adapters and opens devices.
pub trait GpuFactory: Send + Sync + Debug {
    /// The backend this factory drives.
    fn backend(&self) -> BackendKind;

    /// Lists the adapters the backend can open, best first.
    fn enumerate_adapters(&self) -> Vec<AdapterInfo>;

    /// Opens a device on the given adapter.
    /// ## Errors
    /// * `DeviceError` - If the adapter index is out of range or device
    ///   initialization fails.
    fn create_device(
        &self,
        adapter_index: usize,
        config: &DeviceConfig,
    ) -> Result<Arc<dyn GpuDevice>, DeviceError>;
}
