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

//! The hierarchy of recoverable error types for the RHI.
//!
//! Only environment failures appear here. Contract violations (misusing the
//! command-buffer state machine, out-of-range indices, double-destroy) are
//! assertions, not error values.

use std::fmt;

/// An error related to the creation, binding, or destruction of a GPU
/// object (memory, resources, views, layouts, heaps, pipelines, shaders).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The native allocation or creation ran out of memory.
    OutOfMemory,
    /// The handle does not resolve to a live object on this device.
    NotFound,
    /// The object exists but is not in a usable state (e.g. a resource that
    /// was never bound to memory).
    Unbound,
    /// An access fell outside the object's range (e.g. binding a resource
    /// past the end of a memory block).
    OutOfBounds,
    /// The native API rejected the operation.
    Backend(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::OutOfMemory => write!(f, "Out of device memory."),
            ResourceError::NotFound => write!(f, "Resource not found for handle."),
            ResourceError::Unbound => {
                write!(f, "Resource is not bound to memory.")
            }
            ResourceError::OutOfBounds => write!(f, "Resource access out of bounds."),
            ResourceError::Backend(msg) => write!(f, "Backend rejected the operation: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {}

/// An error raised by a queue submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// A submission must carry at least one command buffer.
    EmptySubmit,
    /// A listed handle (queue, command buffer, fence, semaphore) does not
    /// resolve, or a command buffer is not in the `Executable` state.
    InvalidHandle,
    /// A waited-on binary semaphore was not signalled. The wait-then-reset
    /// pattern requires single-producer/single-consumer frame pacing; this
    /// error means that precondition was broken.
    SemaphoreUnsignaled,
    /// The device was lost mid-submission.
    DeviceLost,
    /// The native API rejected the submission.
    Backend(String),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::EmptySubmit => {
                write!(f, "A submission with zero command buffers is invalid.")
            }
            SubmitError::InvalidHandle => {
                write!(f, "A handle in the submission does not resolve.")
            }
            SubmitError::SemaphoreUnsignaled => {
                write!(
                    f,
                    "Waited on an unsignalled binary semaphore; the submit/present \
                     pacing contract was violated."
                )
            }
            SubmitError::DeviceLost => write!(f, "The device was lost."),
            SubmitError::Backend(msg) => write!(f, "Backend rejected the submission: {msg}"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// An error raised by swapchain creation, acquisition, or presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapchainError {
    /// Failed to acquire the next back buffer from the presentation engine.
    Acquisition(String),
    /// The present call itself failed.
    Present(String),
    /// A back-buffer resource operation failed during creation or teardown.
    Resource(ResourceError),
    /// The render-complete semaphore handed to `present` was not signalled.
    SemaphoreUnsignaled,
}

impl fmt::Display for SwapchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapchainError::Acquisition(msg) => {
                write!(f, "Failed to acquire a back buffer: {msg}")
            }
            SwapchainError::Present(msg) => write!(f, "Present failed: {msg}"),
            SwapchainError::Resource(err) => {
                write!(f, "Swapchain resource operation failed: {err}")
            }
            SwapchainError::SemaphoreUnsignaled => {
                write!(f, "Present waited on an unsignalled semaphore.")
            }
        }
    }
}

impl std::error::Error for SwapchainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SwapchainError::Resource(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for SwapchainError {
    fn from(err: ResourceError) -> Self {
        SwapchainError::Resource(err)
    }
}

/// A device-level error: initialization, loss, or a wrapped failure from a
/// lower layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The backend failed to initialize a device for the adapter.
    InitializationFailed(String),
    /// The device was lost (driver crash or reset). Catastrophic; requires
    /// recreating the device and everything it owns.
    DeviceLost,
    /// A resource operation failed.
    Resource(ResourceError),
    /// A submission failed.
    Submit(SubmitError),
    /// A swapchain operation failed.
    Swapchain(SwapchainError),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize the device: {msg}")
            }
            DeviceError::DeviceLost => {
                write!(f, "The device was lost and must be recreated.")
            }
            DeviceError::Resource(err) => write!(f, "Resource operation failed: {err}"),
            DeviceError::Submit(err) => write!(f, "Submission failed: {err}"),
            DeviceError::Swapchain(err) => write!(f, "Swapchain operation failed: {err}"),
        }
    }
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeviceError::Resource(err) => Some(err),
            DeviceError::Submit(err) => Some(err),
            DeviceError::Swapchain(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for DeviceError {
    fn from(err: ResourceError) -> Self {
        DeviceError::Resource(err)
    }
}

impl From<SubmitError> for DeviceError {
    fn from(err: SubmitError) -> Self {
        DeviceError::Submit(err)
    }
}

impl From<SwapchainError> for DeviceError {
    fn from(err: SwapchainError) -> Self {
        DeviceError::Swapchain(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn resource_error_display() {
        assert_eq!(
            format!("{}", ResourceError::OutOfMemory),
            "Out of device memory."
        );
        assert_eq!(
            format!("{}", ResourceError::Backend("bad format".to_string())),
            "Backend rejected the operation: bad format"
        );
    }

    #[test]
    fn device_error_wraps_resource_error_with_source() {
        let err: DeviceError = ResourceError::NotFound.into();
        assert_eq!(
            format!("{err}"),
            "Resource operation failed: Resource not found for handle."
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn swapchain_error_chains_to_resource_error() {
        let err: DeviceError = SwapchainError::from(ResourceError::OutOfMemory).into();
        let source = err.source().expect("swapchain source");
        assert!(source.source().is_some());
    }

    #[test]
    fn empty_submit_is_its_own_variant() {
        // Zero command buffers is a distinct, checkable failure, not a
        // generic backend string.
        assert_ne!(
            SubmitError::EmptySubmit,
            SubmitError::Backend(String::new())
        );
    }
}
