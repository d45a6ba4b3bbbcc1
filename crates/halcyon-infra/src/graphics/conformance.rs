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

//! Cross-backend conformance tests.
//!
//! Every test here runs against both backends through the `halcyon-core`
//! contract alone, so a behavioral divergence between the descriptor-heap
//! and descriptor-set models shows up as a failure in one of the two
//! iterations.

use halcyon_core::rhi::api::*;
use halcyon_core::rhi::error::{ResourceError, SubmitError};
use halcyon_core::rhi::traits::{CommandList, GpuDevice};
use std::borrow::Cow;
use std::sync::Arc;
use std::thread;

use super::create_factory;

const BACKENDS: [BackendKind; 2] = [BackendKind::Dx12, BackendKind::Vulkan];

fn device(backend: BackendKind) -> Arc<dyn GpuDevice> {
    let _ = env_logger::builder().is_test(true).try_init();
    create_factory(backend)
        .create_device(0, &DeviceConfig::default())
        .unwrap()
}

/// A headless drawable for swapchain tests.
struct OffscreenSurface {
    extent: Extent2D,
}

impl SurfaceProvider for OffscreenSurface {
    fn surface_extent(&self) -> Extent2D {
        self.extent
    }
}

fn make_buffer(
    device: &Arc<dyn GpuDevice>,
    size: u64,
    usage: ResourceUsage,
    heap_type: MemoryHeapType,
) -> (ResourceId, MemoryId) {
    let descriptor = ResourceDescriptor::buffer(size, usage);
    let info = device.get_resource_allocation_info(&descriptor);
    let memory = device
        .allocate_memory(&MemoryDescriptor {
            label: None,
            size: info.size,
            alignment: info.alignment,
            heap_type,
            usage: MemoryUsage::BUFFERS,
        })
        .unwrap();
    let resource = device.create_resource(&descriptor).unwrap();
    device.bind_resource_memory(resource, memory, 0).unwrap();
    (resource, memory)
}

fn recorded(
    device: &Arc<dyn GpuDevice>,
    pool: CommandPoolId,
    record: impl FnOnce(&mut dyn CommandList),
) -> Box<dyn CommandList> {
    let mut cmd = device.allocate_command_buffer(pool).unwrap();
    cmd.begin().unwrap();
    record(cmd.as_mut());
    cmd.end().unwrap();
    cmd
}

fn submit_one(
    device: &Arc<dyn GpuDevice>,
    cmd: &dyn CommandList,
    signal_fences: &[FenceOperation],
) -> Result<(), SubmitError> {
    device.submit(
        device.queue(QueueKind::Graphics),
        &SubmitDescriptor {
            command_buffers: Cow::Owned(vec![cmd.handle()]),
            signal_fences: Cow::Owned(signal_fences.to_vec()),
            ..Default::default()
        },
    )
}

#[test]
fn adapter_reports_the_requested_backend() {
    for backend in BACKENDS {
        let device = device(backend);
        assert_eq!(device.adapter_info().backend, backend);
    }
}

#[test]
fn each_queue_kind_is_a_distinct_queue() {
    for backend in BACKENDS {
        let device = device(backend);
        let graphics = device.queue(QueueKind::Graphics);
        let compute = device.queue(QueueKind::Compute);
        let transfer = device.queue(QueueKind::Transfer);
        assert_ne!(graphics, compute);
        assert_ne!(compute, transfer);
        assert_eq!(graphics, device.queue(QueueKind::Graphics));
    }
}

#[test]
fn fence_waits_complete_at_or_past_the_target() {
    for backend in BACKENDS {
        let device = device(backend);
        let fence = device
            .create_fence(&FenceDescriptor {
                label: None,
                initial_value: 5,
            })
            .unwrap();
        assert_eq!(device.fence_value(fence).unwrap(), 5);

        // Already reached: returns without blocking even with a zero timeout.
        let status = device
            .wait_for_fences(
                &WaitDescriptor::one(FenceOperation { fence, value: 3 }),
                0,
            )
            .unwrap();
        assert_eq!(status, WaitStatus::Signaled);

        // Not reached: the timeout elapses and that is not an error.
        let status = device
            .wait_for_fences(
                &WaitDescriptor::one(FenceOperation { fence, value: 6 }),
                2_000_000,
            )
            .unwrap();
        assert_eq!(status, WaitStatus::TimedOut);

        device.destroy_fence(fence).unwrap();
    }
}

#[test]
fn submission_advances_fences_and_wakes_waiters() {
    for backend in BACKENDS {
        let device = device(backend);
        let fence = device.create_fence(&FenceDescriptor::default()).unwrap();
        let pool = device
            .create_command_pool(&CommandPoolDescriptor {
                label: None,
                queue: device.queue(QueueKind::Graphics),
            })
            .unwrap();
        let cmd = recorded(&device, pool, |_| {});

        let waiter = {
            let device = Arc::clone(&device);
            thread::spawn(move || {
                device
                    .wait_for_fences(
                        &WaitDescriptor::one(FenceOperation { fence, value: 1 }),
                        WAIT_INDEFINITE,
                    )
                    .unwrap()
            })
        };

        submit_one(&device, cmd.as_ref(), &[FenceOperation { fence, value: 1 }]).unwrap();
        assert_eq!(waiter.join().unwrap(), WaitStatus::Signaled);
        assert_eq!(device.fence_value(fence).unwrap(), 1);
    }
}

#[test]
fn empty_submission_is_rejected() {
    for backend in BACKENDS {
        let device = device(backend);
        let result = device.submit(
            device.queue(QueueKind::Graphics),
            &SubmitDescriptor::default(),
        );
        assert_eq!(result, Err(SubmitError::EmptySubmit));
    }
}

#[test]
fn waiting_on_an_unsignaled_semaphore_rejects_the_whole_batch() {
    for backend in BACKENDS {
        let device = device(backend);
        let semaphore = device
            .create_semaphore(&SemaphoreDescriptor::default())
            .unwrap();
        let fence = device.create_fence(&FenceDescriptor::default()).unwrap();
        let pool = device
            .create_command_pool(&CommandPoolDescriptor {
                label: None,
                queue: device.queue(QueueKind::Graphics),
            })
            .unwrap();
        let cmd = recorded(&device, pool, |_| {});

        let result = device.submit(
            device.queue(QueueKind::Graphics),
            &SubmitDescriptor {
                wait_semaphores: Cow::Owned(vec![semaphore]),
                command_buffers: Cow::Owned(vec![cmd.handle()]),
                signal_fences: Cow::Owned(vec![FenceOperation { fence, value: 1 }]),
                ..Default::default()
            },
        );
        assert_eq!(result, Err(SubmitError::SemaphoreUnsignaled));

        // The rejected batch left everything untouched.
        assert_eq!(device.fence_value(fence).unwrap(), 0);
        assert_eq!(cmd.state(), CommandBufferState::Executable);
    }
}

#[test]
fn buffer_copy_round_trip() {
    for backend in BACKENDS {
        let device = device(backend);
        let (upload, _) = make_buffer(
            &device,
            256,
            ResourceUsage::COPY_SRC,
            MemoryHeapType::Upload,
        );
        let (readback, _) = make_buffer(
            &device,
            256,
            ResourceUsage::COPY_DST,
            MemoryHeapType::Readback,
        );

        let pattern: Vec<u8> = (0..=255).collect();
        let ptr = device.map_resource(upload).unwrap();
        // SAFETY: the mapping covers the buffer's full 256 bytes.
        unsafe {
            std::ptr::copy_nonoverlapping(pattern.as_ptr(), ptr.as_ptr(), pattern.len());
        }
        device.unmap_resource(upload).unwrap();

        let pool = device
            .create_command_pool(&CommandPoolDescriptor {
                label: None,
                queue: device.queue(QueueKind::Transfer),
            })
            .unwrap();
        let mut cmd = device.allocate_command_buffer(pool).unwrap();
        cmd.begin().unwrap();
        cmd.copy_buffer(
            upload,
            readback,
            &[BufferCopy {
                src_offset: 0,
                dst_offset: 0,
                size: 256,
            }],
        );
        cmd.end().unwrap();

        let fence = device.create_fence(&FenceDescriptor::default()).unwrap();
        device
            .submit(
                device.queue(QueueKind::Transfer),
                &SubmitDescriptor {
                    command_buffers: Cow::Owned(vec![cmd.handle()]),
                    signal_fences: Cow::Owned(vec![FenceOperation { fence, value: 1 }]),
                    ..Default::default()
                },
            )
            .unwrap();
        device
            .wait_for_fences(
                &WaitDescriptor::one(FenceOperation { fence, value: 1 }),
                WAIT_INDEFINITE,
            )
            .unwrap();

        let ptr = device.map_resource(readback).unwrap();
        // SAFETY: same window as above, after the copy retired.
        let copied = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), 256) };
        assert_eq!(copied, pattern.as_slice());
        device.unmap_resource(readback).unwrap();
    }
}

#[test]
fn texture_upload_targets_the_right_mip() {
    for backend in BACKENDS {
        let device = device(backend);

        let mut texture_desc = ResourceDescriptor::texture_2d(
            Format::Rgba8Unorm,
            Extent3D {
                width: 4,
                height: 4,
                depth_or_array_layers: 1,
            },
            ResourceUsage::SHADER_RESOURCE | ResourceUsage::COPY_SRC | ResourceUsage::COPY_DST,
        );
        texture_desc.mip_levels = 2;
        let info = device.get_resource_allocation_info(&texture_desc);
        let memory = device
            .allocate_memory(&MemoryDescriptor {
                label: None,
                size: info.size,
                alignment: info.alignment,
                heap_type: MemoryHeapType::Default,
                usage: MemoryUsage::BUFFERS,
            })
            .unwrap();
        let texture = device.create_resource(&texture_desc).unwrap();
        device.bind_resource_memory(texture, memory, 0).unwrap();

        // Mip 1 of a 4x4 texture is 2x2, 16 bytes.
        let texels: Vec<u8> = (1..=16).collect();
        let (upload, _) = make_buffer(
            &device,
            16,
            ResourceUsage::COPY_SRC,
            MemoryHeapType::Upload,
        );
        let (readback, _) = make_buffer(
            &device,
            16,
            ResourceUsage::COPY_DST,
            MemoryHeapType::Readback,
        );
        let ptr = device.map_resource(upload).unwrap();
        // SAFETY: 16 bytes into a 16-byte mapping.
        unsafe {
            std::ptr::copy_nonoverlapping(texels.as_ptr(), ptr.as_ptr(), texels.len());
        }
        device.unmap_resource(upload).unwrap();

        let region = BufferTextureCopy {
            buffer_offset: 0,
            bytes_per_row: 0,
            mip_level: 1,
            origin: Origin3D::ZERO,
            extent: Extent3D {
                width: 2,
                height: 2,
                depth_or_array_layers: 1,
            },
        };
        let whole_texture = SubresourceRange {
            base_mip: 0,
            mip_count: 2,
            base_layer: 0,
            layer_count: 1,
        };

        let pool = device
            .create_command_pool(&CommandPoolDescriptor {
                label: None,
                queue: device.queue(QueueKind::Graphics),
            })
            .unwrap();
        let mut cmd = device.allocate_command_buffer(pool).unwrap();
        cmd.begin().unwrap();
        cmd.barrier(&BarrierDescriptor::texture(TextureBarrier {
            resource: texture,
            src_stage: StageFlags::TOP_OF_PIPE,
            src_access: AccessFlags::EMPTY,
            src_layout: TextureLayout::Undefined,
            dst_stage: StageFlags::COPY,
            dst_access: AccessFlags::COPY_DST,
            dst_layout: TextureLayout::CopyDst,
            range: whole_texture,
        }));
        cmd.copy_buffer_to_texture(upload, texture, &[region]);
        cmd.barrier(&BarrierDescriptor::texture(TextureBarrier {
            resource: texture,
            src_stage: StageFlags::COPY,
            src_access: AccessFlags::COPY_DST,
            src_layout: TextureLayout::CopyDst,
            dst_stage: StageFlags::COPY,
            dst_access: AccessFlags::COPY_SRC,
            dst_layout: TextureLayout::CopySrc,
            range: whole_texture,
        }));
        cmd.copy_texture_to_buffer(texture, readback, &[region]);
        cmd.end().unwrap();

        let fence = device.create_fence(&FenceDescriptor::default()).unwrap();
        submit_one(&device, cmd.as_ref(), &[FenceOperation { fence, value: 1 }]).unwrap();
        device
            .wait_for_fences(
                &WaitDescriptor::one(FenceOperation { fence, value: 1 }),
                WAIT_INDEFINITE,
            )
            .unwrap();

        let ptr = device.map_resource(readback).unwrap();
        // SAFETY: 16 bytes into a 16-byte mapping, after the copies retired.
        let copied = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), 16) };
        assert_eq!(copied, texels.as_slice());
        device.unmap_resource(readback).unwrap();
    }
}

#[test]
fn binding_offsets_agree_across_backends() {
    let ranges = [
        BindingRange {
            binding_type: BindingType::ConstantBuffer,
            base_register: 0,
            count: 1,
        },
        BindingRange {
            binding_type: BindingType::ShaderResource,
            base_register: 0,
            count: 3,
        },
        BindingRange {
            binding_type: BindingType::UnorderedAccess,
            base_register: 0,
            count: 2,
        },
    ];

    let mut per_backend = Vec::new();
    for backend in BACKENDS {
        let device = device(backend);
        let layout = device
            .create_binding_set_layout(&BindingSetLayoutDescriptor {
                label: None,
                ranges: Cow::Borrowed(&ranges),
                visibility: ShaderStageFlags::GRAPHICS,
            })
            .unwrap();
        let heap = device
            .create_binding_heap(&BindingHeapDescriptor {
                label: None,
                kind: BindingHeapKind::ShaderResource,
                capacity: 64,
            })
            .unwrap();
        let offsets: Vec<u64> = (0..3)
            .map(|index| device.get_binding_offset(heap, layout, index).unwrap())
            .collect();
        // Deterministic for the heap's lifetime.
        assert_eq!(
            offsets[2],
            device.get_binding_offset(heap, layout, 2).unwrap()
        );
        assert_eq!(
            device.get_binding_offset(heap, layout, 3),
            Err(ResourceError::OutOfBounds)
        );
        per_backend.push(offsets);
    }
    assert_eq!(per_backend[0], vec![0, 1, 4]);
    assert_eq!(per_backend[0], per_backend[1]);
}

#[test]
fn sampler_bindings_need_a_sampler_heap() {
    for backend in BACKENDS {
        let device = device(backend);
        let layout = device
            .create_binding_set_layout(&BindingSetLayoutDescriptor {
                label: None,
                ranges: Cow::Owned(vec![BindingRange {
                    binding_type: BindingType::Sampler,
                    base_register: 0,
                    count: 1,
                }]),
                visibility: ShaderStageFlags::FRAGMENT,
            })
            .unwrap();
        let resource_heap = device
            .create_binding_heap(&BindingHeapDescriptor {
                label: None,
                kind: BindingHeapKind::ShaderResource,
                capacity: 8,
            })
            .unwrap();
        let sampler_heap = device
            .create_binding_heap(&BindingHeapDescriptor {
                label: None,
                kind: BindingHeapKind::Sampler,
                capacity: 8,
            })
            .unwrap();
        assert!(device.get_binding_offset(resource_heap, layout, 0).is_err());
        assert_eq!(
            device.get_binding_offset(sampler_heap, layout, 0),
            Ok(0)
        );
    }
}

#[test]
fn command_buffer_lifecycle_and_pool_reset() {
    for backend in BACKENDS {
        let device = device(backend);
        let pool = device
            .create_command_pool(&CommandPoolDescriptor {
                label: None,
                queue: device.queue(QueueKind::Graphics),
            })
            .unwrap();
        let mut cmd = device.allocate_command_buffer(pool).unwrap();
        assert_eq!(cmd.state(), CommandBufferState::Initial);

        cmd.begin().unwrap();
        assert_eq!(cmd.state(), CommandBufferState::Recording);
        cmd.end().unwrap();
        assert_eq!(cmd.state(), CommandBufferState::Executable);

        // Beginning an executable buffer implicitly resets it.
        cmd.begin().unwrap();
        assert_eq!(cmd.state(), CommandBufferState::Recording);
        cmd.end().unwrap();

        submit_one(&device, cmd.as_ref(), &[]).unwrap();
        assert_eq!(cmd.state(), CommandBufferState::Pending);

        device.reset_command_pool(pool).unwrap();
        assert_eq!(cmd.state(), CommandBufferState::Initial);
    }
}

#[test]
fn frame_loop_over_a_headless_swapchain() {
    for backend in BACKENDS {
        let device = device(backend);
        let surface = OffscreenSurface {
            extent: Extent2D {
                width: 64,
                height: 64,
            },
        };
        let swapchain = device
            .create_swapchain(
                &surface,
                &SwapchainDescriptor {
                    label: None,
                    extent: Extent2D::default(),
                    format: Format::Bgra8UnormSrgb,
                    buffer_count: 3,
                    queue: device.queue(QueueKind::Graphics),
                },
            )
            .unwrap();

        let pool = device
            .create_command_pool(&CommandPoolDescriptor {
                label: None,
                queue: device.queue(QueueKind::Graphics),
            })
            .unwrap();
        let render_done = device
            .create_semaphore(&SemaphoreDescriptor::default())
            .unwrap();
        let fence = device.create_fence(&FenceDescriptor::default()).unwrap();

        for frame in 1..=4u64 {
            let acquired = device.acquire_next_frame(swapchain).unwrap();
            let target = device.back_buffer(swapchain, acquired.index).unwrap();

            let cmd = recorded(&device, pool, |cmd| {
                cmd.barrier(&BarrierDescriptor::texture(TextureBarrier {
                    resource: target.resource,
                    src_stage: StageFlags::TOP_OF_PIPE,
                    src_access: AccessFlags::EMPTY,
                    src_layout: TextureLayout::Present,
                    dst_stage: StageFlags::RENDER_TARGET,
                    dst_access: AccessFlags::RENDER_TARGET_WRITE,
                    dst_layout: TextureLayout::RenderTarget,
                    range: SubresourceRange::default(),
                }));
                cmd.begin_rendering(&RenderingDescriptor {
                    colors: Cow::Owned(vec![ColorAttachment {
                        view: target.view,
                        load_op: LoadOp::Clear,
                        store_op: StoreOp::Store,
                        clear: [0.0, 0.0, 0.0, 1.0],
                    }]),
                    depth: None,
                    render_area: surface.extent,
                });
                cmd.end_rendering();
                cmd.barrier(&BarrierDescriptor::texture(TextureBarrier {
                    resource: target.resource,
                    src_stage: StageFlags::RENDER_TARGET,
                    src_access: AccessFlags::RENDER_TARGET_WRITE,
                    src_layout: TextureLayout::RenderTarget,
                    dst_stage: StageFlags::BOTTOM_OF_PIPE,
                    dst_access: AccessFlags::EMPTY,
                    dst_layout: TextureLayout::Present,
                    range: SubresourceRange::default(),
                }));
            });

            device
                .submit(
                    device.queue(QueueKind::Graphics),
                    &SubmitDescriptor {
                        wait_semaphores: Cow::Owned(vec![acquired.available]),
                        command_buffers: Cow::Owned(vec![cmd.handle()]),
                        signal_semaphores: Cow::Owned(vec![render_done]),
                        signal_fences: Cow::Owned(vec![FenceOperation {
                            fence,
                            value: frame,
                        }]),
                        ..Default::default()
                    },
                )
                .unwrap();

            device
                .present(
                    swapchain,
                    &PresentDescriptor {
                        wait_semaphores: Cow::Owned(vec![render_done]),
                    },
                )
                .unwrap();

            device
                .wait_for_fences(
                    &WaitDescriptor::one(FenceOperation {
                        fence,
                        value: frame,
                    }),
                    WAIT_INDEFINITE,
                )
                .unwrap();
            device.reset_command_pool(pool).unwrap();
        }

        // The ring cycles: four frames over three images revisit index 0.
        device.destroy_swapchain(swapchain).unwrap();
    }
}

#[test]
fn device_local_memory_is_accounted() {
    for backend in BACKENDS {
        let device = device(backend);
        assert_eq!(device.used_vram_bytes(), 0);
        let local = device
            .allocate_memory(&MemoryDescriptor {
                label: None,
                size: 1 << 20,
                alignment: 1 << 16,
                heap_type: MemoryHeapType::Default,
                usage: MemoryUsage::BUFFERS,
            })
            .unwrap();
        let before = device.used_vram_bytes();
        assert!(before >= 1 << 20);

        // Host-visible allocations never count against VRAM.
        let upload = device
            .allocate_memory(&MemoryDescriptor {
                label: None,
                size: 1 << 20,
                alignment: 1 << 16,
                heap_type: MemoryHeapType::Upload,
                usage: MemoryUsage::BUFFERS,
            })
            .unwrap();
        assert_eq!(device.used_vram_bytes(), before);

        device.free_memory(local).unwrap();
        assert_eq!(device.used_vram_bytes(), 0);
        device.free_memory(upload).unwrap();
    }
}

#[test]
fn views_require_matching_usage_and_bound_memory() {
    for backend in BACKENDS {
        let device = device(backend);
        let descriptor = ResourceDescriptor::buffer(128, ResourceUsage::CONSTANT);
        let unbound = device.create_resource(&descriptor).unwrap();
        assert_eq!(
            device.create_resource_view(&ResourceViewDescriptor::whole(
                unbound,
                ViewKind::ConstantBuffer,
            )),
            Err(ResourceError::Unbound)
        );

        let (buffer, _) = make_buffer(
            &device,
            128,
            ResourceUsage::CONSTANT,
            MemoryHeapType::Upload,
        );
        let view = device
            .create_resource_view(&ResourceViewDescriptor::whole(
                buffer,
                ViewKind::ConstantBuffer,
            ))
            .unwrap();

        // The buffer never declared storage usage.
        assert!(device
            .create_resource_view(&ResourceViewDescriptor::whole(
                buffer,
                ViewKind::UnorderedAccess,
            ))
            .is_err());

        device.destroy_resource_view(view).unwrap();
        assert_eq!(
            device.destroy_resource_view(view),
            Err(ResourceError::NotFound)
        );
    }
}

#[test]
fn written_bindings_resolve_through_the_queried_offset() {
    let ranges = [
        BindingRange {
            binding_type: BindingType::ConstantBuffer,
            base_register: 0,
            count: 1,
        },
        BindingRange {
            binding_type: BindingType::ShaderResource,
            base_register: 0,
            count: 3,
        },
    ];

    for backend in BACKENDS {
        let device = device(backend);
        let layout = device
            .create_binding_set_layout(&BindingSetLayoutDescriptor {
                label: None,
                ranges: Cow::Borrowed(&ranges),
                visibility: ShaderStageFlags::GRAPHICS,
            })
            .unwrap();
        let heap = device
            .create_binding_heap(&BindingHeapDescriptor {
                label: None,
                kind: BindingHeapKind::ShaderResource,
                capacity: 4,
            })
            .unwrap();

        let (buffer, _) = make_buffer(
            &device,
            256,
            ResourceUsage::CONSTANT | ResourceUsage::SHADER_RESOURCE,
            MemoryHeapType::Default,
        );
        let cbv = device
            .create_resource_view(&ResourceViewDescriptor::whole(
                buffer,
                ViewKind::ConstantBuffer,
            ))
            .unwrap();
        let srv = device
            .create_resource_view(&ResourceViewDescriptor::whole(
                buffer,
                ViewKind::ShaderResource,
            ))
            .unwrap();

        let cbv_offset = device.get_binding_offset(heap, layout, 0).unwrap();
        let srv_offset = device.get_binding_offset(heap, layout, 1).unwrap();
        assert_eq!((cbv_offset, srv_offset), (0, 1));

        // Every slot of a range is addressed from its queried base offset.
        device.write_binding(heap, cbv_offset, cbv).unwrap();
        for slot in 0..3 {
            device.write_binding(heap, srv_offset + slot, srv).unwrap();
        }
        // Rewriting a slot replaces its descriptor.
        device.write_binding(heap, cbv_offset, srv).unwrap();
        device.write_binding(heap, cbv_offset, cbv).unwrap();
        // Past the heap's capacity.
        assert_eq!(
            device.write_binding(heap, 4, cbv),
            Err(ResourceError::OutOfBounds)
        );
        // A dead view never lands in a slot; the previous write stands.
        let stale = device
            .create_resource_view(&ResourceViewDescriptor::whole(
                buffer,
                ViewKind::ShaderResource,
            ))
            .unwrap();
        device.destroy_resource_view(stale).unwrap();
        assert_eq!(
            device.write_binding(heap, cbv_offset, stale),
            Err(ResourceError::NotFound)
        );

        // The recorded bind points set 0 at the queried offset and replays
        // cleanly against the written heap.
        let pipeline_layout = device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: None,
                set_layouts: Cow::Borrowed(&[layout]),
                push_constants: Cow::Borrowed(&[]),
            })
            .unwrap();
        let pool = device
            .create_command_pool(&CommandPoolDescriptor {
                label: None,
                queue: device.queue(QueueKind::Graphics),
            })
            .unwrap();
        let cmd = recorded(&device, pool, |cmd| {
            cmd.set_binding_heaps(&[heap]);
            cmd.set_bindings(0, pipeline_layout, cbv_offset);
        });
        submit_one(&device, cmd.as_ref(), &[]).unwrap();
    }
}

#[test]
fn a_triangle_frame_renders_and_presents() {
    for backend in BACKENDS {
        let device = device(backend);
        let surface = OffscreenSurface {
            extent: Extent2D {
                width: 64,
                height: 64,
            },
        };
        let swapchain = device
            .create_swapchain(
                &surface,
                &SwapchainDescriptor {
                    label: None,
                    extent: Extent2D::default(),
                    format: Format::Bgra8UnormSrgb,
                    buffer_count: 2,
                    queue: device.queue(QueueKind::Graphics),
                },
            )
            .unwrap();

        let (vertices, _) = make_buffer(
            &device,
            3 * 16,
            ResourceUsage::VERTEX,
            MemoryHeapType::Upload,
        );

        let layout = device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: None,
                set_layouts: Cow::Borrowed(&[]),
                push_constants: Cow::Borrowed(&[]),
            })
            .unwrap();
        let vertex_shader = device
            .create_shader_module(&ShaderModuleDescriptor {
                label: None,
                stage: ShaderStage::Vertex,
                entry_point: Cow::Borrowed("vs_main"),
                bytecode: Cow::Owned(vec![0u8; 8]),
                bindings: Cow::Borrowed(&[]),
                vertex_inputs: Cow::Borrowed(&[]),
            })
            .unwrap();
        let fragment_shader = device
            .create_shader_module(&ShaderModuleDescriptor {
                label: None,
                stage: ShaderStage::Fragment,
                entry_point: Cow::Borrowed("fs_main"),
                bytecode: Cow::Owned(vec![0u8; 8]),
                bindings: Cow::Borrowed(&[]),
                vertex_inputs: Cow::Borrowed(&[]),
            })
            .unwrap();
        let pipeline = device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: None,
                layout,
                vertex_shader,
                fragment_shader: Some(fragment_shader),
                vertex_buffers: Cow::Owned(vec![VertexBufferLayout {
                    stride: 16,
                    step_mode: VertexStepMode::Vertex,
                    attributes: Cow::Owned(vec![VertexAttribute {
                        location: 0,
                        offset: 0,
                        format: VertexFormat::Float32x4,
                    }]),
                }]),
                topology: PrimitiveTopology::TriangleList,
                raster: RasterState::default(),
                depth: None,
                blend: BlendState::default(),
                color_formats: Cow::Owned(vec![Format::Bgra8UnormSrgb]),
            })
            .unwrap();

        let pool = device
            .create_command_pool(&CommandPoolDescriptor {
                label: None,
                queue: device.queue(QueueKind::Graphics),
            })
            .unwrap();
        let render_done = device
            .create_semaphore(&SemaphoreDescriptor::default())
            .unwrap();
        let fence = device.create_fence(&FenceDescriptor::default()).unwrap();

        let acquired = device.acquire_next_frame(swapchain).unwrap();
        let target = device.back_buffer(swapchain, acquired.index).unwrap();

        let cmd = recorded(&device, pool, |cmd| {
            cmd.barrier(&BarrierDescriptor::texture(TextureBarrier {
                resource: target.resource,
                src_stage: StageFlags::TOP_OF_PIPE,
                src_access: AccessFlags::EMPTY,
                src_layout: TextureLayout::Present,
                dst_stage: StageFlags::RENDER_TARGET,
                dst_access: AccessFlags::RENDER_TARGET_WRITE,
                dst_layout: TextureLayout::RenderTarget,
                range: SubresourceRange::default(),
            }));
            cmd.begin_rendering(&RenderingDescriptor {
                colors: Cow::Owned(vec![ColorAttachment {
                    view: target.view,
                    load_op: LoadOp::Clear,
                    store_op: StoreOp::Store,
                    clear: [0.1, 0.2, 0.3, 1.0],
                }]),
                depth: None,
                render_area: surface.extent,
            });
            cmd.set_render_pipeline(pipeline);
            cmd.set_vertex_buffers(
                0,
                &[VertexBufferBinding {
                    buffer: vertices,
                    offset: 0,
                }],
            );
            cmd.draw(3, 1, 0, 0);
            cmd.end_rendering();
            cmd.barrier(&BarrierDescriptor::texture(TextureBarrier {
                resource: target.resource,
                src_stage: StageFlags::RENDER_TARGET,
                src_access: AccessFlags::RENDER_TARGET_WRITE,
                src_layout: TextureLayout::RenderTarget,
                dst_stage: StageFlags::BOTTOM_OF_PIPE,
                dst_access: AccessFlags::EMPTY,
                dst_layout: TextureLayout::Present,
                range: SubresourceRange::default(),
            }));
        });

        device
            .submit(
                device.queue(QueueKind::Graphics),
                &SubmitDescriptor {
                    wait_semaphores: Cow::Owned(vec![acquired.available]),
                    command_buffers: Cow::Owned(vec![cmd.handle()]),
                    signal_semaphores: Cow::Owned(vec![render_done]),
                    signal_fences: Cow::Owned(vec![FenceOperation { fence, value: 1 }]),
                    ..Default::default()
                },
            )
            .unwrap();
        device
            .present(
                swapchain,
                &PresentDescriptor {
                    wait_semaphores: Cow::Owned(vec![render_done]),
                },
            )
            .unwrap();
        device
            .wait_for_fences(
                &WaitDescriptor::one(FenceOperation { fence, value: 1 }),
                WAIT_INDEFINITE,
            )
            .unwrap();
        device.destroy_swapchain(swapchain).unwrap();
    }
}

#[test]
fn indexed_draws_and_dispatches_record_through_submit() {
    for backend in BACKENDS {
        let device = device(backend);
        let (vertices, _) = make_buffer(
            &device,
            64,
            ResourceUsage::VERTEX,
            MemoryHeapType::Upload,
        );
        let (indices, _) = make_buffer(
            &device,
            6 * 2,
            ResourceUsage::INDEX,
            MemoryHeapType::Upload,
        );

        let layout = device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: None,
                set_layouts: Cow::Borrowed(&[]),
                push_constants: Cow::Borrowed(&[]),
            })
            .unwrap();
        let vertex_shader = device
            .create_shader_module(&ShaderModuleDescriptor {
                label: None,
                stage: ShaderStage::Vertex,
                entry_point: Cow::Borrowed("vs_main"),
                bytecode: Cow::Owned(vec![0u8; 8]),
                bindings: Cow::Borrowed(&[]),
                vertex_inputs: Cow::Borrowed(&[]),
            })
            .unwrap();
        let render_pipeline = device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: None,
                layout,
                vertex_shader,
                fragment_shader: None,
                vertex_buffers: Cow::Borrowed(&[]),
                topology: PrimitiveTopology::TriangleList,
                raster: RasterState::default(),
                depth: None,
                blend: BlendState::default(),
                color_formats: Cow::Borrowed(&[]),
            })
            .unwrap();
        let compute_shader = device
            .create_shader_module(&ShaderModuleDescriptor {
                label: None,
                stage: ShaderStage::Compute,
                entry_point: Cow::Borrowed("cs_main"),
                bytecode: Cow::Owned(vec![0u8; 8]),
                bindings: Cow::Borrowed(&[]),
                vertex_inputs: Cow::Borrowed(&[]),
            })
            .unwrap();
        let compute_pipeline = device
            .create_compute_pipeline(&ComputePipelineDescriptor {
                label: None,
                layout,
                shader: compute_shader,
            })
            .unwrap();

        let pool = device
            .create_command_pool(&CommandPoolDescriptor {
                label: None,
                queue: device.queue(QueueKind::Graphics),
            })
            .unwrap();
        let cmd = recorded(&device, pool, |cmd| {
            // Dispatches live outside the render bracket.
            cmd.set_compute_pipeline(compute_pipeline);
            cmd.dispatch(4, 4, 1);
            cmd.begin_rendering(&RenderingDescriptor {
                colors: Cow::Borrowed(&[]),
                depth: None,
                render_area: Extent2D {
                    width: 16,
                    height: 16,
                },
            });
            cmd.set_render_pipeline(render_pipeline);
            cmd.set_vertex_buffers(
                0,
                &[VertexBufferBinding {
                    buffer: vertices,
                    offset: 0,
                }],
            );
            cmd.draw(3, 1, 0, 0);
            cmd.set_index_buffer(indices, 0, IndexFormat::Uint16);
            cmd.draw_indexed(6, 1, 0, 0, 0);
            cmd.end_rendering();
        });

        let fence = device.create_fence(&FenceDescriptor::default()).unwrap();
        submit_one(&device, cmd.as_ref(), &[FenceOperation { fence, value: 1 }]).unwrap();
        let status = device
            .wait_for_fences(
                &WaitDescriptor::one(FenceOperation { fence, value: 1 }),
                WAIT_INDEFINITE,
            )
            .unwrap();
        assert_eq!(status, WaitStatus::Signaled);
    }
}

#[test]
fn copy_offsets_near_the_address_limit_are_rejected() {
    for backend in BACKENDS {
        let device = device(backend);
        let (src, _) = make_buffer(
            &device,
            256,
            ResourceUsage::COPY_SRC,
            MemoryHeapType::Upload,
        );
        let (dst, _) = make_buffer(
            &device,
            256,
            ResourceUsage::COPY_DST,
            MemoryHeapType::Upload,
        );
        let pool = device
            .create_command_pool(&CommandPoolDescriptor {
                label: None,
                queue: device.queue(QueueKind::Transfer),
            })
            .unwrap();

        // An offset this close to u64::MAX would wrap a naive end-of-window
        // sum right back into range.
        let cmd = recorded(&device, pool, |cmd| {
            cmd.copy_buffer(
                src,
                dst,
                &[BufferCopy {
                    src_offset: u64::MAX - 1,
                    dst_offset: 0,
                    size: 2,
                }],
            );
        });
        let result = device.submit(
            device.queue(QueueKind::Transfer),
            &SubmitDescriptor {
                command_buffers: Cow::Owned(vec![cmd.handle()]),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(SubmitError::Backend(_))));

        // Binding near the limit must not wrap either.
        let resource = device
            .create_resource(&ResourceDescriptor::buffer(64, ResourceUsage::COPY_SRC))
            .unwrap();
        let memory = device
            .allocate_memory(&MemoryDescriptor {
                label: None,
                size: 256,
                alignment: 256,
                heap_type: MemoryHeapType::Upload,
                usage: MemoryUsage::BUFFERS,
            })
            .unwrap();
        assert_eq!(
            device.bind_resource_memory(resource, memory, u64::MAX - 8),
            Err(ResourceError::OutOfBounds)
        );
    }
}

fn unmap_after_failed_map(backend: BackendKind) {
    let device = device(backend);
    // Device-local memory is not host-visible, so the map must fail and
    // leave the resource unmapped.
    let (buffer, _) = make_buffer(
        &device,
        64,
        ResourceUsage::COPY_SRC,
        MemoryHeapType::Default,
    );
    assert!(device.map_resource(buffer).is_err());
    let _ = device.unmap_resource(buffer);
}

#[test]
#[should_panic(expected = "unmap without a map")]
fn failed_map_leaves_nothing_to_unmap_on_dx12() {
    unmap_after_failed_map(BackendKind::Dx12);
}

#[test]
#[should_panic(expected = "unmap without a map")]
fn failed_map_leaves_nothing_to_unmap_on_vulkan() {
    unmap_after_failed_map(BackendKind::Vulkan);
}

#[test]
fn indirect_draw_arguments_are_bounds_checked_at_execution() {
    for backend in BACKENDS {
        let device = device(backend);
        let (args, _) = make_buffer(
            &device,
            std::mem::size_of::<DrawIndirectArgs>() as u64,
            ResourceUsage::INDIRECT,
            MemoryHeapType::Upload,
        );
        let (vertices, _) = make_buffer(
            &device,
            64,
            ResourceUsage::VERTEX,
            MemoryHeapType::Upload,
        );

        let ptr = device.map_resource(args).unwrap();
        let draw = DrawIndirectArgs {
            vertex_count: 3,
            instance_count: 1,
            first_vertex: 0,
            first_instance: 0,
        };
        // SAFETY: one DrawIndirectArgs into a buffer sized for exactly one.
        unsafe {
            std::ptr::copy_nonoverlapping(
                bytemuck::bytes_of(&draw).as_ptr(),
                ptr.as_ptr(),
                std::mem::size_of::<DrawIndirectArgs>(),
            );
        }
        device.unmap_resource(args).unwrap();

        let layout = device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: None,
                set_layouts: Cow::Borrowed(&[]),
                push_constants: Cow::Borrowed(&[]),
            })
            .unwrap();
        let vertex_shader = device
            .create_shader_module(&ShaderModuleDescriptor {
                label: None,
                stage: ShaderStage::Vertex,
                entry_point: Cow::Borrowed("vs_main"),
                bytecode: Cow::Owned(vec![0u8; 8]),
                bindings: Cow::Borrowed(&[]),
                vertex_inputs: Cow::Borrowed(&[]),
            })
            .unwrap();
        let pipeline = device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: None,
                layout,
                vertex_shader,
                fragment_shader: None,
                vertex_buffers: Cow::Borrowed(&[]),
                topology: PrimitiveTopology::TriangleList,
                raster: RasterState::default(),
                depth: None,
                blend: BlendState::default(),
                color_formats: Cow::Borrowed(&[]),
            })
            .unwrap();

        let pool = device
            .create_command_pool(&CommandPoolDescriptor {
                label: None,
                queue: device.queue(QueueKind::Graphics),
            })
            .unwrap();
        let render = |count: u32| {
            recorded(&device, pool, |cmd| {
                cmd.begin_rendering(&RenderingDescriptor {
                    colors: Cow::Borrowed(&[]),
                    depth: None,
                    render_area: Extent2D {
                        width: 1,
                        height: 1,
                    },
                });
                cmd.set_render_pipeline(pipeline);
                cmd.set_vertex_buffers(
                    0,
                    &[VertexBufferBinding {
                        buffer: vertices,
                        offset: 0,
                    }],
                );
                cmd.execute_indirect(args, 0, count);
                cmd.end_rendering();
            })
        };

        // One draw fits the buffer, two read past its end.
        let good = render(1);
        submit_one(&device, good.as_ref(), &[]).unwrap();
        device.reset_command_pool(pool).unwrap();
        let bad = render(2);
        assert!(matches!(
            submit_one(&device, bad.as_ref(), &[]),
            Err(SubmitError::Backend(_))
        ));
    }
}
