//! GPU compute backend using WGPU.
//!
//! Launches a kernel's WGSL rendition over a 2D workgroup grid. The device
//! and queue are initialized once (via `lazy_static`) and reused for every
//! dispatch; compiled pipelines are cached by kernel label so a kernel's
//! shader is validated and compiled exactly once per process.
//!
//! A launch is synchronous end to end: buffers are uploaded, one compute
//! pass covering the grid is submitted, and the calling thread blocks on
//! the device until the results have been copied back into the kernel's
//! output buffers. Tensor data crosses the boundary as `f32`.
//!
//! Shader sources pass a `briny`-based validation gate before they reach
//! the WGSL compiler.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use briny::prelude::*;
use thiserror::Error;
use wgpu::util::DeviceExt;

use super::dispatch::group_grid;
use crate::kernel::DeviceKernel;

/// Errors raised while standing up or driving the device.
///
/// These never cross the public dispatch surface; an occurrence aborts the
/// dispatch (environmental failure, no recovery path in scope).
#[derive(Debug, Error)]
pub enum DeviceError {
    /// No usable adapter.
    #[error("adapter request failed: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    /// Adapter found but device creation failed.
    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    /// Kernel source rejected before compilation.
    #[error("kernel `{0}` failed shader source validation")]
    Source(&'static str),
    /// Result copy-back failed.
    #[error("readback failed: {0}")]
    Readback(&'static str),
}

/// Holds the WGPU device and queue used for executing compute pipelines.
///
/// Initialized once globally and reused for all dispatches. Device launches
/// funnel through this single context, which is why concurrent `exec2d`
/// calls must be serialized by the caller.
pub struct GpuContext {
    /// The actual GPU device.
    pub device: wgpu::Device,
    /// Submission queue for the device.
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Selects the default adapter and creates a device + queue.
    ///
    /// Uses `pollster::block_on` to drive WGPU's async setup synchronously;
    /// default limits and no extra features, for broad compatibility.
    pub fn new() -> Result<Self, DeviceError> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(
            instance.request_adapter(&wgpu::RequestAdapterOptions::default()),
        )?;
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        }))?;

        Ok(Self { device, queue })
    }
}

/// Probes for a usable adapter without touching the global context.
///
/// Lets harnesses skip device runs on machines with no GPU instead of
/// aborting inside context initialization.
pub fn available() -> bool {
    let instance = wgpu::Instance::default();
    pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default())).is_ok()
}

/// Secure wrapper for WGSL source code handed over by a kernel.
pub struct WgslSource<'a>(pub &'a str);

impl Validate for WgslSource<'_> {
    fn validate(&self) -> Result<(), ValidationError> {
        let src = self.0;

        // Basic sanity checks
        if src.len() > 65536 {
            return Err(ValidationError);
        }

        if !src.contains("@compute") {
            return Err(ValidationError);
        }

        // Disallow source inclusion and other non-kernel constructs
        let forbidden = ["#include", "asm", "unsafe", "std::"];
        if forbidden.iter().any(|bad| src.contains(bad)) {
            return Err(ValidationError);
        }

        Ok(())
    }
}

#[derive(Clone)]
struct PipelineEntry {
    pipeline: Arc<wgpu::ComputePipeline>,
    layout: Arc<wgpu::BindGroupLayout>,
}

lazy_static::lazy_static! {
    static ref GPU_CONTEXT: GpuContext =
        GpuContext::new().expect("failed to initialize GPU context");
    static ref PIPELINES: Mutex<HashMap<&'static str, PipelineEntry>> =
        Mutex::new(HashMap::new());
}

fn buffer_layout_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Layout for a kernel with `n_inputs` read-only and `n_outputs`
/// read-write storage buffers, after the dims uniform at binding 0.
fn kernel_bind_group_layout(
    device: &wgpu::Device,
    label: &'static str,
    n_inputs: usize,
    n_outputs: usize,
) -> wgpu::BindGroupLayout {
    let mut entries = Vec::with_capacity(1 + n_inputs + n_outputs);
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    });
    for b in 0..n_inputs {
        entries.push(buffer_layout_entry((1 + b) as u32, true));
    }
    for b in 0..n_outputs {
        entries.push(buffer_layout_entry((1 + n_inputs + b) as u32, false));
    }

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}

/// Validates, compiles, and caches the pipeline for a kernel label.
fn pipeline_for(rendition: &DeviceKernel<'_>) -> Result<PipelineEntry, DeviceError> {
    let mut cache = PIPELINES.lock().expect("pipeline cache poisoned");
    if let Some(entry) = cache.get(rendition.label) {
        return Ok(entry.clone());
    }

    WgslSource(rendition.source)
        .validate()
        .map_err(|_| DeviceError::Source(rendition.label))?;

    let device = &GPU_CONTEXT.device;
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(rendition.label),
        source: wgpu::ShaderSource::Wgsl(rendition.source.into()),
    });
    let layout = kernel_bind_group_layout(
        device,
        rendition.label,
        rendition.inputs.len(),
        rendition.outputs.len(),
    );
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(rendition.label),
        bind_group_layouts: &[&layout],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(rendition.label),
        layout: Some(&pipeline_layout),
        module: &module,
        entry_point: Some(rendition.entry),
        cache: None,
        compilation_options: wgpu::PipelineCompilationOptions::default(),
    });

    let entry = PipelineEntry {
        pipeline: Arc::new(pipeline),
        layout: Arc::new(layout),
    };
    cache.insert(rendition.label, entry.clone());
    Ok(entry)
}

fn as_bytes<T: Copy>(data: &[T]) -> &[u8] {
    let len = std::mem::size_of_val(data);
    unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, len) }
}

fn bytes_to_f32_slice(data: &[u8]) -> Result<&[f32], &'static str> {
    use std::mem::{align_of, size_of};

    if data.as_ptr() as usize % align_of::<f32>() != 0 {
        return Err("unaligned buffer");
    }

    if data.len() % size_of::<f32>() != 0 {
        return Err("buffer length is not a multiple of f32");
    }

    let len = data.len() / size_of::<f32>();
    let ptr = data.as_ptr() as *const f32;
    unsafe { Ok(std::slice::from_raw_parts(ptr, len)) }
}

/// Launches one device thread per coordinate of `[0, nx) x [0, ny)`,
/// tiled into 16x16 workgroups, and blocks until the grid completes.
///
/// Outputs are uploaded with their current contents (a kernel may write
/// only part of a buffer), and read back in full once the device signals
/// completion, so every side effect is visible to the caller on return.
pub(crate) fn launch2d(nx: usize, ny: usize, rendition: &DeviceKernel<'_>) -> Result<(), DeviceError> {
    let entry = pipeline_for(rendition)?;
    let device = &GPU_CONTEXT.device;
    let queue = &GPU_CONTEXT.queue;

    let dims = [nx as u32, ny as u32, 0u32, 0u32];
    let dims_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("dims"),
        contents: as_bytes(&dims),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let input_buffers: Vec<wgpu::Buffer> = rendition
        .inputs
        .iter()
        .map(|data| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("input"),
                contents: as_bytes(data),
                usage: wgpu::BufferUsages::STORAGE,
            })
        })
        .collect();

    let output_snapshots: Vec<Vec<f32>> =
        rendition.outputs.iter().map(|buf| buf.snapshot()).collect();
    let output_buffers: Vec<wgpu::Buffer> = output_snapshots
        .iter()
        .map(|data| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("output"),
                contents: as_bytes(data),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            })
        })
        .collect();

    let mut bindings = Vec::with_capacity(1 + input_buffers.len() + output_buffers.len());
    bindings.push(wgpu::BindGroupEntry {
        binding: 0,
        resource: dims_buffer.as_entire_binding(),
    });
    for (b, buffer) in input_buffers.iter().enumerate() {
        bindings.push(wgpu::BindGroupEntry {
            binding: (1 + b) as u32,
            resource: buffer.as_entire_binding(),
        });
    }
    for (b, buffer) in output_buffers.iter().enumerate() {
        bindings.push(wgpu::BindGroupEntry {
            binding: (1 + input_buffers.len() + b) as u32,
            resource: buffer.as_entire_binding(),
        });
    }

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(rendition.label),
        layout: &entry.layout,
        entries: &bindings,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some(rendition.label),
    });

    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(rendition.label),
            timestamp_writes: None,
        });
        pass.set_pipeline(&entry.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        let (gx, gy) = group_grid(nx, ny);
        pass.dispatch_workgroups(gx, gy, 1);
    }

    let staging_buffers: Vec<wgpu::Buffer> = output_snapshots
        .iter()
        .map(|data| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("staging"),
                size: (data.len() * 4) as u64,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        })
        .collect();

    for (output, staging) in output_buffers.iter().zip(&staging_buffers) {
        encoder.copy_buffer_to_buffer(output, 0, staging, 0, staging.size());
    }

    queue.submit(Some(encoder.finish()));

    for staging in &staging_buffers {
        staging.slice(..).map_async(wgpu::MapMode::Read, |_| {});
    }
    device
        .poll(wgpu::PollType::Wait)
        .map_err(|_| DeviceError::Readback("device poll failed"))?;

    for (staging, out) in staging_buffers.iter().zip(&rendition.outputs) {
        let view = staging.slice(..).get_mapped_range();
        out.write_all(bytes_to_f32_slice(&view).map_err(DeviceError::Readback)?);
        drop(view);
        staging.unmap();
    }

    Ok(())
}
