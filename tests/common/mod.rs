//! Kernels shared by the dispatch test suites: each one is written the way
//! a downstream kernel author would write it, with a host body and (under
//! the `gpu` feature) a WGSL rendition of the same computation.

#![allow(dead_code)]

#[cfg(feature = "gpu")]
use gridexec::DeviceKernel;
use gridexec::{Kernel2d, KernelBuf};

pub const COPY_WGSL: &str = r#"
struct Dims {
    nx: u32,
    ny: u32,
    pad0: u32,
    pad1: u32,
}

@group(0) @binding(0) var<uniform> dims: Dims;
@group(0) @binding(1) var<storage, read> f: array<f32>;
@group(0) @binding(2) var<storage, read_write> fn_out: array<f32>;

@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    let i = gid.x;
    let j = gid.y;
    if (i >= dims.nx || j >= dims.ny) {
        return;
    }
    let ij = i + j * dims.nx;
    fn_out[ij] = f[ij];
}
"#;

pub const VISIT_WGSL: &str = r#"
struct Dims {
    nx: u32,
    ny: u32,
    pad0: u32,
    pad1: u32,
}

@group(0) @binding(0) var<uniform> dims: Dims;
@group(0) @binding(1) var<storage, read_write> visits: array<f32>;

@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    let i = gid.x;
    let j = gid.y;
    if (i >= dims.nx || j >= dims.ny) {
        return;
    }
    let ij = i + j * dims.nx;
    visits[ij] = visits[ij] + 1.0;
}
"#;

/// Identity copy from `f` into `fn` (the 1024x1024 scenario kernel).
pub struct CopyKernel<'a> {
    pub nx: usize,
    pub f: &'a [f32],
    pub fn_out: KernelBuf<'a, f32>,
}

impl Kernel2d for CopyKernel<'_> {
    fn eval(&self, i: usize, j: usize) {
        let ij = i + j * self.nx;
        self.fn_out.set(ij, self.f[ij]);
    }

    #[cfg(feature = "gpu")]
    fn device(&self) -> DeviceKernel<'_> {
        DeviceKernel {
            label: "copy",
            source: COPY_WGSL,
            entry: "main",
            inputs: vec![self.f],
            outputs: vec![&self.fn_out],
        }
    }
}

/// Increments its own cell once per visit, so a full dispatch over a
/// zeroed buffer leaves every cell at exactly 1.0.
pub struct VisitKernel<'a> {
    pub nx: usize,
    pub visits: KernelBuf<'a, f32>,
}

impl Kernel2d for VisitKernel<'_> {
    fn eval(&self, i: usize, j: usize) {
        let ij = i + j * self.nx;
        self.visits.set(ij, self.visits.get(ij) + 1.0);
    }

    #[cfg(feature = "gpu")]
    fn device(&self) -> DeviceKernel<'_> {
        DeviceKernel {
            label: "visit",
            source: VISIT_WGSL,
            entry: "main",
            inputs: vec![],
            outputs: vec![&self.visits],
        }
    }
}
