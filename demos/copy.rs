//! Sample driver: a 1024x1024 identity copy dispatched through whichever
//! policy this build selected. Run with `--features gpu` to send the same
//! kernel through the device backend.

#[cfg(feature = "gpu")]
use gridexec::DeviceKernel;
use gridexec::{Active, ExecutionPolicy, Kernel2d, KernelBuf, exec2d, hints};

const NX: usize = 1024;
const NY: usize = 1024;

#[cfg(feature = "gpu")]
const COPY_WGSL: &str = r#"
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

struct SampleCopy<'a> {
    nx: usize,
    f: &'a [f32],
    fn_out: KernelBuf<'a, f32>,
}

impl Kernel2d for SampleCopy<'_> {
    fn eval(&self, i: usize, j: usize) {
        let ij = i + j * self.nx;
        self.fn_out.set(ij, self.f[ij]);
    }

    #[cfg(feature = "gpu")]
    fn device(&self) -> DeviceKernel<'_> {
        DeviceKernel {
            label: "sample_copy",
            source: COPY_WGSL,
            entry: "main",
            inputs: vec![self.f],
            outputs: vec![&self.fn_out],
        }
    }
}

fn main() {
    let f: Vec<f32> = (0..NX * NY).map(|ij| ij as f32).collect();
    let mut fn_out = vec![0.0f32; NX * NY];

    hints::assume_mul64(NX);
    hints::assume_mul64(NY);

    let kernel = SampleCopy {
        nx: NX,
        f: &f,
        fn_out: KernelBuf::new(&mut fn_out),
    };
    exec2d::<Active, _>(NX, NY, &kernel);
    drop(kernel);

    assert_eq!(f, fn_out);
    println!("copied {NX}x{NY} elements on the {} backend", Active::NAME);
}
