//! Policy-resolved kernel dispatch.
//!
//! [`exec2d`] is the single entry point: it monomorphizes on an
//! [`ExecutionPolicy`] type parameter, so the backend choice is made during
//! type checking and only the selected path is compiled into the binary.
//! The host policy iterates the domain inline through
//! [`host::for_each_2d`]; the device policy hands the kernel's WGSL
//! rendition to the launcher in [`crate::exec::device`] with a workgroup
//! grid computed by [`group_grid`].

use super::host;
use crate::kernel::Kernel2d;
#[cfg(feature = "gpu")]
use crate::policy::DeviceGpu;
use crate::policy::{ExecutionPolicy, HostParallel};

/// Side length of a device workgroup; the 2D domain is tiled into
/// `GROUP_DIM x GROUP_DIM` squares. WGSL entry points must declare the
/// matching `@workgroup_size(16, 16)`.
pub const GROUP_DIM: u32 = 16;

/// Workgroup grid covering `[0, nx) x [0, ny)`.
///
/// Rounds up on both axes so partial groups are launched at the domain
/// edge; the threads past the edge are the kernel body's responsibility to
/// retire (bounds check, then `return`).
pub fn group_grid(nx: usize, ny: usize) -> (u32, u32) {
    ((nx as u32).div_ceil(GROUP_DIM), (ny as u32).div_ceil(GROUP_DIM))
}

/// Executes `kernel` over every coordinate of `[0, nx) x [0, ny)` under
/// the policy `P`, returning once all side effects are visible.
///
/// Empty domains dispatch nothing and return immediately. Beyond that
/// there is no runtime failure surface: an unknown policy does not
/// compile, and a device-environment failure aborts the process.
///
/// ```
/// use gridexec::{exec2d, Active, Kernel2d, KernelBuf};
/// # struct Zero<'a> { out: KernelBuf<'a, f32> }
/// # impl Kernel2d for Zero<'_> {
/// #     fn eval(&self, i: usize, j: usize) { self.out.set(i + j * 4, 0.0); }
/// #     #[cfg(feature = "gpu")]
/// #     fn device(&self) -> gridexec::DeviceKernel<'_> { unimplemented!() }
/// # }
/// # let mut data = vec![1.0f32; 16];
/// # let kernel = Zero { out: KernelBuf::new(&mut data) };
/// # #[cfg(not(feature = "gpu"))]
/// exec2d::<Active, _>(4, 4, &kernel);
/// ```
pub fn exec2d<P: ExecutionPolicy, K: Kernel2d>(nx: usize, ny: usize, kernel: &K) {
    if nx == 0 || ny == 0 {
        return;
    }
    P::dispatch2d(nx, ny, kernel);
}

impl ExecutionPolicy for HostParallel {
    const NAME: &'static str = "host-parallel";

    fn dispatch2d<K: Kernel2d>(nx: usize, ny: usize, kernel: &K) {
        host::for_each_2d(nx, ny, |i, j| kernel.eval(i, j));
    }
}

#[cfg(feature = "gpu")]
impl ExecutionPolicy for DeviceGpu {
    const NAME: &'static str = "device";

    fn dispatch2d<K: Kernel2d>(nx: usize, ny: usize, kernel: &K) {
        let rendition = kernel.device();
        // Environmental failures (lost device, rejected shader) have no
        // recovery path at this level; abort with the cause.
        super::device::launch2d(nx, ny, &rendition)
            .expect("device dispatch failed");
    }
}
