//! Execution-policy selection module.
//!
//! An execution policy is a compile-time marker naming the backend a kernel
//! dispatch compiles against. The family is closed: [`ExecutionPolicy`] is
//! sealed, so a type outside this module cannot join it, and handing an
//! unrecognized tag to [`crate::exec2d`] is a build error rather than
//! anything that could surface at runtime.
//!
//! # Supported policies
//!
//! - [`HostParallel`] — fork-join parallel CPU loop (always available).
//! - `DeviceGpu` — GPU compute dispatch via `wgpu` (feature `gpu`).
//!
//! Exactly one policy is "the" policy for a build: the [`Active`] alias
//! resolves to `DeviceGpu` when the `gpu` feature is enabled and to
//! [`HostParallel`] otherwise. There is no runtime switch.

use crate::kernel::Kernel2d;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::HostParallel {}
    #[cfg(feature = "gpu")]
    impl Sealed for super::DeviceGpu {}
}

/// Compile-time marker family for kernel execution backends.
///
/// The trait is sealed. A policy tag from outside the family does not
/// implement it, so the dispatcher rejects it during type checking:
///
/// ```compile_fail
/// use gridexec::{exec2d, Kernel2d};
///
/// struct Simd512; // not a member of the policy family
///
/// struct Noop;
/// impl Kernel2d for Noop {
///     fn eval(&self, _i: usize, _j: usize) {}
/// #    #[cfg(feature = "gpu")]
/// #    fn device(&self) -> gridexec::DeviceKernel<'_> {
/// #        unimplemented!()
/// #    }
/// }
///
/// exec2d::<Simd512, _>(4, 4, &Noop);
/// ```
pub trait ExecutionPolicy: sealed::Sealed + 'static {
    /// Backend name, for labels and diagnostics.
    const NAME: &'static str;

    /// Runs `kernel` once per coordinate of `[0, nx) x [0, ny)`.
    ///
    /// Implemented per policy in [`crate::exec::dispatch`]; call through
    /// [`crate::exec2d`], which also handles empty domains.
    fn dispatch2d<K: Kernel2d>(nx: usize, ny: usize, kernel: &K);
}

/// Fork-join parallel CPU backend.
///
/// Dispatch iterates the whole domain on the calling thread's side: rows are
/// spread across cores and the inner loop is left to the auto-vectorizer.
#[derive(Debug, Clone, Copy)]
pub struct HostParallel;

/// GPU compute backend.
///
/// Dispatch launches one device thread per coordinate, tiled into
/// [`crate::GROUP_DIM`]-square workgroups, and blocks until the whole grid
/// has completed.
#[cfg(feature = "gpu")]
#[derive(Debug, Clone, Copy)]
pub struct DeviceGpu;

/// The policy this build was configured for.
#[cfg(feature = "gpu")]
pub type Active = DeviceGpu;

/// The policy this build was configured for.
#[cfg(not(feature = "gpu"))]
pub type Active = HostParallel;
