//! gridexec: compile-time execution-policy dispatch for 2D numerical kernels.
//!
//! A kernel body is written once, per coordinate, and runs either as a
//! vectorized, multi-core CPU loop or as a GPU compute dispatch. The choice
//! is a build-time decision, never a runtime branch: the `gpu` cargo feature
//! selects which backend the [`Active`] policy alias resolves to, and the
//! dispatcher monomorphizes on the policy type so the unused path is never
//! emitted.
//!
//! # Features
//!
//! - Closed family of execution-policy marker types ([`HostParallel`],
//!   `DeviceGpu`), sealed so that an unrecognized policy fails the build.
//! - A generic [`exec2d`] entry point covering a 2D index domain exactly
//!   once, synchronously, under either backend.
//! - Host looping strategies with fork-join parallelism over rows and a
//!   vectorizer-friendly inner loop.
//! - Advisory alignment hints ([`hints`]) that never change semantics.
//!
//! # Modules
//!
//! - [`policy`] — Execution-policy tags and the build-time [`Active`] alias.
//! - [`kernel`] — The [`Kernel2d`] authoring contract and [`KernelBuf`].
//! - [`exec`] — Dispatch entry point plus the host and device backends.
//! - [`hints`] — Semantics-preserving vectorization hints.
//!
//! # Example
//!
//! ```
//! use gridexec::{exec2d, HostParallel, Kernel2d, KernelBuf};
//!
//! struct Fill<'a> {
//!     nx: usize,
//!     out: KernelBuf<'a, f32>,
//! }
//!
//! impl Kernel2d for Fill<'_> {
//!     fn eval(&self, i: usize, j: usize) {
//!         self.out.set(i + j * self.nx, (i * j) as f32);
//!     }
//! #    #[cfg(feature = "gpu")]
//! #    fn device(&self) -> gridexec::DeviceKernel<'_> {
//! #        unimplemented!("host-only example")
//! #    }
//! }
//!
//! let mut data = vec![0.0f32; 8 * 8];
//! let kernel = Fill { nx: 8, out: KernelBuf::new(&mut data) };
//! exec2d::<HostParallel, _>(8, 8, &kernel);
//! assert_eq!(data[2 + 3 * 8], 6.0);
//! ```
//!
//! # Concurrency contract
//!
//! Kernel bodies must be embarrassingly parallel: no ordering is guaranteed
//! between coordinates, and on the host backend different rows run
//! concurrently. Buffers a kernel writes are owned by the caller and shared
//! through [`KernelBuf`]; two coordinates of one dispatch must never write
//! the same element. Concurrent `exec2d` calls from several host threads are
//! not ordered by this crate and must be serialized by the caller when the
//! device backend is in use.

pub mod exec;
pub mod hints;
pub mod kernel;
pub mod policy;

pub use exec::dispatch::{GROUP_DIM, exec2d, group_grid};
#[cfg(feature = "gpu")]
pub use kernel::DeviceKernel;
pub use kernel::{Kernel2d, KernelBuf};
#[cfg(feature = "gpu")]
pub use policy::DeviceGpu;
pub use policy::{Active, ExecutionPolicy, HostParallel};

/// Skips the rest of the kernel body for the current coordinate.
///
/// One spelling for both backends: in a host kernel body this returns from
/// the per-coordinate call, so the loop moves on to the next index, and the
/// WGSL rendition of the same body uses `return` to retire its thread.
///
/// # Example
///
/// ```
/// use gridexec::{Kernel2d, KernelBuf};
///
/// struct EvenOnly<'a> {
///     nx: usize,
///     out: KernelBuf<'a, f32>,
/// }
///
/// impl Kernel2d for EvenOnly<'_> {
///     fn eval(&self, i: usize, j: usize) {
///         if (i + j) % 2 == 1 {
///             gridexec::skip!();
///         }
///         self.out.set(i + j * self.nx, 1.0);
///     }
/// #    #[cfg(feature = "gpu")]
/// #    fn device(&self) -> gridexec::DeviceKernel<'_> {
/// #        unimplemented!("host-only example")
/// #    }
/// }
/// ```
#[macro_export]
macro_rules! skip {
    () => {
        return
    };
}
