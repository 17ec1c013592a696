//! Advisory vectorization hints.
//!
//! Ports of the alignment/assumption annotations some vendor compilers
//! accept on hot loops. They are pure performance hints: under the `simd`
//! feature on x86_64 they verify the stated promise in debug builds, and
//! everywhere else they compile to nothing. They never change program
//! semantics and are always safe to leave out.

/// Promises that `ptr` is 64-byte aligned.
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
#[inline(always)]
pub fn assume_aligned64<T>(ptr: *const T) {
    debug_assert_eq!(ptr as usize % 64, 0, "pointer is not 64-byte aligned");
}

/// Promises that `ptr` is 64-byte aligned. No-op on this configuration.
#[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
#[inline(always)]
pub fn assume_aligned64<T>(_ptr: *const T) {}

/// Promises that `n` is a multiple of 64.
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
#[inline(always)]
pub fn assume_mul64(n: usize) {
    debug_assert_eq!(n % 64, 0, "extent is not a multiple of 64");
}

/// Promises that `n` is a multiple of 64. No-op on this configuration.
#[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
#[inline(always)]
pub fn assume_mul64(_n: usize) {}
