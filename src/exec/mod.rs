//! # Kernel dispatch layer
//!
//! This module turns a [`crate::Kernel2d`] plus a pair of extents into
//! actual execution on the backend a policy tag names.
//!
//! ## Submodules
//!
//! - [`dispatch`] — The [`dispatch::exec2d`] entry point, workgroup-grid
//!   math, and the per-policy dispatch implementations.
//! - [`host`] — Looping strategies for the CPU: fork-join parallel 2D
//!   iteration and a sequential, vectorizer-friendly 1D loop.
//! - [`device`] *(feature `gpu`)* — wgpu compute plumbing: context, shader
//!   validation, pipeline cache, buffer upload/readback.
//!
//! ## Execution models
//!
//! The host path runs the kernel body inline: the calling thread forks
//! workers for the row range and joins before returning. The device path
//! records one compute pass covering the domain with 16x16 workgroups,
//! submits it, and blocks until the device signals completion. Both paths
//! are synchronous at the call boundary: every side effect of the kernel is
//! visible when `exec2d` returns.
//!
//! ## Failure
//!
//! There is no runtime error surface. Policy misuse is a build error, and a
//! device-environment failure (lost adapter, rejected shader) aborts the
//! process rather than returning.

pub mod dispatch;
#[cfg(feature = "gpu")]
pub mod device;
pub mod host;
