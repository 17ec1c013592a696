//! Host looping strategies.
//!
//! These are the CPU expansions of the dispatch contract: instead of one
//! thread per coordinate, the whole domain is iterated on the host with
//! [`rayon`](https://docs.rs/rayon) providing fork-join parallelism across
//! rows. The inner loop is a plain counted loop so the auto-vectorizer can
//! work on it.
//!
//! The body is invoked once per index. Early exit is a `return` from the
//! body (see [`crate::skip!`]), which matches the per-thread `return` of
//! the device rendition.

use rayon::prelude::*;

/// Runs `body` for every `(i, j)` in `[0, nx) x [0, ny)`.
///
/// Rows (`j`) are distributed across cores; within a row, `i` ascends.
/// No ordering is guaranteed between coordinates and distinct rows run
/// concurrently, so `body` must be safe to execute in any interleaving.
/// The call returns only after every worker has joined.
pub fn for_each_2d<F>(nx: usize, ny: usize, body: F)
where
    F: Fn(usize, usize) + Sync,
{
    (0..ny).into_par_iter().for_each(|j| {
        for i in 0..nx {
            body(i, j);
        }
    });
}

/// Runs `body` for every flattened index in `[0, n)`.
///
/// Sequential by design: the 1D form exists for flat passes inside kernel
/// bodies whose outer structure is already parallel, so it only leaves the
/// loop open to vectorization.
pub fn for_each_1d<F>(n: usize, mut body: F)
where
    F: FnMut(usize),
{
    for ij in 0..n {
        body(ij);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn two_d_covers_domain_exactly_once() {
        let nx = 19;
        let ny = 7;
        let cells: Vec<AtomicUsize> = (0..nx * ny).map(|_| AtomicUsize::new(0)).collect();

        for_each_2d(nx, ny, |i, j| {
            cells[i + j * nx].fetch_add(1, Ordering::Relaxed);
        });

        assert!(cells.iter().all(|c| c.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn two_d_empty_axis_never_calls_body() {
        let hits = AtomicUsize::new(0);
        for_each_2d(0, 12, |_, _| {
            hits.fetch_add(1, Ordering::Relaxed);
        });
        for_each_2d(12, 0, |_, _| {
            hits.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(hits.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn one_d_covers_range_in_order() {
        let mut seen = Vec::new();
        for_each_1d(5, |ij| seen.push(ij));
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }
}
