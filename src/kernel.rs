//! Kernel authoring contract.
//!
//! A kernel is the caller-supplied per-coordinate computation. It is written
//! once as a type implementing [`Kernel2d`]: the `eval` method is the host
//! body, and (with the `gpu` feature) `device` describes the WGSL rendition
//! of the same body so the dispatcher can launch it on the GPU. The two
//! renditions must agree element-for-element for cross-backend equivalence.
//!
//! Buffers a kernel writes are owned by the caller and passed in as
//! [`KernelBuf`] handles; the dispatcher itself allocates nothing and holds
//! no state across calls.

use core::marker::PhantomData;

/// A kernel body executable over a 2D index domain under any policy.
///
/// `eval` is called once per coordinate; no ordering is guaranteed between
/// coordinates and different rows may run concurrently, so the body must be
/// free of cross-coordinate data dependencies.
pub trait Kernel2d: Sync {
    /// Host body for the coordinate `(i, j)`.
    fn eval(&self, i: usize, j: usize);

    /// Device rendition of the same body.
    ///
    /// The WGSL entry point receives its coordinate from
    /// `global_invocation_id`, must declare `@workgroup_size(16, 16)`, and
    /// must bounds-check against the dims uniform at binding 0 (partial
    /// workgroups launch threads past the domain edge; those threads are
    /// required to `return` before touching memory).
    #[cfg(feature = "gpu")]
    fn device(&self) -> DeviceKernel<'_>;
}

/// Caller-owned buffer shared across the worker threads of one dispatch.
///
/// Built from an exclusive borrow, so for the borrow's duration the
/// dispatch is the only writer. Element access is bounds-checked, but the
/// crate does not police which element each coordinate touches: it is
/// kernel discipline that two coordinates of the same dispatch never write
/// the same element, and that no coordinate reads an element another
/// coordinate writes. Violating that is a data race.
pub struct KernelBuf<'a, T> {
    ptr: *mut T,
    len: usize,
    _owner: PhantomData<&'a mut [T]>,
}

unsafe impl<T: Send + Sync> Send for KernelBuf<'_, T> {}
unsafe impl<T: Send + Sync> Sync for KernelBuf<'_, T> {}

impl<'a, T: Copy> KernelBuf<'a, T> {
    /// Wraps a caller-owned slice for the duration of a dispatch.
    pub fn new(slice: &'a mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _owner: PhantomData,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads the element at `idx`.
    ///
    /// # Panics
    /// If `idx` is out of bounds.
    #[inline]
    pub fn get(&self, idx: usize) -> T {
        assert!(idx < self.len, "kernel read out of bounds: {idx} >= {}", self.len);
        unsafe { self.ptr.add(idx).read() }
    }

    /// Writes the element at `idx`.
    ///
    /// # Panics
    /// If `idx` is out of bounds.
    #[inline]
    pub fn set(&self, idx: usize, value: T) {
        assert!(idx < self.len, "kernel write out of bounds: {idx} >= {}", self.len);
        unsafe { self.ptr.add(idx).write(value) }
    }

    /// Copies the current contents out.
    ///
    /// Only valid while no dispatch is concurrently writing; used to upload
    /// output buffers before a device launch.
    pub fn snapshot(&self) -> Vec<T> {
        // Exclusive borrow held and no dispatch in flight, so this view is
        // unaliased by writers.
        unsafe { core::slice::from_raw_parts(self.ptr, self.len) }.to_vec()
    }

    /// Overwrites the whole buffer; used for device readback.
    ///
    /// # Panics
    /// If `values.len()` differs from the buffer length.
    pub fn write_all(&self, values: &[T]) {
        assert_eq!(values.len(), self.len, "readback length mismatch");
        unsafe {
            core::ptr::copy_nonoverlapping(values.as_ptr(), self.ptr, self.len);
        }
    }
}

/// Description of a kernel's device rendition: WGSL source plus bindings.
///
/// Bindings are laid out in declaration order: the dims uniform at binding
/// 0, then `inputs` as read-only storage, then `outputs` as read-write
/// storage. Every bound buffer must be non-empty. The `label` identifies
/// the compiled pipeline, so one label must always name the same source,
/// entry point, and binding shape.
#[cfg(feature = "gpu")]
pub struct DeviceKernel<'k> {
    /// Pipeline-cache key and debug label.
    pub label: &'static str,
    /// WGSL module source.
    pub source: &'k str,
    /// Compute entry point inside `source`.
    pub entry: &'k str,
    /// Read-only storage buffers, bound after the dims uniform.
    pub inputs: Vec<&'k [f32]>,
    /// Read-write storage buffers, bound after the inputs and read back
    /// into the wrapped slices when the dispatch completes.
    pub outputs: Vec<&'k KernelBuf<'k, f32>>,
}

#[cfg(test)]
mod tests {
    use super::KernelBuf;

    #[test]
    fn get_set_roundtrip() {
        let mut data = vec![0.0f32; 4];
        let buf = KernelBuf::new(&mut data);
        buf.set(2, 7.5);
        assert_eq!(buf.get(2), 7.5);
        assert_eq!(buf.get(0), 0.0);
        assert_eq!(buf.len(), 4);
        assert!(!buf.is_empty());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn set_past_end_panics() {
        let mut data = vec![0.0f32; 4];
        let buf = KernelBuf::new(&mut data);
        buf.set(4, 1.0);
    }

    #[test]
    fn snapshot_and_write_all() {
        let mut data = vec![1.0f32, 2.0, 3.0];
        let buf = KernelBuf::new(&mut data);
        assert_eq!(buf.snapshot(), vec![1.0, 2.0, 3.0]);
        buf.write_all(&[4.0, 5.0, 6.0]);
        assert_eq!(buf.snapshot(), vec![4.0, 5.0, 6.0]);
    }
}
