//! Shared bookkeeping behind [`SharedPtr`][crate::SharedPtr] and
//! [`WeakPtr`][crate::WeakPtr].
//!
//! Nothing in here is public: handles reach the counters through the
//! `pub(crate)` accessors below, and never destroy the resource from this
//! module.
use alloc::boxed::Box;
use core::{cell::Cell, ptr::NonNull};

// Counts for one resource. No destructors live here: the resource is always
// a `Box<T>` and is destroyed by the strong handle that drives `strong` to
// zero.
pub(crate) struct ControlBlock {
    strong: Cell<usize>,
    weak: Cell<usize>,
    // Set while the last strong handle runs the resource's destructor. Keeps
    // the block alive without showing up in either count.
    destroying: Cell<bool>,
}

impl ControlBlock {
    /// Allocates a block for a freshly adopted resource, with one strong
    /// owner and no weak observers.
    pub(crate) fn allocate() -> NonNull<ControlBlock> {
        let block = NonNull::from(Box::leak(Box::new(ControlBlock {
            strong: Cell::new(1),
            weak: Cell::new(0),
            destroying: Cell::new(false),
        })));
        log::trace!(target: "pointers", "allocated control block {:p}", block);
        block
    }

    /// Deallocates the block.
    ///
    /// # Safety
    /// `block` must come from [`ControlBlock::allocate`], must not be
    /// referenced by any handle, and must not be used afterwards.
    pub(crate) unsafe fn free(block: NonNull<ControlBlock>) {
        debug_assert!(!block.as_ref().is_referenced());
        drop(Box::from_raw(block.as_ptr()));
        log::trace!(target: "pointers", "freed control block {:p}", block);
    }

    pub(crate) fn is_referenced(&self) -> bool {
        self.strong.get() + self.weak.get() > 0 || self.destroying.get()
    }

    pub(crate) fn set_destroying(&self, destroying: bool) {
        self.destroying.set(destroying);
    }

    pub(crate) fn strong(&self) -> usize {
        self.strong.get()
    }

    pub(crate) fn weak(&self) -> usize {
        self.weak.get()
    }

    pub(crate) fn inc_strong(&self) {
        self.strong.set(self.strong.get() + 1);
    }

    // Returns the count left after the decrement.
    pub(crate) fn dec_strong(&self) -> usize {
        let n = self.strong.get();
        debug_assert!(n > 0, "strong count underflow");
        self.strong.set(n - 1);
        n - 1
    }

    pub(crate) fn inc_weak(&self) {
        self.weak.set(self.weak.get() + 1);
    }

    // Returns the count left after the decrement.
    pub(crate) fn dec_weak(&self) -> usize {
        let n = self.weak.get();
        debug_assert!(n > 0, "weak count underflow");
        self.weak.set(n - 1);
        n - 1
    }
}

/// The resource address together with its control block. A non-empty handle
/// holds exactly one of these, so a handle can never carry a resource without
/// a block or the other way round.
pub(crate) struct Link<T: ?Sized> {
    pub(crate) block: NonNull<ControlBlock>,
    pub(crate) ptr: NonNull<T>,
}

impl<T: ?Sized> Link<T> {
    pub(crate) fn block(&self) -> &ControlBlock {
        // Safety: a link only exists inside a handle, and a handle keeps its
        // block alive until it drops the link.
        unsafe { self.block.as_ref() }
    }

    pub(crate) fn same_block(&self, other: &Link<T>) -> bool {
        self.block == other.block
    }

    pub(crate) fn addr(&self) -> *const () {
        self.ptr.as_ptr() as *const ()
    }
}

// Derives would require `T: Copy`.
impl<T: ?Sized> Clone for Link<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Link<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_block() {
        let block = ControlBlock::allocate();
        let b = unsafe { block.as_ref() };
        assert_eq!((b.strong(), b.weak()), (1, 0));
        assert!(b.is_referenced());
        assert_eq!(b.dec_strong(), 0);
        assert!(!b.is_referenced());
        unsafe { ControlBlock::free(block) };
    }

    #[test]
    fn test_weak_keeps_block_referenced() {
        let block = ControlBlock::allocate();
        let b = unsafe { block.as_ref() };
        b.inc_weak();
        b.inc_weak();
        assert_eq!(b.dec_strong(), 0);
        assert!(b.is_referenced());
        assert_eq!(b.dec_weak(), 1);
        assert!(b.is_referenced());
        assert_eq!(b.dec_weak(), 0);
        assert!(!b.is_referenced());
        unsafe { ControlBlock::free(block) };
    }

    #[test]
    fn test_destroying_keeps_block_referenced() {
        let block = ControlBlock::allocate();
        let b = unsafe { block.as_ref() };
        b.inc_weak();
        assert_eq!(b.dec_strong(), 0);
        b.set_destroying(true);
        assert_eq!(b.dec_weak(), 0);
        assert_eq!((b.strong(), b.weak()), (0, 0));
        assert!(b.is_referenced());
        b.set_destroying(false);
        assert!(!b.is_referenced());
        unsafe { ControlBlock::free(block) };
    }
}
