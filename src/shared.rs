//! `SharedPtr<T>` is the strong, owning handle: while at least one of them is
//! alive the resource is alive, and the last one to let go destroys it.
//!
//! Unlike `std::rc::Rc`, a `SharedPtr` can be empty. Empty handles own no
//! control block, compare equal to each other, and panic when dereferenced.
//!
//! ## See also
//!
//! [`WeakPtr<T>`][crate::WeakPtr] in this crate observes the same resource
//! without keeping it alive.
use alloc::boxed::Box;
use core::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::Deref,
    ptr::{self, NonNull},
};

use crate::control::{ControlBlock, Link};
use crate::weak::WeakPtr;

/// Strong handle over a boxed resource, with the counts kept in a separate
/// control block, like C++'s `shared_ptr`.
pub struct SharedPtr<T: ?Sized> {
    link: Option<Link<T>>,
    // We own a share of `T`, and drop it when the last share goes.
    phantom: PhantomData<T>,
}

impl<T> SharedPtr<T> {
    /// Boxes `value` and takes ownership of it.
    pub fn new(value: T) -> Self {
        SharedPtr::from_box(Box::new(value))
    }
}

impl<T: ?Sized> SharedPtr<T> {
    /// Constructs a handle that owns nothing. No control block is allocated.
    pub const fn empty() -> Self {
        SharedPtr {
            link: None,
            phantom: PhantomData,
        }
    }

    /// Takes ownership of a boxed value. The box allocation is reused as-is;
    /// only the control block is allocated.
    pub fn from_box(value: Box<T>) -> Self {
        let ptr = NonNull::from(Box::leak(value));
        SharedPtr {
            link: Some(Link {
                block: ControlBlock::allocate(),
                ptr,
            }),
            phantom: PhantomData,
        }
    }

    // The caller has already counted this handle in `link.block`.
    pub(crate) fn from_link(link: Link<T>) -> Self {
        SharedPtr {
            link: Some(link),
            phantom: PhantomData,
        }
    }

    pub(crate) fn link(this: &Self) -> Option<Link<T>> {
        this.link
    }

    /// Returns a reference to the resource, or `None` if `this` is empty.
    pub fn get(this: &Self) -> Option<&T> {
        // Safety: while we hold a strong share the resource is alive.
        this.link.as_ref().map(|l| unsafe { l.ptr.as_ref() })
    }

    /// Address of the resource, or `None` if `this` is empty.
    pub fn as_ptr(this: &Self) -> Option<NonNull<T>> {
        this.link.map(|l| l.ptr)
    }

    pub fn is_empty(this: &Self) -> bool {
        this.link.is_none()
    }

    /// Number of live `SharedPtr`s on this resource, or 0 if `this` is empty.
    pub fn strong_count(this: &Self) -> usize {
        this.link.map_or(0, |l| l.block().strong())
    }

    /// Number of live `WeakPtr`s on this resource, or 0 if `this` is empty.
    pub fn weak_count(this: &Self) -> usize {
        this.link.map_or(0, |l| l.block().weak())
    }

    /// Returns true if both handles share one control block. Empty handles
    /// share nothing.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        matches!((this.link, other.link), (Some(a), Some(b)) if a.same_block(&b))
    }

    /// Return a [`WeakPtr`] observing this resource. Downgrading an empty
    /// handle gives an empty `WeakPtr`.
    pub fn downgrade(this: &Self) -> WeakPtr<T> {
        WeakPtr::from(this)
    }

    /// Returns a mutable reference to the resource if `this` is the only
    /// handle of either kind on it.
    pub fn get_mut(this: &mut Self) -> Option<&mut T> {
        let link = this.link?;
        let b = link.block();
        if b.strong() == 1 && b.weak() == 0 {
            // Safety: no other handle can reach the resource.
            Some(unsafe { &mut *link.ptr.as_ptr() })
        } else {
            None
        }
    }

    /// Returns a mutable reference to the resource, without any check on
    /// other handles.
    ///
    /// See also [`get_mut`], which is safe and does appropriate checks.
    ///
    /// [`get_mut`]: SharedPtr::get_mut
    ///
    /// # Safety
    ///
    /// No other `SharedPtr` to the same resource may be dereferenced, and no
    /// `WeakPtr` to it may be locked, for the duration of the returned borrow.
    ///
    /// # Panics
    ///
    /// If `this` is empty.
    pub unsafe fn get_mut_unchecked(this: &mut Self) -> &mut T {
        match this.link {
            Some(link) => &mut *link.ptr.as_ptr(),
            None => empty_deref(),
        }
    }

    /// Drops this handle's share and leaves it empty. The resource is
    /// destroyed if this was the last `SharedPtr`, and the control block is
    /// freed if no `WeakPtr` remains either. Resetting an empty handle does
    /// nothing.
    pub fn reset(this: &mut Self) {
        // Detach first, so `this` is already empty if the resource's
        // destructor finds its way back here.
        let Some(link) = this.link.take() else {
            return;
        };
        let block = link.block();
        if block.dec_strong() != 0 {
            return;
        }

        // Last strong share. The resource may own weak handles to its own
        // block, so the block must outlive the destructor.
        block.set_destroying(true);
        // Safety: `ptr` came from `Box::leak` in `from_box`, and no strong
        // share is left to observe it.
        unsafe { drop(Box::from_raw(link.ptr.as_ptr())) };
        log::trace!(target: "pointers", "destroyed resource {:p}", link.ptr);
        block.set_destroying(false);

        if !block.is_referenced() {
            // Safety: both counts are zero, and we already detached our link.
            unsafe { ControlBlock::free(link.block) };
        }
    }

    /// Moves the contents out, leaving `this` empty. Counts are unchanged.
    pub fn take(this: &mut Self) -> Self {
        SharedPtr {
            link: this.link.take(),
            phantom: PhantomData,
        }
    }

    /// Moves `source` into `this`, leaving `source` empty.
    ///
    /// If both already share one control block, `this` keeps its own share
    /// and the source's share is dropped, so the strong count falls by one.
    /// Otherwise `this` lets go of whatever it held and takes over the
    /// source's share without touching any count.
    pub fn move_assign(this: &mut Self, source: &mut Self) {
        match (this.link, source.link) {
            (Some(dst), Some(src)) if dst.same_block(&src) => SharedPtr::reset(source),
            _ => *this = SharedPtr::take(source),
        }
    }

    fn resource_addr(this: &Self) -> *const () {
        this.link.map_or(ptr::null(), |l| l.addr())
    }
}

#[cold]
#[track_caller]
fn empty_deref() -> ! {
    panic!("dereferenced an empty SharedPtr")
}

impl<T: ?Sized> Clone for SharedPtr<T> {
    fn clone(&self) -> Self {
        if let Some(link) = self.link {
            link.block().inc_strong();
        }
        SharedPtr {
            link: self.link,
            phantom: PhantomData,
        }
    }

    // Take the new share before dropping the old one: the old resource may be
    // what keeps `source` alive.
    fn clone_from(&mut self, source: &Self) {
        *self = source.clone();
    }
}

impl<T: ?Sized> Default for SharedPtr<T> {
    fn default() -> Self {
        SharedPtr::empty()
    }
}

impl<T: ?Sized> Deref for SharedPtr<T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        match SharedPtr::get(self) {
            Some(value) => value,
            None => empty_deref(),
        }
    }
}

impl<T: ?Sized> Drop for SharedPtr<T> {
    fn drop(&mut self) {
        SharedPtr::reset(self);
    }
}

impl<T: ?Sized> From<Box<T>> for SharedPtr<T> {
    fn from(value: Box<T>) -> Self {
        SharedPtr::from_box(value)
    }
}

/// `None` gives an empty handle.
impl<T: ?Sized> From<Option<Box<T>>> for SharedPtr<T> {
    fn from(value: Option<Box<T>>) -> Self {
        value.map_or_else(SharedPtr::empty, SharedPtr::from_box)
    }
}

/// Identity, not value: equal handles share both the resource and the
/// control block.
impl<T: ?Sized> PartialEq for SharedPtr<T> {
    fn eq(&self, other: &SharedPtr<T>) -> bool {
        match (self.link, other.link) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_block(&b) && a.addr() == b.addr(),
            _ => false,
        }
    }
}

impl<T: ?Sized> Eq for SharedPtr<T> {}

/// Compares the resource address only. An empty handle equals null.
impl<T: ?Sized> PartialEq<*const T> for SharedPtr<T> {
    fn eq(&self, other: &*const T) -> bool {
        SharedPtr::resource_addr(self) == *other as *const ()
    }
}

impl<T: ?Sized> Hash for SharedPtr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.link
            .map(|l| (l.block.as_ptr() as *const (), l.addr()))
            .hash(state)
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for SharedPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match SharedPtr::get(self) {
            Some(value) => fmt::Debug::fmt(value, f),
            None => f.write_str("(empty)"),
        }
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for SharedPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match SharedPtr::get(self) {
            Some(value) => fmt::Display::fmt(value, f),
            None => f.write_str("(empty)"),
        }
    }
}

impl<T: ?Sized> fmt::Pointer for SharedPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&SharedPtr::resource_addr(self), f)
    }
}
