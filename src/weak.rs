//! `WeakPtr<T>` observes a resource owned by [`SharedPtr`]s without keeping
//! it alive. It does keep the control block alive, so it can always tell
//! whether the resource is still there.
use core::fmt;
use core::ptr::NonNull;

use crate::control::{ControlBlock, Link};
use crate::shared::SharedPtr;

/// Weak handle, like C++'s `weak_ptr`.
///
/// A `WeakPtr` is made from a [`SharedPtr`] (see [`SharedPtr::downgrade`])
/// or by cloning another `WeakPtr`. Call [`lock`][WeakPtr::lock] to get a
/// strong handle back while the resource lives.
pub struct WeakPtr<T: ?Sized> {
    link: Option<Link<T>>,
}

impl<T: ?Sized> WeakPtr<T> {
    /// Constructs a weak handle that observes nothing.
    pub const fn new() -> Self {
        WeakPtr { link: None }
    }

    /// Returns true if the observed resource is gone, or if there never was
    /// one.
    pub fn expired(&self) -> bool {
        self.link.map_or(true, |l| l.block().strong() == 0)
    }

    /// Returns a new strong handle on the observed resource.
    ///
    /// An empty `WeakPtr` gives an empty `SharedPtr`.
    ///
    /// # Panics
    ///
    /// If the resource has already been destroyed. Check
    /// [`expired`][WeakPtr::expired] first, or use
    /// [`try_lock`][WeakPtr::try_lock].
    #[track_caller]
    pub fn lock(&self) -> SharedPtr<T> {
        let Some(link) = self.link else {
            return SharedPtr::empty();
        };
        assert!(link.block().strong() != 0, "locked an expired WeakPtr");
        link.block().inc_strong();
        SharedPtr::from_link(link)
    }

    /// Like [`lock`][WeakPtr::lock], but returns `None` instead of panicking
    /// when expired. Also `None` for an empty `WeakPtr`.
    pub fn try_lock(&self) -> Option<SharedPtr<T>> {
        if self.expired() {
            None
        } else {
            Some(self.lock())
        }
    }

    /// Number of live `SharedPtr`s on the observed resource.
    pub fn strong_count(&self) -> usize {
        self.link.map_or(0, |l| l.block().strong())
    }

    /// Number of live `WeakPtr`s on the observed resource, this one included.
    pub fn weak_count(&self) -> usize {
        self.link.map_or(0, |l| l.block().weak())
    }

    pub fn is_empty(&self) -> bool {
        self.link.is_none()
    }

    /// Address of the observed resource. It is still reported after the
    /// resource has been destroyed, and must not be dereferenced then.
    pub fn as_ptr(&self) -> Option<NonNull<T>> {
        self.link.map(|l| l.ptr)
    }

    /// Drops this handle's weak share and leaves it empty. Frees the control
    /// block if nothing else refers to it.
    pub fn reset(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };
        let block = link.block();
        block.dec_weak();
        if !block.is_referenced() {
            // Safety: both counts are zero, and we already detached our link.
            unsafe { ControlBlock::free(link.block) };
        }
    }

    /// Moves the contents out, leaving `self` empty. Counts are unchanged.
    pub fn take(&mut self) -> Self {
        WeakPtr {
            link: self.link.take(),
        }
    }

    /// Drops whatever `self` observed, then takes over `source`'s share,
    /// leaving `source` empty.
    pub fn move_assign(&mut self, source: &mut Self) {
        self.reset();
        self.link = source.link.take();
    }
}

impl<T: ?Sized> From<&SharedPtr<T>> for WeakPtr<T> {
    fn from(shared: &SharedPtr<T>) -> Self {
        let link = SharedPtr::link(shared);
        if let Some(link) = link {
            link.block().inc_weak();
        }
        WeakPtr { link }
    }
}

impl<T: ?Sized> Clone for WeakPtr<T> {
    fn clone(&self) -> Self {
        if let Some(link) = self.link {
            link.block().inc_weak();
        }
        WeakPtr { link: self.link }
    }

    fn clone_from(&mut self, source: &Self) {
        *self = source.clone();
    }
}

impl<T: ?Sized> Default for WeakPtr<T> {
    fn default() -> Self {
        WeakPtr::new()
    }
}

impl<T: ?Sized> Drop for WeakPtr<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T: ?Sized> fmt::Debug for WeakPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Weak)")
    }
}
