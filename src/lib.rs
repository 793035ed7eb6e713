/*!
This crate provides [`SharedPtr<T>`] and [`WeakPtr<T>`], a hand-rolled pair of
reference-counted handles modeled on C++'s `shared_ptr` and `weak_ptr`.
They do not wrap [`Rc`][alloc::rc::Rc]: the counts live in a separate control
block, next to (not inside) the boxed resource, and both the resource and
the block are freed by hand.

```rust
    use pointers::{SharedPtr, WeakPtr};

    let a = SharedPtr::new(42);
    let b = a.clone();
    let w: WeakPtr<i32> = SharedPtr::downgrade(&a);
    assert_eq!(SharedPtr::strong_count(&a), 2);
    assert_eq!(w.weak_count(), 1);

    drop(a);
    drop(b);
    // the resource is gone, the control block is kept alive by `w`
    assert!(w.expired());
    assert!(w.try_lock().is_none());
```

# Counting rules

Every control block carries two counts:

* `strong`, the number of live `SharedPtr`s. When it reaches zero the
  resource is destroyed.
* `weak`, the number of live `WeakPtr`s. A `WeakPtr` never keeps the resource
  alive, but it does keep the control block alive so that
  [`expired`][WeakPtr::expired] keeps answering correctly.

The control block is freed by whichever handle, strong or weak, drops the
last count. A handle that is reset is always left empty, so resetting twice
is harmless.

Moving a handle never touches the counts. [`SharedPtr::take`] and
[`WeakPtr::take`] move the contents out and leave the original empty, and
[`SharedPtr::move_assign`] moves one handle onto another:

```
    use pointers::SharedPtr;

    let a = SharedPtr::new("tea");
    let mut b = a.clone();
    let mut c = a.clone();
    assert_eq!(SharedPtr::strong_count(&a), 3);

    // `b` and `c` already share the resource, so `c`'s share is dropped
    SharedPtr::move_assign(&mut b, &mut c);
    assert!(SharedPtr::is_empty(&c));
    assert_eq!(SharedPtr::strong_count(&a), 2);
```

# Empty handles

Both handle types can be empty. An empty `SharedPtr` has no control block;
[`SharedPtr::get`] returns `None` and dereferencing it panics. Locking an
empty `WeakPtr` gives an empty `SharedPtr`, but locking a `WeakPtr` whose
resource is already gone is a bug in the caller and panics:

```should_panic
    use pointers::SharedPtr;

    let a = SharedPtr::new(5);
    let w = SharedPtr::downgrade(&a);
    drop(a);
    let _ = w.lock(); // panics: "locked an expired WeakPtr"
```

Use [`WeakPtr::try_lock`] when expiry is expected.

# Equality

Handles compare by identity, not by value. Two `SharedPtr`s are equal when
they share the resource and the control block; all empty handles are equal.
A handle can also be compared against a raw pointer to the resource.

```
    use pointers::SharedPtr;

    let a = SharedPtr::new(1);
    let b = SharedPtr::new(1);
    assert!(a != b);
    assert!(a == a.clone());
    assert!(a == &*a as *const i32);
```

# Mutation

A `SharedPtr` only hands out shared references, since other handles may be
reading the same resource. Use [`SharedPtr::get_mut`] while the handle is the
only one, or put a [`Cell`][core::cell::Cell] or
[`RefCell`][core::cell::RefCell] inside.

# Cycles

Strong cycles are never collected. Point back up a structure with a
`WeakPtr`:

```
    use core::cell::RefCell;
    use pointers::{SharedPtr, WeakPtr};

    struct Node {
        parent: WeakPtr<Node>,
        children: RefCell<Vec<SharedPtr<Node>>>,
    }

    let root = SharedPtr::new(Node {
        parent: WeakPtr::new(),
        children: RefCell::new(vec![]),
    });
    for _ in 0..2 {
        let child = SharedPtr::new(Node {
            parent: SharedPtr::downgrade(&root),
            children: RefCell::new(vec![]),
        });
        root.children.borrow_mut().push(child);
    }
    let parent = root.children.borrow()[0].parent.lock();
    assert!(SharedPtr::ptr_eq(&parent, &root));
```

# Threads

The counts are plain `Cell`s, so neither handle is `Send` or `Sync`:

```compile_fail
    use pointers::SharedPtr;
    fn assert_send<T: Send>(_: T) {}
    assert_send(SharedPtr::new(1));
```

```compile_fail
    use pointers::WeakPtr;
    fn assert_sync<T: Sync>(_: T) {}
    assert_sync(WeakPtr::<i32>::new());
```

# Logging

Allocation and destruction of resources and control blocks are reported
through the [`log`](https://docs.rs/log) facade at `trace` level with target
`pointers`. Nothing is printed unless the application installs a logger.
*/
#![no_std]
#[cfg(test)]
extern crate std;

extern crate alloc;

mod control;
pub mod shared;
pub mod weak;

pub use self::shared::SharedPtr;
pub use self::weak::WeakPtr;
