/*!
This crate provides three smart pointers for unique, shared and observing
ownership, each of which can be empty:

- [`ExclusiveBox<T>`] owns its value alone. It can be empty, ownership can be
  moved out of it with [`take`][ExclusiveBox::take] (leaving it empty), and
  the value can be handed back to the caller with
  [`release`][ExclusiveBox::release].
- [`SharedBox<T>`] is one of a family of handles owning the same value. The
  value is dropped exactly once, when the last handle goes away.
- [`WeakBox<T>`] observes a `SharedBox` family without keeping its value
  alive. It can tell whether the value is gone ([`expired`][WeakBox::expired])
  and try to become an owner again ([`lock`][WeakBox::lock]).

```rust
    use sharebox::{SharedBox, WeakBox};
    use std::cell::Cell;

    let p3 = SharedBox::new(Cell::new(10));
    let p4 = p3.clone();
    p4.set(100);

    // both handles see the same value
    assert_eq!(p3.get(), 100);
    assert_eq!(SharedBox::use_count(&p3), 2);

    let w: WeakBox<_> = SharedBox::downgrade(&p3);
    assert_eq!(w.use_count(), 2);
    drop(p3);
    drop(p4);
    assert!(w.expired());
```

# Uses

## Breaking ownership cycles

A child that must not keep its parent alive stores the parent as a `WeakBox`.
[`Widget`] in this crate does exactly that:

```
    use sharebox::{SharedBox, Widget};

    let root = SharedBox::new(Widget::plain());
    let children: Vec<SharedBox<Widget>> =
        (0..3).map(|_| SharedBox::new(Widget::tabbed())).collect();
    for child in &children {
        child.set_parent(&root);
    }
    for child in &children {
        assert_eq!(child.parent().lock().type_name(), "Widget");
    }

    // the children never owned the root
    assert_eq!(SharedBox::use_count(&root), 1);
    drop(root);
    assert!(children.iter().all(|c| c.parent().expired()));
```

## Moving from unique to shared ownership

A value that started out in an `ExclusiveBox` can be handed over to a
`SharedBox` without being moved or copied:

```
    use sharebox::{ExclusiveBox, SharedBox};

    let mut e = ExclusiveBox::new(String::from("hello"));
    let addr: *const String = &*e;

    let s: SharedBox<String> = ExclusiveBox::take(&mut e).into();
    assert!(ExclusiveBox::is_empty(&e));
    assert!(std::ptr::eq(&*s, addr));
```

# Notes

## Empty handles

Unlike `Box` and `std::rc::Rc`, `ExclusiveBox` and `SharedBox` can be empty:
after `take()`, after `reset()`, or when built with `Default`. Dereferencing
an empty handle panics with [`AccessError::Empty`]. Use `get` or `try_get` to
check first.

Locking an expired `WeakBox` is not an error; it gives an empty `SharedBox`.

## Mutation

A `SharedBox` only hands out shared references, like `std::rc::Rc`. To
mutate through aliases, put a `Cell` or `RefCell` inside it, as in the
examples above. [`SharedBox::get_mut`][shared::SharedBox::get_mut] gives a
mutable reference when there are no other handles at all.

## Methods are associated functions

`ExclusiveBox` and `SharedBox` dereference to `T`, so their own operations
are associated functions (`SharedBox::use_count(&p)`, not `p.use_count()`)
to avoid clashing with `T`'s methods. `WeakBox` does not dereference and
uses normal methods.

## Atomicity

[`SharedBox<T>`] and [`WeakBox<T>`] at the crate root are the
single-threaded flavour from [`rc`], counted with a `Cell<usize>`. The
[`arc`] module has the same types counted with an `AtomicUsize`; they are
`Send` and `Sync` when `T` is, and `lock()` refuses to bring back a value
whose count already reached zero.

Both are aliases for [`shared::SharedBox`] and [`weak::WeakBox`], which are
generic over the [`RefCount`]. This does make the documentation a little
uglier, since it's all on the generic structs instead of the actual types you
normally care about.

## Weak handles keep the counts alive

The value is dropped when the last `SharedBox` goes away, but the small
block holding the counts lives until the last `WeakBox` is gone too. That is
what lets an expired `WeakBox` keep answering `expired()` and `use_count()`
safely.

Cycles of `SharedBox` handles are never freed; break them with `WeakBox`.
*/
#![no_std]
#[cfg(test)]
extern crate std;

extern crate alloc;

pub mod arc;
pub mod count;
pub mod error;
pub mod exclusive;
pub mod rc;
pub mod shared;
pub mod weak;
pub mod widget;

pub use self::arc::Atomic;
pub use self::count::RefCount;
pub use self::error::AccessError;
pub use self::exclusive::ExclusiveBox;
pub use self::rc::{Nonatomic, SharedBox, WeakBox};
pub use self::widget::{Widget, WidgetKind};
