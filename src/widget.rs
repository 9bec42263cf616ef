//! A toy widget hierarchy built on [`SharedBox`] and [`WeakBox`].
//!
//! Children point at their parent through a `WeakBox`, so a parent is never
//! kept alive by its children:
//!
//! ```
//! use sharebox::{SharedBox, Widget};
//!
//! let root = SharedBox::new(Widget::plain());
//! let tab = SharedBox::new(Widget::tabbed());
//! tab.set_parent(&root);
//! assert_eq!(tab.parent().lock().type_name(), "Widget");
//!
//! drop(root);
//! assert!(tab.parent().expired());
//! ```
use core::{cell::RefCell, fmt};

use crate::rc::{SharedBox, WeakBox};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Plain,
    Tabbed,
    Calendar,
}

impl WidgetKind {
    pub const fn label(self) -> &'static str {
        match self {
            WidgetKind::Plain => "Widget",
            WidgetKind::Tabbed => "TabWidget",
            WidgetKind::Calendar => "CalendarWidget",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub struct Widget {
    kind: WidgetKind,
    // set through a shared handle, hence the RefCell
    parent: RefCell<WeakBox<Widget>>,
}

impl Widget {
    pub fn new(kind: WidgetKind) -> Self {
        Widget {
            kind,
            parent: RefCell::new(WeakBox::new()),
        }
    }

    pub fn plain() -> Self {
        Widget::new(WidgetKind::Plain)
    }

    pub fn tabbed() -> Self {
        Widget::new(WidgetKind::Tabbed)
    }

    pub fn calendar() -> Self {
        Widget::new(WidgetKind::Calendar)
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.label()
    }

    /// Makes `parent` this widget's parent without keeping it alive.
    pub fn set_parent(&self, parent: &SharedBox<Widget>) {
        *self.parent.borrow_mut() = SharedBox::downgrade(parent);
    }

    pub fn clear_parent(&self) {
        *self.parent.borrow_mut() = WeakBox::new();
    }

    /// The parent link. It is expired if no parent was set or the parent has
    /// been dropped.
    pub fn parent(&self) -> WeakBox<Widget> {
        self.parent.borrow().clone()
    }
}

impl Drop for Widget {
    fn drop(&mut self) {
        log::debug!("{} dropped", self.kind);
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("kind", &self.kind)
            .field("has_parent", &!self.parent.borrow().expired())
            .finish()
    }
}
