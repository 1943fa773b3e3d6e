//! Hook for UI panels bound to a key.
//!
//! optreg does not ship widgets. A key may carry a [`PanelProvider`] that a
//! front end uses to build an editor for the key's value; the result is an
//! opaque [`Panel`] the front end downcasts to its own widget type.

use std::any::Any;
use std::fmt;

use crate::key::Key;
use crate::store::Store;

/// Opaque handle to a front-end widget.
pub struct Panel(Box<dyn Any + Send>);

impl Panel {
    /// Wrap a widget.
    pub fn new<W: Any + Send>(widget: W) -> Self {
        Self(Box::new(widget))
    }

    /// Borrow the widget as `W`, if it is one.
    pub fn downcast_ref<W: Any>(&self) -> Option<&W> {
        self.0.downcast_ref::<W>()
    }

    /// Take the widget out as `W`, or give the panel back.
    pub fn downcast<W: Any>(self) -> Result<W, Self> {
        match self.0.downcast::<W>() {
            Ok(widget) => Ok(*widget),
            Err(other) => Err(Self(other)),
        }
    }
}

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel").finish_non_exhaustive()
    }
}

/// Builds a [`Panel`] for a key over a store.
pub trait PanelProvider<T>: Send + Sync {
    fn panel(&self, key: &Key<T>, store: &Store) -> Panel;
}

impl<T, F> PanelProvider<T> for F
where
    F: Fn(&Key<T>, &Store) -> Panel + Send + Sync,
{
    fn panel(&self, key: &Key<T>, store: &Store) -> Panel {
        self(key, store)
    }
}
