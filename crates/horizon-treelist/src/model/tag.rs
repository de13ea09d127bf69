//! Opaque user data attached to rows and columns.

use std::any::Any;
use std::fmt;

/// An opaque, type-erased value owned by a row or column.
///
/// The control never looks inside a tag; hosts use it to map rows back to
/// their own items (for example, to remember whether a folder row has
/// already been populated).
pub struct Tag(Box<dyn Any + Send + Sync>);

impl Tag {
    /// Wraps `value` into a tag.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Borrows the value if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Mutably borrows the value if it has type `T`.
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.0.downcast_mut()
    }

    /// Returns `true` if the value has type `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Tag(..)")
    }
}
