//! Variable<T>: a typed, copyable handle to a data cell.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use slotmap::new_key_type;

new_key_type! {
    /// Untyped identifier of a variable cell in the [`DataGraph`](super::DataGraph).
    pub struct VarId;
}

/// Copyable handle to a variable cell holding a `T`.
///
/// The cell belongs to the tree node that declared it and dies with that
/// node; using the handle afterwards panics.
pub struct Variable<T: 'static> {
    id: VarId,
    _marker: PhantomData<fn() -> T>,
}

// Manual impls so we don't require T: Copy/Clone/Eq for the handle itself.
impl<T: 'static> Copy for Variable<T> {}
impl<T: 'static> Clone for Variable<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> PartialEq for Variable<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: 'static> Eq for Variable<T> {}

impl<T: 'static> Hash for Variable<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: 'static> fmt::Debug for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("id", &self.id)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: 'static> Variable<T> {
    pub(crate) fn from_id(id: VarId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// The untyped id of the cell.
    pub fn id(&self) -> VarId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn handle_is_copy_without_clone_bound() {
        struct NotClone;
        let mut ids: SlotMap<VarId, ()> = SlotMap::with_key();
        let v: Variable<NotClone> = Variable::from_id(ids.insert(()));
        let w = v;
        assert_eq!(v, w);
        assert_eq!(v.id(), w.id());
    }

    #[test]
    fn debug_names_type() {
        let mut ids: SlotMap<VarId, ()> = SlotMap::with_key();
        let v: Variable<u32> = Variable::from_id(ids.insert(()));
        assert!(format!("{v:?}").contains("u32"));
    }
}
