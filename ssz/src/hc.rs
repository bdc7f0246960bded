use core::{
    cell::Cell,
    ops::{Deref, DerefMut},
};

use ethereum_types::H256;

use crate::{persistent_list::PersistentList, porcelain::SszHash};

/// "Hashed container": wraps a value together with a lazily computed, cached
/// [`hash_tree_root`](SszHash::hash_tree_root). Any mutable access through [`DerefMut`]
/// invalidates the cache; read-only access through [`Deref`] never does. This gives the
/// dirty-subtree behavior described for the state store without needing per-field dirty
/// tracking: the whole value is treated as one subtree, which is sufficient because the
/// orchestrator that mutates it is also the one that ultimately asks for the root.
#[derive(Debug, Clone)]
pub struct Hc<T> {
    value: T,
    cached_root: Cell<Option<H256>>,
}

impl<T> Hc<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value,
            cached_root: Cell::new(None),
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: SszHash> Hc<T> {
    #[must_use]
    pub fn hash_tree_root(&self) -> H256 {
        if let Some(root) = self.cached_root.get() {
            return root;
        }

        let root = self.value.hash_tree_root();
        self.cached_root.set(Some(root));
        root
    }
}

impl<T> From<T> for Hc<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> Deref for Hc<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Hc<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.cached_root.set(None);
        &mut self.value
    }
}

impl<T: PartialEq> PartialEq for Hc<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Hc<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_tree_root_is_cached_until_mutation() {
        let mut container = Hc::new(PersistentList::<u64>::from_iter([1, 2, 3]));
        let root_before = container.hash_tree_root();

        // A second call without mutating in between must hit the cache and agree.
        assert_eq!(container.hash_tree_root(), root_before);

        container.push(4);

        assert_ne!(container.hash_tree_root(), root_before);
    }
}
