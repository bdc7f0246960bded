//! Small extension traits used throughout the engine to avoid cloning `Arc`-backed data that is
//! only ever read.

use std::sync::Arc;

use easy_ext::ext;

#[ext(pub, name = ArcExt)]
impl<T> Arc<T> {
    /// Clones the `Arc` itself (bumping the refcount), as opposed to `T::clone`. Spelled out so
    /// `clippy::clone_on_ref_ptr` call sites read as intentional.
    #[must_use]
    fn clone_arc(&self) -> Self {
        Arc::clone(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_arc_shares_the_allocation() {
        let original = Arc::new(5);
        let cloned = original.clone_arc();

        assert!(Arc::ptr_eq(&original, &cloned));
        assert_eq!(Arc::strong_count(&original), 2);
    }
}
