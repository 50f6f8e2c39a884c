//! Parent-chain validation for the document tree.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::{CycleKind, PersistError, Result};

/// Read access to a single parent pointer
#[async_trait]
pub trait ParentLookup: Send + Sync {
    /// Parent of `id`, `None` for a root. Unknown ids are an error.
    async fn parent_of(&self, id: &str) -> Result<Option<String>>;
}

/// Check that giving `current_id` the parent `proposed_parent` keeps the tree acyclic
///
/// Walks up from the proposed parent, one lookup per ancestor. Reaching
/// `current_id` is a self reference; revisiting any ancestor is a loop that
/// already exists in the stored data, and extending it is refused too.
/// Never cached: call it again on every mutation.
pub async fn check_no_cycle<L>(
    lookup: &L,
    current_id: &str,
    proposed_parent: Option<&str>,
) -> Result<()>
where
    L: ParentLookup + ?Sized,
{
    // A record without an id yet, or a root, cannot close a cycle
    if current_id.is_empty() {
        return Ok(());
    }
    let mut cursor = match proposed_parent {
        Some(parent) if !parent.is_empty() => parent.to_string(),
        _ => return Ok(()),
    };

    let mut visited = HashSet::new();
    loop {
        if cursor == current_id {
            return Err(PersistError::CircularReference(CycleKind::SelfReference));
        }
        if !visited.insert(cursor.clone()) {
            return Err(PersistError::CircularReference(CycleKind::Loop));
        }

        match lookup.parent_of(&cursor).await? {
            Some(next) if !next.is_empty() => cursor = next,
            _ => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Tree(HashMap<&'static str, Option<&'static str>>);

    impl Tree {
        fn new(edges: &[(&'static str, Option<&'static str>)]) -> Self {
            Self(edges.iter().copied().collect())
        }
    }

    #[async_trait]
    impl ParentLookup for Tree {
        async fn parent_of(&self, id: &str) -> Result<Option<String>> {
            self.0
                .get(id)
                .map(|p| p.map(str::to_string))
                .ok_or_else(|| PersistError::DocumentNotFound(id.to_string()))
        }
    }

    fn kind(result: Result<()>) -> Option<CycleKind> {
        match result {
            Err(PersistError::CircularReference(kind)) => Some(kind),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_self_parent_is_rejected() {
        let tree = Tree::new(&[("A", None)]);
        let result = check_no_cycle(&tree, "A", Some("A")).await;
        assert_eq!(kind(result), Some(CycleKind::SelfReference));
    }

    #[tokio::test]
    async fn test_transitive_cycle_is_rejected() {
        // A is the root, B under A, C under B
        let tree = Tree::new(&[("A", None), ("B", Some("A")), ("C", Some("B"))]);

        assert_eq!(
            kind(check_no_cycle(&tree, "A", Some("B")).await),
            Some(CycleKind::SelfReference)
        );
        assert_eq!(
            kind(check_no_cycle(&tree, "A", Some("C")).await),
            Some(CycleKind::SelfReference)
        );
    }

    #[tokio::test]
    async fn test_new_root_may_attach_anywhere() {
        let tree = Tree::new(&[("A", None), ("B", Some("A")), ("C", Some("B")), ("D", None)]);

        assert!(check_no_cycle(&tree, "D", Some("A")).await.is_ok());
        assert!(check_no_cycle(&tree, "D", Some("C")).await.is_ok());
        assert!(check_no_cycle(&tree, "", Some("A")).await.is_ok());
    }

    #[tokio::test]
    async fn test_new_record_bypasses_the_walk() {
        // Even a corrupt tree or an unknown parent is not consulted for a new record
        let tree = Tree::new(&[("B", Some("C")), ("C", Some("B"))]);
        assert!(check_no_cycle(&tree, "", Some("B")).await.is_ok());
        assert!(check_no_cycle(&tree, "", Some("missing")).await.is_ok());
        assert!(check_no_cycle(&tree, "", Some("")).await.is_ok());
    }

    #[tokio::test]
    async fn test_clearing_the_parent_always_succeeds() {
        let tree = Tree::new(&[("A", None)]);
        assert!(check_no_cycle(&tree, "A", None).await.is_ok());
        assert!(check_no_cycle(&tree, "A", Some("")).await.is_ok());
    }

    #[tokio::test]
    async fn test_existing_loop_is_not_extended() {
        // B and C already point at each other; A is unrelated
        let tree = Tree::new(&[("A", None), ("B", Some("C")), ("C", Some("B"))]);
        let result = check_no_cycle(&tree, "A", Some("B")).await;
        assert_eq!(kind(result), Some(CycleKind::Loop));
    }

    #[tokio::test]
    async fn test_missing_ancestor_propagates_lookup_error() {
        let tree = Tree::new(&[("A", None), ("B", Some("ghost"))]);
        let result = check_no_cycle(&tree, "A", Some("B")).await;
        assert!(matches!(result, Err(PersistError::DocumentNotFound(id)) if id == "ghost"));
    }
}
