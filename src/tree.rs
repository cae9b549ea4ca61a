//! Keyed tree used for the sitemap and the shared data.
//!
//! A [`NestedTree`] maps key paths to leaf values. Intermediate branches are
//! created on demand; a key path holds at most one leaf:
//!
//! ```text
//! set(["blog", "hello"], A)     blog ─┬─ hello: A
//! set(["blog", "intro"], B)           └─ intro: B
//! set(["blog", "hello"], C)     → DuplicateKeyError, `A` stays
//! set(["blog", "hello", "x"], D) → DuplicateKeyError (path runs through a leaf)
//! set(["blog"], E)              → DuplicateKeyError (a branch lives there)
//! ```
//!
//! Conflicts are detected before anything is created, so a failed `set`
//! leaves the tree exactly as it was. Branch children are kept in a
//! `BTreeMap`, which makes iteration and serialization independent of
//! insertion order.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

/// Raised when a key path is already occupied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} conflicts with another item.", .keys.join("/"))]
pub struct DuplicateKeyError {
    pub keys: Vec<String>,
}

/// Raised when a lookup path does not exist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no entry at {}", .keys.join("/"))]
pub struct NotFound {
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node<V> {
    Leaf(V),
    Branch(BTreeMap<String, Node<V>>),
}

impl<V> Node<V> {
    pub fn as_leaf(&self) -> Option<&V> {
        match self {
            Node::Leaf(v) => Some(v),
            Node::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&BTreeMap<String, Node<V>>> {
        match self {
            Node::Leaf(_) => None,
            Node::Branch(children) => Some(children),
        }
    }

    pub fn as_branch_mut(&mut self) -> Option<&mut BTreeMap<String, Node<V>>> {
        match self {
            Node::Leaf(_) => None,
            Node::Branch(children) => Some(children),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }
}

impl<V: Serialize> Serialize for Node<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Leaf(v) => v.serialize(serializer),
            Node::Branch(children) => children.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NestedTree<V> {
    root: Node<V>,
}

impl<V> Default for NestedTree<V> {
    fn default() -> Self {
        Self {
            root: Node::Branch(BTreeMap::new()),
        }
    }
}

impl<V> NestedTree<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` at `keys`, creating intermediate branches.
    ///
    /// An empty key path is a no-op.
    pub fn set<K: AsRef<str>>(&mut self, keys: &[K], value: V) -> Result<(), DuplicateKeyError> {
        let Some((last, parents)) = keys.split_last() else {
            return Ok(());
        };

        self.check_free(keys)?;

        let mut branch = self
            .root
            .as_branch_mut()
            .expect("check_free rejects a leaf root");
        for key in parents {
            branch = branch
                .entry(key.as_ref().to_string())
                .or_insert_with(|| Node::Branch(BTreeMap::new()))
                .as_branch_mut()
                .expect("check_free rejects a path through a leaf");
        }
        branch.insert(last.as_ref().to_string(), Node::Leaf(value));
        Ok(())
    }

    /// Verify that `keys` can take a new leaf: no leaf on the way down and
    /// nothing at the final position.
    fn check_free<K: AsRef<str>>(&self, keys: &[K]) -> Result<(), DuplicateKeyError> {
        let conflict = || DuplicateKeyError {
            keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
        };
        let mut node = &self.root;
        for key in keys {
            match node {
                Node::Leaf(_) => return Err(conflict()),
                Node::Branch(children) => match children.get(key.as_ref()) {
                    Some(child) => node = child,
                    None => return Ok(()),
                },
            }
        }
        // Every key matched an existing node, including the last one.
        Err(conflict())
    }

    /// Node at `keys`. The empty path addresses the root branch.
    pub fn get<K: AsRef<str>>(&self, keys: &[K]) -> Result<&Node<V>, NotFound> {
        let mut node = &self.root;
        for key in keys {
            node = match node {
                Node::Branch(children) => children.get(key.as_ref()),
                Node::Leaf(_) => None,
            }
            .ok_or_else(|| not_found(keys))?;
        }
        Ok(node)
    }

    pub fn get_mut<K: AsRef<str>>(&mut self, keys: &[K]) -> Result<&mut Node<V>, NotFound> {
        let mut node = &mut self.root;
        for key in keys {
            node = match node {
                Node::Branch(children) => children.get_mut(key.as_ref()),
                Node::Leaf(_) => None,
            }
            .ok_or_else(|| not_found(keys))?;
        }
        Ok(node)
    }

    /// Leaf value at `keys`, if the path ends on a leaf.
    pub fn leaf<K: AsRef<str>>(&self, keys: &[K]) -> Option<&V> {
        self.get(keys).ok().and_then(Node::as_leaf)
    }

    /// Detach the node at `keys`. The root itself cannot be removed.
    pub fn remove<K: AsRef<str>>(&mut self, keys: &[K]) -> Result<Node<V>, NotFound> {
        let (last, parents) = keys.split_last().ok_or_else(|| not_found(keys))?;
        match self.get_mut(parents)? {
            Node::Branch(children) => children.remove(last.as_ref()).ok_or_else(|| not_found(keys)),
            Node::Leaf(_) => Err(not_found(keys)),
        }
    }

    pub fn root(&self) -> &Node<V> {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        matches!(&self.root, Node::Branch(children) if children.is_empty())
    }

    /// Every leaf with its key path, depth first, keys in sorted order.
    pub fn leaves(&self) -> Vec<(Vec<String>, &V)> {
        let mut out = Vec::new();
        collect_leaves(&self.root, &mut Vec::new(), &mut out);
        out
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }
}

impl<V: Serialize> Serialize for NestedTree<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

fn not_found<K: AsRef<str>>(keys: &[K]) -> NotFound {
    NotFound {
        keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
    }
}

fn collect_leaves<'a, V>(
    node: &'a Node<V>,
    path: &mut Vec<String>,
    out: &mut Vec<(Vec<String>, &'a V)>,
) {
    match node {
        Node::Leaf(v) => out.push((path.clone(), v)),
        Node::Branch(children) => {
            for (key, child) in children {
                path.push(key.clone());
                collect_leaves(child, path, out);
                path.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_creates_intermediate_branches() {
        let mut tree = NestedTree::new();
        tree.set(&["level1", "level2", "level3", "filename"], "TEST")
            .unwrap();

        assert_eq!(
            tree.leaf(&["level1", "level2", "level3", "filename"]),
            Some(&"TEST")
        );
        assert!(!tree.get(&["level1", "level2"]).unwrap().is_leaf());
    }

    #[test]
    fn distinct_paths_are_both_retrievable() {
        let mut tree = NestedTree::new();
        tree.set(&["a", "b"], 1).unwrap();
        tree.set(&["a", "c", "d"], 2).unwrap();

        assert_eq!(tree.leaf(&["a", "b"]), Some(&1));
        assert_eq!(tree.leaf(&["a", "c", "d"]), Some(&2));
        // Prefixes are branches, not leaves.
        assert_eq!(tree.leaf(&["a"]), None);
        assert_eq!(tree.leaf(&["a", "c"]), None);
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn second_insert_is_duplicate_and_first_value_stays() {
        let mut tree = NestedTree::new();
        tree.set(&["level1", "filename"], "TEST").unwrap();
        let err = tree.set(&["level1", "filename"], "TEST2").unwrap_err();

        assert_eq!(err.keys, vec!["level1", "filename"]);
        assert_eq!(err.to_string(), "level1/filename conflicts with another item.");
        assert_eq!(tree.leaf(&["level1", "filename"]), Some(&"TEST"));
    }

    #[test]
    fn leaf_over_existing_branch_is_duplicate() {
        let mut tree = NestedTree::new();
        tree.set(&["x", "index"], 1).unwrap();
        let before = tree.clone();

        assert!(tree.set(&["x"], 2).is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn path_through_leaf_is_duplicate_without_mutation() {
        let mut tree = NestedTree::new();
        tree.set(&["x"], 1).unwrap();
        let before = tree.clone();

        let err = tree.set(&["x", "index"], 2).unwrap_err();
        assert_eq!(err.keys, vec!["x", "index"]);
        assert_eq!(tree, before);
        assert_eq!(tree.leaf(&["x"]), Some(&1));
    }

    #[test]
    fn failed_set_creates_no_branches() {
        let mut tree = NestedTree::new();
        tree.set(&["a"], 1).unwrap();
        let before = tree.clone();

        assert!(tree.set(&["a", "b", "c"], 2).is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn empty_keys_is_noop() {
        let mut tree: NestedTree<i32> = NestedTree::new();
        let keys: [&str; 0] = [];
        tree.set(&keys, 1).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn missing_path_is_not_found_but_empty_root_is_present() {
        let tree: NestedTree<i32> = NestedTree::new();
        let root: [&str; 0] = [];
        assert!(tree.get(&root).unwrap().as_branch().unwrap().is_empty());

        let err = tree.get(&["nope", "deeper"]).unwrap_err();
        assert_eq!(err.keys, vec!["nope", "deeper"]);
    }

    #[test]
    fn values_can_be_edited_after_insertion() {
        let mut tree = NestedTree::new();
        tree.set(&["test2"], "original".to_string()).unwrap();

        if let Node::Leaf(v) = tree.get_mut(&["test2"]).unwrap() {
            *v = "Lorem Ipsum".to_string();
        }
        assert_eq!(tree.leaf(&["test2"]).unwrap(), "Lorem Ipsum");

        tree.remove(&["test2"]).unwrap();
        assert!(tree.get(&["test2"]).is_err());
    }

    #[test]
    fn serializes_as_plain_nested_map() {
        let mut tree = NestedTree::new();
        tree.set(&["sub", "b"], "B").unwrap();
        tree.set(&["a"], "A").unwrap();

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json, serde_json::json!({"a": "A", "sub": {"b": "B"}}));
    }

    #[test]
    fn leaves_are_listed_in_key_order() {
        let mut tree = NestedTree::new();
        tree.set(&["b"], 2).unwrap();
        tree.set(&["a", "z"], 1).unwrap();

        let keys: Vec<Vec<String>> = tree.leaves().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![vec!["a", "z"], vec!["b"]]);
    }
}
