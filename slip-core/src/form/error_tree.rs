//! Nested validation messages mirroring the form's shape.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A node is either a message at a leaf or a subtree for a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorNode {
    Message(String),
    Branch(ErrorTree),
}

/// Field-level validation messages keyed by form path.
///
/// Only paths with an active error are present; an empty tree means valid.
/// Serializes to nested JSON, e.g. `{"partyDetails":{"fromLocation":"..."}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorTree {
    nodes: BTreeMap<String, ErrorNode>,
}

impl ErrorTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of messages anywhere in the tree.
    pub fn len(&self) -> usize {
        self.nodes
            .values()
            .map(|node| match node {
                ErrorNode::Message(_) => 1,
                ErrorNode::Branch(tree) => tree.len(),
            })
            .sum()
    }

    /// Records `message` at `path`, replacing whatever was there.
    pub fn insert(
        &mut self,
        path: &[&str],
        message: impl Into<String>,
    ) {
        let Some((head, rest)) = path.split_first() else {
            return;
        };
        if rest.is_empty() {
            self.nodes
                .insert((*head).to_string(), ErrorNode::Message(message.into()));
            return;
        }
        let node = self
            .nodes
            .entry((*head).to_string())
            .or_insert_with(|| ErrorNode::Branch(ErrorTree::new()));
        if let ErrorNode::Message(_) = node {
            *node = ErrorNode::Branch(ErrorTree::new());
        }
        if let ErrorNode::Branch(tree) = node {
            tree.insert(rest, message);
        }
    }

    /// The message recorded exactly at `path`, if any.
    pub fn get(
        &self,
        path: &[&str],
    ) -> Option<&str> {
        let (head, rest) = path.split_first()?;
        match (self.nodes.get(*head)?, rest.is_empty()) {
            (ErrorNode::Message(message), true) => Some(message.as_str()),
            (ErrorNode::Branch(tree), false) => tree.get(rest),
            _ => None,
        }
    }

    /// True if any message sits at `path` or below it.
    pub fn contains(
        &self,
        path: &[&str],
    ) -> bool {
        let Some((head, rest)) = path.split_first() else {
            return !self.is_empty();
        };
        match self.nodes.get(*head) {
            None => false,
            Some(ErrorNode::Message(_)) => true,
            Some(ErrorNode::Branch(tree)) => tree.contains(rest),
        }
    }

    /// Drops everything at or below `path`, pruning branches left empty.
    pub fn remove(
        &mut self,
        path: &[&str],
    ) {
        let Some((head, rest)) = path.split_first() else {
            return;
        };
        if rest.is_empty() {
            self.nodes.remove(*head);
            return;
        }
        let now_empty = match self.nodes.get_mut(*head) {
            Some(ErrorNode::Branch(tree)) => {
                tree.remove(rest);
                tree.is_empty()
            }
            _ => false,
        };
        if now_empty {
            self.nodes.remove(*head);
        }
    }

    /// Copies every message from `other` into `self`; `other` wins on conflict.
    pub fn merge(
        &mut self,
        other: ErrorTree,
    ) {
        for (key, node) in other.nodes {
            match node {
                ErrorNode::Branch(theirs) => match self.nodes.get_mut(&key) {
                    Some(ErrorNode::Branch(mine)) => mine.merge(theirs),
                    _ => {
                        self.nodes.insert(key, ErrorNode::Branch(theirs));
                    }
                },
                message => {
                    self.nodes.insert(key, message);
                }
            }
        }
    }

    /// Flattened `(dotted path, message)` pairs in key order.
    pub fn messages(&self) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        self.collect_messages(&mut Vec::new(), &mut out);
        out
    }

    fn collect_messages<'a>(
        &'a self,
        prefix: &mut Vec<&'a str>,
        out: &mut Vec<(String, &'a str)>,
    ) {
        for (key, node) in &self.nodes {
            prefix.push(key.as_str());
            match node {
                ErrorNode::Message(message) => out.push((prefix.join("."), message.as_str())),
                ErrorNode::Branch(tree) => tree.collect_messages(prefix, out),
            }
            prefix.pop();
        }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (path, message) in self.messages() {
            writeln!(f, "{path}: {message}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn insert_and_get_nested_message() {
        let mut tree = ErrorTree::new();

        tree.insert(&["partyDetails", "sender", "senderName"], "Sender name is required");

        assert_eq!(
            tree.get(&["partyDetails", "sender", "senderName"]),
            Some("Sender name is required")
        );
        assert_eq!(tree.get(&["partyDetails", "sender"]), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn contains_matches_ancestors() {
        let mut tree = ErrorTree::new();
        tree.insert(&["partyDetails", "fromLocation"], "required");

        assert!(tree.contains(&["partyDetails"]));
        assert!(tree.contains(&["partyDetails", "fromLocation"]));
        assert!(!tree.contains(&["partyDetails", "toLocation"]));
        assert!(!tree.contains(&["slipDetails"]));
    }

    #[test]
    fn remove_prunes_empty_branches() {
        let mut tree = ErrorTree::new();
        tree.insert(&["partyDetails", "fromLocation"], "required");

        tree.remove(&["partyDetails", "fromLocation"]);

        assert!(tree.is_empty());
    }

    #[test]
    fn merge_combines_branches() {
        let mut left = ErrorTree::new();
        left.insert(&["partyDetails", "fromLocation"], "from");
        let mut right = ErrorTree::new();
        right.insert(&["partyDetails", "toLocation"], "to");
        right.insert(&["slipDetails", "date"], "date");

        left.merge(right);

        assert_eq!(
            left.messages(),
            vec![
                ("partyDetails.fromLocation".to_string(), "from"),
                ("partyDetails.toLocation".to_string(), "to"),
                ("slipDetails.date".to_string(), "date"),
            ]
        );
    }

    #[test]
    fn serializes_as_nested_object() {
        let mut tree = ErrorTree::new();
        tree.insert(&["partyDetails", "fromLocation"], "From location is required");

        let json = serde_json::to_value(&tree).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"partyDetails": {"fromLocation": "From location is required"}})
        );
    }
}
