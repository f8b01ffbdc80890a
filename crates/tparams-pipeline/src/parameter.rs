//! # Parameter Trees
//!
//! A [`ParamTree`] pairs every permitted position of an input value with
//! the schema node governing it. Nodes live in an arena and refer to each
//! other by [`NodeId`]: a parent owns its children's slots, while a child
//! keeps only a back-reference used for path computation and detachment.
//!
//! The pipeline stages mutate the tree in place: the coercer replaces
//! values, the transformer renames and deletes nodes, the bouncer prunes
//! whole branches. Deleted nodes stay in the arena but are detached from
//! their parent and never visited again.
//!
//! ## Output
//!
//! [`ParamTree::unwrap`] converts the tree back into a plain [`Value`] and
//! applies the root schema's formatter; [`ParamTree::unwrap_with`] takes
//! an explicit formatter, or none for the raw shape.

use indexmap::IndexMap;
use tparams_core::{Casing, Error, Key, Path, Value};
use tparams_schema::{Controller, FormatContext, Formatter, Schema};

/// Index of a node in its [`ParamTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a node holds: a raw value, or wrapped children.
#[derive(Debug, Clone)]
pub(crate) enum Body {
    Leaf(Value),
    /// Array slots; `None` marks a hole left by a rename past the end.
    Array(Vec<Option<NodeId>>),
    Hash(IndexMap<String, NodeId>),
}

#[derive(Debug)]
pub(crate) struct Node<'s> {
    pub(crate) key: Key,
    pub(crate) body: Body,
    pub(crate) schema: &'s Schema,
    pub(crate) parent: Option<NodeId>,
    pub(crate) detached: bool,
    /// Removed by a failed guard rather than by a transform.
    pub(crate) bounced: bool,
}

/// A parameter tree borrowing the schema it was built against.
#[derive(Debug)]
pub struct ParamTree<'s> {
    nodes: Vec<Node<'s>>,
    path_casing: Option<Casing>,
}

impl<'s> ParamTree<'s> {
    pub(crate) fn new(path_casing: Option<Casing>) -> Self {
        Self {
            nodes: Vec::new(),
            path_casing,
        }
    }

    pub(crate) fn push(&mut self, key: Key, schema: &'s Schema, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            key,
            body: Body::Leaf(Value::Nil),
            schema,
            parent,
            detached: false,
            bounced: false,
        });
        id
    }

    pub(crate) fn set_body(&mut self, id: NodeId, body: Body) {
        self.nodes[id.0].body = body;
    }

    /// The root node. The first node pushed is always the root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn key(&self, id: NodeId) -> &Key {
        &self.nodes[id.0].key
    }

    pub fn schema(&self, id: NodeId) -> &'s Schema {
        self.nodes[id.0].schema
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Whether the node has been deleted from its parent.
    pub fn is_detached(&self, id: NodeId) -> bool {
        self.nodes[id.0].detached
    }

    /// The node's value with all wrapped children unwrapped.
    pub fn value(&self, id: NodeId) -> Value {
        match &self.nodes[id.0].body {
            Body::Leaf(v) => v.clone(),
            Body::Array(slots) => Value::Array(
                slots
                    .iter()
                    .map(|slot| slot.map_or(Value::Nil, |c| self.value(c)))
                    .collect(),
            ),
            Body::Hash(map) => Value::Hash(
                map.iter()
                    .map(|(k, c)| (k.clone(), self.value(*c)))
                    .collect(),
            ),
        }
    }

    pub fn is_nil(&self, id: NodeId) -> bool {
        matches!(&self.nodes[id.0].body, Body::Leaf(Value::Nil))
    }

    pub fn is_array(&self, id: NodeId) -> bool {
        match &self.nodes[id.0].body {
            Body::Leaf(v) => v.is_array(),
            Body::Array(_) => true,
            Body::Hash(_) => false,
        }
    }

    pub fn is_hash(&self, id: NodeId) -> bool {
        match &self.nodes[id.0].body {
            Body::Leaf(v) => v.is_hash(),
            Body::Array(_) => false,
            Body::Hash(_) => true,
        }
    }

    pub fn is_scalar(&self, id: NodeId) -> bool {
        !self.is_array(id) && !self.is_hash(id)
    }

    /// Whether the node holds wrapped children rather than a raw value.
    pub fn is_wrapped(&self, id: NodeId) -> bool {
        !matches!(&self.nodes[id.0].body, Body::Leaf(_))
    }

    /// Live children in container order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match &self.nodes[id.0].body {
            Body::Leaf(_) => Vec::new(),
            Body::Array(slots) => slots.iter().flatten().copied().collect(),
            Body::Hash(map) => map.values().copied().collect(),
        }
    }

    /// The child stored under `key`.
    pub fn child(&self, id: NodeId, key: &Key) -> Option<NodeId> {
        match (&self.nodes[id.0].body, key) {
            (Body::Array(slots), Key::Index(i)) => slots.get(*i).copied().flatten(),
            (Body::Hash(map), Key::Name(name)) => map.get(name).copied(),
            _ => None,
        }
    }

    /// Follow `keys` down from the root.
    pub fn find(&self, keys: &[Key]) -> Option<NodeId> {
        keys.iter()
            .try_fold(self.root(), |id, key| self.child(id, key))
    }

    /// Location of the node, rendered with the tree's path casing.
    pub fn path(&self, id: NodeId) -> Path {
        let mut keys = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current.0];
            if node.parent.is_some() {
                keys.push(node.key.clone());
            }
            cursor = node.parent;
        }
        keys.iter()
            .rev()
            .fold(Path::root().with_casing(self.path_casing), |path, key| path.join(key))
    }

    // ── Mutation ────────────────────────────────────────────────────

    /// Replace the node's value. Wrapped children are detached.
    pub fn set_value(&mut self, id: NodeId, value: Value) {
        for child in self.children(id) {
            self.nodes[child.0].detached = true;
        }
        self.nodes[id.0].body = Body::Leaf(value);
    }

    /// Remove the node from its parent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RootDeletion`] for the root.
    pub fn delete(&mut self, id: NodeId) -> Result<(), Error> {
        let parent = self.nodes[id.0].parent.ok_or(Error::RootDeletion)?;
        match &mut self.nodes[parent.0].body {
            Body::Array(slots) => slots.retain(|slot| *slot != Some(id)),
            Body::Hash(map) => map.retain(|_, child| *child != id),
            Body::Leaf(_) => {}
        }
        self.nodes[id.0].detached = true;
        Ok(())
    }

    /// Remove the node from its parent because its guard failed. Unlike a
    /// plain deletion, the parent remembers the key was permitted away, so
    /// presence checks do not report it as missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RootDeletion`] for the root.
    pub fn bounce(&mut self, id: NodeId) -> Result<(), Error> {
        self.delete(id)?;
        self.nodes[id.0].bounced = true;
        Ok(())
    }

    /// Whether a child stored under `key` was bounced from `parent`.
    pub fn is_bounced(&self, parent: NodeId, key: &Key) -> bool {
        self.nodes
            .iter()
            .any(|n| n.bounced && n.parent == Some(parent) && &n.key == key)
    }

    /// Give the node a new key, moving it within its parent. An entry
    /// already stored under `key` is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] when `key` does not fit the parent
    /// container, e.g. a name inside an array.
    pub fn rename(&mut self, id: NodeId, key: Key) -> Result<(), Error> {
        let Some(parent) = self.nodes[id.0].parent else {
            self.nodes[id.0].key = key;
            return Ok(());
        };

        let replaced = match (&mut self.nodes[parent.0].body, &key) {
            (Body::Hash(map), Key::Name(name)) => {
                map.retain(|_, child| *child != id);
                map.insert(name.clone(), id)
            }
            (Body::Array(slots), Key::Index(i)) => {
                slots.retain(|slot| *slot != Some(id));
                if *i >= slots.len() {
                    slots.resize(i + 1, None);
                }
                slots[*i].replace(id)
            }
            (Body::Leaf(_), _) => None,
            _ => return Err(Error::InvalidKey(key.to_string())),
        };
        if let Some(old) = replaced.filter(|old| *old != id) {
            self.nodes[old.0].detached = true;
        }
        self.nodes[id.0].key = key;
        Ok(())
    }

    // ── Output ──────────────────────────────────────────────────────

    /// Unwrap and apply the root schema's formatter, if any.
    pub fn unwrap(&self, controller: Option<&dyn Controller>) -> Result<Value, Error> {
        let root = self.schema(self.root());
        self.unwrap_with(root.formatter(), controller)
    }

    /// Unwrap and apply `formatter`; `None` yields the raw shape.
    pub fn unwrap_with(
        &self,
        formatter: Option<&Formatter>,
        controller: Option<&dyn Controller>,
    ) -> Result<Value, Error> {
        let value = self.value(self.root());
        match formatter {
            Some(formatter) => {
                let ctx = FormatContext {
                    schema: self.schema(self.root()),
                    controller,
                };
                formatter.call(value, &ctx)
            }
            None => Ok(value),
        }
    }
}
