//! The command tree.
//!
//! An in-memory hierarchical registry of command, sub-command-group, and
//! sub-command nodes built during startup resolution. Exactly the leaf nodes
//! carry a handler; internal nodes only group their children. The tree is
//! append-only while resolvers run and read-only once the orchestrator
//! reports ready; runtime dispatch walks it without mutation.

use std::sync::{Arc, OnceLock, Weak};

use parking_lot::RwLock;
use serde_json::{Map, Value, json};
use tracing::debug;

use accord_core::{CommandPath, DtoTemplate, MetadataRegistry, RegistryError};

use crate::handler::{BoxedHandler, HandlerKey};

/// The role a node plays in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Top-level command.
    Command,
    /// Terminal sub-command.
    SubCommand,
    /// Grouping level between a command and its sub-commands.
    SubCommandGroup,
}

impl NodeKind {
    /// Returns the kind as a wire-format string.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Command => "command",
            NodeKind::SubCommand => "sub-command",
            NodeKind::SubCommandGroup => "sub-command-group",
        }
    }
}

/// The handler binding attached to a leaf node.
pub struct Leaf {
    /// Key into the per-handler guard/pipe tables.
    pub key: HandlerKey,
    /// The bound handler.
    pub handler: BoxedHandler,
    /// The DTO prototype filled by the transform pipe, if one was declared.
    pub dto: Option<DtoTemplate>,
}

/// One node of the command tree.
///
/// Nodes never own their parent; the back-reference is weak. Children are
/// insertion-ordered and name-unique within a parent.
pub struct CommandNode {
    name: String,
    kind: NodeKind,
    parent: Weak<CommandNode>,
    children: RwLock<Vec<Arc<CommandNode>>>,
    leaf: OnceLock<Leaf>,
}

impl CommandNode {
    fn new(name: &str, kind: NodeKind, parent: Weak<CommandNode>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            kind,
            parent,
            children: RwLock::new(Vec::new()),
            leaf: OnceLock::new(),
        })
    }

    /// Returns the node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node kind.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns the parent node, if it is still alive.
    pub fn parent(&self) -> Option<Arc<CommandNode>> {
        self.parent.upgrade()
    }

    /// Returns a snapshot of the children in insertion order.
    pub fn children(&self) -> Vec<Arc<CommandNode>> {
        self.children.read().clone()
    }

    /// Returns the leaf binding, if this node is a leaf.
    pub fn leaf(&self) -> Option<&Leaf> {
        self.leaf.get()
    }

    fn child(&self, name: &str) -> Option<Arc<CommandNode>> {
        self.children.read().iter().find(|c| c.name == name).cloned()
    }

    /// Returns the full path from the root to this node.
    pub fn path(&self) -> String {
        let mut names = vec![self.name.clone()];
        let mut current = self.parent.upgrade();
        while let Some(node) = current {
            names.push(node.name.clone());
            current = node.parent.upgrade();
        }
        names.reverse();
        names.join(" ")
    }
}

impl std::fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("children", &self.children.read().len())
            .field("is_leaf", &self.leaf.get().is_some())
            .finish()
    }
}

/// The root registry of command nodes.
#[derive(Default)]
pub struct CommandTree {
    roots: RwLock<Vec<Arc<CommandNode>>>,
}

impl CommandTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the top-level commands in insertion order.
    pub fn roots(&self) -> Vec<Arc<CommandNode>> {
        self.roots.read().clone()
    }

    /// Registers a leaf at the path implied by the command nesting.
    ///
    /// Intermediate nodes are created (or reused) as needed; the terminal
    /// segment must not already exist.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateCommand`] when the terminal sibling name is
    /// already taken, [`RegistryError::KindMismatch`] when an intermediate
    /// node is reused with a different kind.
    pub fn register(&self, path: &CommandPath, leaf: Leaf) -> Result<Arc<CommandNode>, RegistryError> {
        let (intermediates, terminal) = segment_kinds(path);

        let mut parent: Option<Arc<CommandNode>> = None;
        for (name, kind) in &intermediates {
            parent = Some(self.find_or_create(parent.as_ref(), name, *kind)?);
        }

        let (name, kind) = terminal;
        let exists = match &parent {
            Some(node) => node.child(name).is_some(),
            None => self.root(name).is_some(),
        };
        if exists {
            return Err(RegistryError::DuplicateCommand {
                parent: parent.as_ref().map_or_else(|| "<root>".into(), |p| p.path()),
                name: name.to_string(),
            });
        }

        let node = Arc::new(CommandNode {
            name: name.to_string(),
            kind,
            parent: parent.as_ref().map_or_else(Weak::new, Arc::downgrade),
            children: RwLock::new(Vec::new()),
            leaf: OnceLock::from(leaf),
        });
        match &parent {
            Some(p) => p.children.write().push(node.clone()),
            None => self.roots.write().push(node.clone()),
        }
        debug!(path = %node.path(), kind = kind.as_str(), "Registered command leaf");
        Ok(node)
    }

    /// Resolves the node addressed by an interaction's path segments.
    pub fn resolve(&self, segments: &[&str]) -> Option<Arc<CommandNode>> {
        let (first, rest) = segments.split_first()?;
        let mut node = self.root(first)?;
        for segment in rest {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Checks the tree invariants: exactly leaf nodes carry a handler and
    /// every internal node has at least one child.
    pub fn validate(&self) -> Result<(), RegistryError> {
        fn check(node: &Arc<CommandNode>) -> Result<(), RegistryError> {
            let children = node.children.read();
            match (node.leaf.get().is_some(), children.is_empty()) {
                (true, false) => Err(RegistryError::InvalidTree {
                    node: node.path(),
                    reason: "leaf node has children".into(),
                }),
                (false, true) => Err(RegistryError::InvalidTree {
                    node: node.path(),
                    reason: "internal node has no children".into(),
                }),
                _ => children.iter().try_for_each(check),
            }
        }
        self.roots.read().iter().try_for_each(check)
    }

    /// Exports the tree as a platform-registration payload.
    ///
    /// Option metadata (external name, required flag, choices, description)
    /// is drawn from the schemas recorded in the metadata registry.
    pub fn export(&self, metadata: &MetadataRegistry) -> Value {
        fn node_json(node: &Arc<CommandNode>, metadata: &MetadataRegistry) -> Value {
            let mut obj = Map::new();
            obj.insert("name".into(), node.name().into());
            obj.insert("type".into(), node.kind().as_str().into());
            if let Some(dto) = node.leaf().and_then(|l| l.dto.as_ref())
                && let Some(schema) = metadata.schema_of(dto.type_id)
            {
                let options: Vec<Value> = schema
                    .fields()
                    .map(|(property, spec)| {
                        let mut option = serde_json::to_value(spec)
                            .unwrap_or_else(|_| json!({}));
                        if let Value::Object(map) = &mut option
                            && !map.contains_key("name")
                        {
                            map.insert("name".into(), property.into());
                        }
                        option
                    })
                    .collect();
                obj.insert("options".into(), options.into());
            }
            let children = node.children();
            if !children.is_empty() {
                let nested: Vec<Value> =
                    children.iter().map(|c| node_json(c, metadata)).collect();
                obj.insert("children".into(), nested.into());
            }
            Value::Object(obj)
        }

        Value::Array(
            self.roots
                .read()
                .iter()
                .map(|root| node_json(root, metadata))
                .collect(),
        )
    }

    fn root(&self, name: &str) -> Option<Arc<CommandNode>> {
        self.roots.read().iter().find(|r| r.name == name).cloned()
    }

    fn find_or_create(
        &self,
        parent: Option<&Arc<CommandNode>>,
        name: &str,
        kind: NodeKind,
    ) -> Result<Arc<CommandNode>, RegistryError> {
        let existing = match parent {
            Some(node) => node.child(name),
            None => self.root(name),
        };
        if let Some(node) = existing {
            if node.kind != kind {
                return Err(RegistryError::KindMismatch {
                    name: name.to_string(),
                    existing: node.kind.as_str(),
                    requested: kind.as_str(),
                });
            }
            return Ok(node);
        }

        let node = CommandNode::new(name, kind, parent.map_or_else(Weak::new, Arc::downgrade));
        match parent {
            Some(p) => p.children.write().push(node.clone()),
            None => self.roots.write().push(node.clone()),
        }
        Ok(node)
    }
}

impl std::fmt::Debug for CommandTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTree")
            .field("roots", &self.roots.read().len())
            .finish()
    }
}

/// Maps a command path to the intermediate and terminal `(name, kind)`
/// segments it implies.
fn segment_kinds(path: &CommandPath) -> (Vec<(&str, NodeKind)>, (&str, NodeKind)) {
    let command = (path.command.as_str(), NodeKind::Command);
    match &path.subcommand {
        None => (Vec::new(), command),
        Some(subcommand) => {
            let mut intermediates = vec![command];
            if let Some(group) = &path.group {
                intermediates.push((group.as_str(), NodeKind::SubCommandGroup));
            }
            (intermediates, (subcommand.as_str(), NodeKind::SubCommand))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_leaf(key: &str) -> Leaf {
        Leaf {
            key: HandlerKey::new(key),
            handler: Arc::new(|_| Box::pin(async { Ok(()) })),
            dto: None,
        }
    }

    #[test]
    fn registers_and_resolves_nested_paths() {
        let tree = CommandTree::new();
        tree.register(&CommandPath::command("ping"), noop_leaf("a"))
            .unwrap();
        tree.register(
            &CommandPath::subcommand("mod", Some("user".into()), "ban"),
            noop_leaf("b"),
        )
        .unwrap();

        let node = tree.resolve(&["mod", "user", "ban"]).expect("resolves");
        assert_eq!(node.kind(), NodeKind::SubCommand);
        assert_eq!(node.path(), "mod user ban");
        assert!(node.leaf().is_some());
        assert!(tree.resolve(&["mod", "user"]).unwrap().leaf().is_none());
        assert!(tree.resolve(&["nope"]).is_none());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn duplicate_sibling_is_fatal() {
        let tree = CommandTree::new();
        tree.register(&CommandPath::command("ping"), noop_leaf("a"))
            .unwrap();
        let err = tree
            .register(&CommandPath::command("ping"), noop_leaf("b"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCommand { .. }));
    }

    #[test]
    fn duplicate_subcommand_is_fatal() {
        let tree = CommandTree::new();
        let path = CommandPath::subcommand("mod", None, "ban");
        tree.register(&path, noop_leaf("a")).unwrap();
        let err = tree.register(&path, noop_leaf("b")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCommand { .. }));
    }

    #[test]
    fn intermediate_kind_conflicts_are_fatal() {
        let tree = CommandTree::new();
        tree.register(
            &CommandPath::subcommand("mod", Some("user".into()), "ban"),
            noop_leaf("a"),
        )
        .unwrap();
        // "user" exists as a group; reusing it as a terminal sub-command name
        // collides with the sibling rule instead.
        let err = tree
            .register(&CommandPath::subcommand("mod", None, "user"), noop_leaf("b"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::KindMismatch { .. } | RegistryError::DuplicateCommand { .. }));
    }

    #[test]
    fn parent_back_references_are_weak() {
        let tree = CommandTree::new();
        tree.register(&CommandPath::subcommand("mod", None, "ban"), noop_leaf("a"))
            .unwrap();
        let leaf = tree.resolve(&["mod", "ban"]).unwrap();
        let parent = leaf.parent().expect("parent alive while tree lives");
        assert_eq!(parent.name(), "mod");
        assert!(parent.parent().is_none());
    }
}
