//! Splitting child content between named slots and the default slot.

use crate::node::Node;
use crate::schema::ComponentSchema;

/// Children of a component node grouped by destination.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Partition<'a> {
    /// Named slot contents keyed by the schema's slot name, in order of first
    /// appearance.
    pub named: Vec<(&'a str, Vec<&'a Node>)>,
    /// Every child not inside a named-slot wrapper.
    pub default: Vec<&'a Node>,
}

impl<'a> Partition<'a> {
    fn slot_mut(&mut self, name: &'a str) -> &mut Vec<&'a Node> {
        let idx = match self.named.iter().position(|(slot, _)| *slot == name) {
            Some(idx) => idx,
            None => {
                self.named.push((name, Vec::new()));
                self.named.len() - 1
            }
        };
        &mut self.named[idx].1
    }

    /// Whether the default content holds anything but whitespace.
    pub fn has_default_content(&self) -> bool {
        self.default.iter().any(|node| !node.is_blank())
    }
}

/// Partition `children` according to the named slots of `schema`.
///
/// A direct child component whose name matches a named slot (ignoring ASCII
/// case) is a wrapper: its own children go to that slot and the wrapper
/// itself is dropped. Repeated wrappers for the same slot append.
pub fn partition<'a>(schema: &'a ComponentSchema, children: &'a [Node]) -> Partition<'a> {
    let mut partition = Partition::default();
    for child in children {
        let slot = match child {
            Node::Component(node) => schema
                .named_slot(&node.name)
                .map(|slot| (slot.name.as_str(), node)),
            Node::Markdown(_) => None,
        };
        match slot {
            Some((name, wrapper)) => partition.slot_mut(name).extend(&wrapper.children),
            None => partition.default.push(child),
        }
    }
    partition
}
