//! Item addressing.
//!
//! Items live in a root list (worn by a character or lying in the room
//! inventory) or inside a container module of another item. A container path
//! lists the `(item, module)` hops from the root list down to the list that
//! holds the addressed item.

use std::fmt;

use super::ItemId;

/// One hop into a container module of an item.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemContainerStep {
    pub item: ItemId,
    pub module: String,
}

impl ItemContainerStep {
    pub fn new(item: ItemId, module: impl Into<String>) -> Self {
        Self {
            item,
            module: module.into(),
        }
    }
}

/// Path from a root item list to a (possibly nested) container.
///
/// The empty path addresses the root list itself.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ItemContainerPath(pub Vec<ItemContainerStep>);

impl ItemContainerPath {
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn steps(&self) -> &[ItemContainerStep] {
        &self.0
    }

    /// Returns the path extended by one more hop.
    pub fn join(&self, item: ItemId, module: impl Into<String>) -> Self {
        let mut steps = self.0.clone();
        steps.push(ItemContainerStep::new(item, module));
        Self(steps)
    }

    /// Returns the path of the container holding the last hop's item, with that hop.
    pub fn split_last(&self) -> Option<(Self, &ItemContainerStep)> {
        let (last, rest) = self.0.split_last()?;
        Some((Self(rest.to_vec()), last))
    }
}

impl fmt::Display for ItemContainerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for step in &self.0 {
            write!(f, "{}:{}/", step.item, step.module)?;
        }
        Ok(())
    }
}

/// Full address of an item: its container plus its own identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ItemPath {
    pub container: ItemContainerPath,
    pub item_id: ItemId,
}

impl ItemPath {
    pub fn new(container: ItemContainerPath, item_id: ItemId) -> Self {
        Self { container, item_id }
    }

    /// Address of an item in a root list.
    pub fn root(item_id: ItemId) -> Self {
        Self::new(ItemContainerPath::root(), item_id)
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.container, self.item_id)
    }
}
