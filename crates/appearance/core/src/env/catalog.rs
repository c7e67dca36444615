use std::collections::BTreeMap;

use super::{AssetDefinition, AssetOracle, BodypartDefinition, BoneDefinition, BoneKind};
use crate::state::AssetId;

/// In-memory asset oracle.
#[derive(Clone, Debug, Default)]
pub struct AssetCatalog {
    assets: BTreeMap<AssetId, AssetDefinition>,
    bodyparts: Vec<BodypartDefinition>,
    bones: Vec<BoneDefinition>,
    random_pool: Vec<AssetId>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bodypart category; call order defines the canonical order.
    pub fn with_bodypart(
        mut self,
        name: impl Into<String>,
        required: bool,
        allow_multiple: bool,
    ) -> Self {
        self.bodyparts.push(BodypartDefinition {
            name: name.into(),
            required,
            allow_multiple,
        });
        self
    }

    pub fn with_bone(mut self, name: impl Into<String>, kind: BoneKind) -> Self {
        self.bones.push(BoneDefinition {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn with_asset(mut self, asset: AssetDefinition) -> Self {
        self.assets.insert(asset.id.clone(), asset);
        self
    }

    /// Adds an asset and makes it eligible for randomization.
    pub fn with_random_asset(mut self, asset: AssetDefinition) -> Self {
        self.random_pool.push(asset.id.clone());
        self.with_asset(asset)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetOracle for AssetCatalog {
    fn asset(&self, id: &AssetId) -> Option<&AssetDefinition> {
        self.assets.get(id)
    }

    fn bodyparts(&self) -> &[BodypartDefinition] {
        &self.bodyparts
    }

    fn bones(&self) -> &[BoneDefinition] {
        &self.bones
    }

    fn random_pool(&self) -> &[AssetId] {
        &self.random_pool
    }
}
