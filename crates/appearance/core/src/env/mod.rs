//! Traits describing read-only collaborator data.
//!
//! Oracles expose asset definitions, space policy and deterministic
//! randomness. The [`Env`] aggregate bundles them so the engine can reach
//! everything it needs without coupling to concrete implementations.
mod assets;
mod catalog;
mod error;
mod modifiers;
mod rng;
mod space;

pub use assets::{
    AssetDefinition, AssetFlags, AssetKind, AssetOracle, BodypartDefinition, BoneDefinition,
    BoneKind, DeviceSlot, EffectFlags, ItemTemplate, LockDefinition, ModuleDefinition, ModuleKind,
    ModuleTemplate, PasswordRule, PropertySet, TypedVariant, create_item_from_template,
    create_wearable_part,
};
pub use catalog::AssetCatalog;
pub use error::OracleError;
pub use modifiers::{ModifierOracle, NoModifiers};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use space::{SpaceFeatures, SpaceOracle, StaticSpace};

/// Aggregates the oracles required by the engine.
#[derive(Clone, Copy, Debug)]
pub struct Env<'a, A, S, R>
where
    A: AssetOracle + ?Sized,
    S: SpaceOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    assets: Option<&'a A>,
    space: Option<&'a S>,
    rng: Option<&'a R>,
}

pub type ProcessingEnv<'a> = Env<'a, dyn AssetOracle + 'a, dyn SpaceOracle + 'a, dyn RngOracle + 'a>;

impl<'a, A, S, R> Env<'a, A, S, R>
where
    A: AssetOracle + ?Sized,
    S: SpaceOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(assets: Option<&'a A>, space: Option<&'a S>, rng: Option<&'a R>) -> Self {
        Self { assets, space, rng }
    }

    pub fn with_all(assets: &'a A, space: &'a S, rng: &'a R) -> Self {
        Self::new(Some(assets), Some(space), Some(rng))
    }

    pub fn empty() -> Self {
        Self::new(None, None, None)
    }

    /// Returns the AssetOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::AssetsNotAvailable` if no asset oracle was provided.
    pub fn assets(&self) -> Result<&'a A, OracleError> {
        self.assets.ok_or(OracleError::AssetsNotAvailable)
    }

    /// Returns the SpaceOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::SpaceNotAvailable` if no space oracle was provided.
    pub fn space(&self) -> Result<&'a S, OracleError> {
        self.space.ok_or(OracleError::SpaceNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }
}

impl<'a, A, S, R> Env<'a, A, S, R>
where
    A: AssetOracle + 'a,
    S: SpaceOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into a trait-object based [`ProcessingEnv`].
    pub fn as_processing_env(&self) -> ProcessingEnv<'a> {
        let assets: Option<&'a dyn AssetOracle> = self.assets.map(|assets| assets as _);
        let space: Option<&'a dyn SpaceOracle> = self.space.map(|space| space as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|rng| rng as _);
        Env::new(assets, space, rng)
    }
}

/// Resolved oracles handed to handlers once the environment is known complete.
#[derive(Clone, Copy)]
pub struct Oracles<'a> {
    pub assets: &'a dyn AssetOracle,
    pub space: &'a dyn SpaceOracle,
    pub rng: &'a dyn RngOracle,
}

impl<'a> Oracles<'a> {
    /// # Errors
    ///
    /// Returns the first missing oracle.
    pub fn resolve(env: &ProcessingEnv<'a>) -> Result<Self, OracleError> {
        Ok(Self {
            assets: env.assets()?,
            space: env.space()?,
            rng: env.rng()?,
        })
    }
}

impl std::fmt::Debug for Oracles<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Oracles").finish_non_exhaustive()
    }
}
