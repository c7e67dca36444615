//! Global state representation.
//!
//! [`GlobalState`] is an immutable snapshot of one space: the room and every
//! character in it. Room and characters sit behind `Arc` so a processed action
//! only copies what it touched; the starting snapshot stays valid and unaliased
//! whether the action is accepted or not.
pub mod types;
mod validation;

pub use types::*;
pub use validation::StateValidationError;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::env::AssetOracle;
use crate::error::{EngineError, ErrorSeverity};

/// Snapshot of a space: the room and its characters.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalState {
    pub room: Arc<RoomState>,
    pub characters: BTreeMap<CharacterId, Arc<CharacterState>>,
}

impl GlobalState {
    pub fn new(room: RoomState) -> Self {
        Self {
            room: Arc::new(room),
            characters: BTreeMap::new(),
        }
    }

    pub fn with_character(mut self, character: CharacterState) -> Self {
        self.characters
            .insert(character.id.clone(), Arc::new(character));
        self
    }

    pub fn character(&self, id: &CharacterId) -> Option<&CharacterState> {
        self.characters.get(id).map(Arc::as_ref)
    }

    /// Copy-on-write access to a character.
    pub fn character_mut(&mut self, id: &CharacterId) -> Option<&mut CharacterState> {
        self.characters.get_mut(id).map(Arc::make_mut)
    }

    /// Copy-on-write access to the room.
    pub fn room_mut(&mut self) -> &mut RoomState {
        Arc::make_mut(&mut self.room)
    }

    /// Checks every global structural rule.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self, assets: &dyn AssetOracle) -> Result<(), StateValidationError> {
        validation::validate_global_state(self, assets)
    }
}

/// Failures of the state codec.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateCodecError {
    #[error("failed to encode state: {0}")]
    Encode(String),

    #[error("failed to decode state: {0}")]
    Decode(String),

    #[error("decoded state is invalid: {0}")]
    Invalid(#[from] StateValidationError),
}

impl EngineError for StateCodecError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            // Encoding our own types never fails for well-formed values
            Self::Encode(_) => ErrorSeverity::Internal,
            Self::Decode(_) | Self::Invalid(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Encode(_) => "STATE_ENCODE",
            Self::Decode(_) => "STATE_DECODE",
            Self::Invalid(inner) => inner.error_code(),
        }
    }
}

#[cfg(feature = "serde")]
impl GlobalState {
    /// Canonical export bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StateCodecError::Encode`] if serialization fails.
    pub fn export(&self) -> Result<Vec<u8>, StateCodecError> {
        serde_json::to_vec(self).map_err(|error| StateCodecError::Encode(error.to_string()))
    }

    /// Decodes an export and validates it against the asset definitions.
    ///
    /// # Errors
    ///
    /// Returns [`StateCodecError::Decode`] for undecodable bytes and
    /// [`StateCodecError::Invalid`] for structurally invalid states.
    pub fn import(bytes: &[u8], assets: &dyn AssetOracle) -> Result<Self, StateCodecError> {
        let state: Self = serde_json::from_slice(bytes)
            .map_err(|error| StateCodecError::Decode(error.to_string()))?;
        state.validate(assets)?;
        Ok(state)
    }

    /// SHA-256 over the canonical export.
    ///
    /// # Errors
    ///
    /// Returns [`StateCodecError::Encode`] if the export fails.
    pub fn state_root(&self) -> Result<[u8; 32], StateCodecError> {
        use sha2::{Digest, Sha256};

        let bytes = self.export()?;
        Ok(Sha256::digest(&bytes).into())
    }
}
