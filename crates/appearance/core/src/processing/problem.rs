//! Problem taxonomy: the only channel through which an action is rejected.

use strum::{AsRefStr, Display};

use crate::restriction::Restriction;
use crate::state::{CharacterId, StateValidationError};

/// Why an action was structurally impossible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum InvalidActionReason {
    /// Wearable parts disappear by leaving the device, not by deletion.
    NoDeleteRoomDeviceWearable,
    /// Deployed devices must be stored before deletion.
    NoDeleteDeployedRoomDevice,
    AttemptInProgress,
    NoAttempt,
    /// The finished action differs from the attempted one.
    AttemptMismatch,
    RestrictionOverrideCooldown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum ModuleRejectReason {
    AlreadyLocked,
    NotLocked,
    /// The lock cannot be unlocked by the character who locked it.
    BlockSelf,
    WrongPassword,
    /// The lock slot holds no lock.
    NoLock,
    UnknownVariant,
    /// The module has no such action.
    NotSupported,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum ModuleFailureReason {
    PasswordRequired,
    PasswordInvalid,
}

/// A module refused the action (`reject`) or the payload did not fit it (`failure`).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum ModuleActionError {
    Reject {
        module: String,
        reason: ModuleRejectReason,
    },
    Failure {
        module: String,
        reason: ModuleFailureReason,
    },
}

/// A character modifier blocked the action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterModifierActionError {
    /// Character whose modifier blocked the action.
    pub character: CharacterId,
    /// Modifier instance identifier, opaque to the engine.
    pub modifier: String,
}

/// A recorded reason an action cannot be accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "result", rename_all = "camelCase")
)]
pub enum Problem {
    InvalidAction {
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        reason: Option<InvalidActionReason>,
    },
    ModuleActionError {
        reason: ModuleActionError,
    },
    CharacterModifierActionError {
        reason: CharacterModifierActionError,
    },
    RestrictionError {
        restriction: Restriction,
    },
    ValidationError {
        error: StateValidationError,
    },
    /// The action is slowed down and must go through an attempt.
    AttemptRequired,
    /// An attempt was finished before its slowdown elapsed.
    TooSoon,
}

impl Problem {
    pub fn invalid(reason: InvalidActionReason) -> Self {
        Self::InvalidAction {
            reason: Some(reason),
        }
    }

    pub fn restriction(&self) -> Option<&Restriction> {
        match self {
            Self::RestrictionError { restriction } => Some(restriction),
            _ => None,
        }
    }
}

impl From<Restriction> for Problem {
    fn from(restriction: Restriction) -> Self {
        Self::RestrictionError { restriction }
    }
}

impl From<ModuleActionError> for Problem {
    fn from(reason: ModuleActionError) -> Self {
        Self::ModuleActionError { reason }
    }
}

impl From<CharacterModifierActionError> for Problem {
    fn from(reason: CharacterModifierActionError) -> Self {
        Self::CharacterModifierActionError { reason }
    }
}
