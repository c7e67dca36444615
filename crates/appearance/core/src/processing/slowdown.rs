use std::collections::BTreeSet;

use strum::{AsRefStr, Display};

use crate::config::EngineConfig;

/// Named cause of a minimum delay before an attempted action may finish.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum SlowdownReason {
    /// The actor wears something that limits their hands.
    LimitedHands,
    /// Entering or leaving a room device.
    RoomDevice,
}

impl SlowdownReason {
    pub const fn duration_ms(self) -> u64 {
        match self {
            Self::LimitedHands => EngineConfig::SLOWDOWN_LIMITED_HANDS_MS,
            Self::RoomDevice => EngineConfig::SLOWDOWN_ROOM_DEVICE_MS,
        }
    }
}

/// Accumulated slowdown of one action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Slowdown {
    pub reasons: BTreeSet<SlowdownReason>,
    pub extra_ms: u64,
}

impl Slowdown {
    pub fn add_reason(&mut self, reason: SlowdownReason) {
        self.reasons.insert(reason);
    }

    pub fn add_extra(&mut self, ms: u64) {
        self.extra_ms = self.extra_ms.saturating_add(ms);
    }

    pub fn merge(&mut self, other: &Slowdown) {
        self.reasons.extend(other.reasons.iter().copied());
        self.add_extra(other.extra_ms);
    }

    /// Sum of reason durations plus the explicit extra time.
    pub fn total_ms(&self) -> u64 {
        self.reasons
            .iter()
            .map(|reason| reason.duration_ms())
            .fold(self.extra_ms, u64::saturating_add)
    }

    /// A non-zero total means the action must go through an attempt.
    pub fn requires_attempt(&self) -> bool {
        self.total_ms() > 0
    }
}
