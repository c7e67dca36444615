/// Engine limits and tunable defaults.
///
/// Everything here is shared by the client and the server, so changing a value
/// changes which actions both sides accept.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// How long a character must stay in safemode before leaving it (ms).
    pub safemode_cooldown_ms: u64,
    /// How long a character must stay in timeout before leaving it (ms).
    pub timeout_cooldown_ms: u64,
}

impl EngineConfig {
    // ===== structural limits =====
    /// Maximum nesting of containers (item -> module -> item -> ...).
    pub const MAX_CONTAINER_DEPTH: usize = 4;
    pub const MAX_ITEM_NAME_LENGTH: usize = 32;
    pub const MAX_ITEM_DESCRIPTION_LENGTH: usize = 512;
    pub const MAX_LOCK_PASSWORD_LENGTH: usize = 16;
    pub const MAX_MODULE_NAME_LENGTH: usize = 64;
    pub const MAX_RANDOMIZE_SEED_LENGTH: usize = 64;
    /// Bones are rotations in degrees.
    pub const BONE_LIMIT: i16 = 180;

    // ===== randomization =====
    pub const MAX_RANDOMIZED_ITEMS: u32 = 4;

    // ===== slowdown durations (ms) =====
    pub const SLOWDOWN_LIMITED_HANDS_MS: u64 = 3_000;
    pub const SLOWDOWN_ROOM_DEVICE_MS: u64 = 2_000;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_SAFEMODE_COOLDOWN_MS: u64 = 60 * 60 * 1_000;
    pub const DEFAULT_TIMEOUT_COOLDOWN_MS: u64 = 10 * 60 * 1_000;

    pub fn new() -> Self {
        Self {
            safemode_cooldown_ms: Self::DEFAULT_SAFEMODE_COOLDOWN_MS,
            timeout_cooldown_ms: Self::DEFAULT_TIMEOUT_COOLDOWN_MS,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
