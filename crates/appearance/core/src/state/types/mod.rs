mod character;
mod ids;
mod item;
mod path;
mod room;

pub use character::{
    ActionAttempt, ArmPose, ArmsPosition, AssetPreference, AssetPreferences, CharacterState,
    Fingers, InteractionConfig, InteractionId, InteractionSettings, LegsPose, PermissionSetting,
    PoseState, RestrictionOverride, RestrictionOverrideMode, View,
};
pub use ids::{AccountId, AssetId, CharacterId, ItemId};
pub use item::{
    ColorBundle, DeviceLink, HexColor, Item, LockState, LockedBy, ModuleState, RoomDeviceState,
    container_chain, find_item, for_each_item, resolve_container, resolve_container_mut,
};
pub use path::{ItemContainerPath, ItemContainerStep, ItemPath};
pub use room::{RoomBackground, RoomPosition, RoomState};
