use super::Item;

/// A point on the room floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomPosition {
    pub x: i32,
    pub y: i32,
}

impl RoomPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Room floor dimensions. Valid positions satisfy `0 <= x < width`, `0 <= y < height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomBackground {
    pub width: i32,
    pub height: i32,
}

impl RoomBackground {
    pub const DEFAULT_WIDTH: i32 = 1000;
    pub const DEFAULT_HEIGHT: i32 = 1000;

    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_well_formed(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn contains(&self, position: RoomPosition) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }
}

impl Default for RoomBackground {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

/// Shared room: its inventory (including room devices) and layout.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomState {
    pub items: Vec<Item>,
    pub background: RoomBackground,
}

impl RoomState {
    pub fn new(background: RoomBackground) -> Self {
        Self {
            items: Vec::new(),
            background,
        }
    }
}
