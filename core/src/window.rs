//! Client window geometry.

use serde::{Deserialize, Serialize};

/// Rectangle in window-local or root coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Toolkit window the context is attached to.
pub trait ClientWindow {
    /// Translate window-local `(x, y)` to root window coordinates.
    fn root_coords(&self, x: i32, y: i32) -> (i32, i32);
}

/// Window at a fixed offset from the root origin.
///
/// Root coordinates saturate at the `i32` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OffsetWindow {
    pub origin_x: i32,
    pub origin_y: i32,
}

impl OffsetWindow {
    pub fn new(origin_x: i32, origin_y: i32) -> Self {
        Self { origin_x, origin_y }
    }
}

impl ClientWindow for OffsetWindow {
    fn root_coords(&self, x: i32, y: i32) -> (i32, i32) {
        (self.origin_x.saturating_add(x), self.origin_y.saturating_add(y))
    }
}
