//! Axis-aligned rectangles in world space
//!
//! World space has its origin at the top-left, y grows downward. Flight
//! entities are stored in scroll space and shifted into screen space with
//! [`Rect::shifted`] before testing against the player.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// A box of `size` centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center - size / 2.0,
            size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }

    /// Same box moved left by `scroll` (scroll space to screen space)
    #[inline]
    pub fn shifted(&self, scroll: f32) -> Self {
        Self {
            pos: Vec2::new(self.pos.x - scroll, self.pos.y),
            size: self.size,
        }
    }

    /// Strict overlap: touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Horizontal span overlap only
    #[inline]
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.left() < other.right() && self.right() > other.left()
    }
}
