//! Collision queries for the platforming and flight steps
//!
//! Everything here is a plain AABB test; there is no rotation and no
//! penetration resolution beyond snapping onto a platform top.

use super::rect::Rect;

/// Did a falling body land on `platform` this frame?
///
/// Only bodies moving down can land, and only when the feet crossed the
/// platform's top edge between the previous and current frame while
/// overlapping it horizontally.
pub fn lands_on(body: &Rect, vy: f32, dt: f32, platform: &Rect) -> bool {
    if vy <= 0.0 {
        return false;
    }
    let feet = body.bottom();
    let prev_feet = feet - vy * dt;
    prev_feet <= platform.top() && feet >= platform.top() && body.overlaps_x(platform)
}

/// Index of the platform whose horizontal center is closest to `x`.
/// Ties keep the earliest platform.
pub fn nearest_platform(platforms: &[Rect], x: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, p) in platforms.iter().enumerate() {
        let dist = (x - p.center_x()).abs();
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((i, dist));
        }
    }
    best.map(|(i, _)| i)
}
