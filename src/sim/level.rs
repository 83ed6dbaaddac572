//! Generated stage layouts
//!
//! Flight layouts live in scroll space (x measured from the start of the
//! stage); city layouts live directly in screen space.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Tree silhouette, chosen by how far into the campaign a stage sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeKind {
    Pine,
    Oak,
    Magnolia,
}

/// Obstacle category, for loss messages and sprite lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Tree,
    Building,
    Plane,
    Blimp,
    Storm,
}

impl ObstacleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Tree => "tree",
            ObstacleKind::Building => "building",
            ObstacleKind::Plane => "plane",
            ObstacleKind::Blimp => "blimp",
            ObstacleKind::Storm => "storm",
        }
    }
}

/// Obstacles standing on the ground line. They never move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroundObstacle {
    Tree {
        rect: Rect,
        tree: TreeKind,
        /// Per-instance appearance seed in [0, 1)
        variation: f32,
    },
    Building {
        rect: Rect,
        variation: f32,
    },
}

impl GroundObstacle {
    pub fn rect(&self) -> &Rect {
        match self {
            GroundObstacle::Tree { rect, .. } | GroundObstacle::Building { rect, .. } => rect,
        }
    }

    pub fn kind(&self) -> ObstacleKind {
        match self {
            GroundObstacle::Tree { .. } => ObstacleKind::Tree,
            GroundObstacle::Building { .. } => ObstacleKind::Building,
        }
    }
}

/// Obstacles in the air, each with its own motion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AirObstacle {
    /// Flies right to left on its own, weaving in altitude
    Plane {
        rect: Rect,
        base_y: f32,
        spawn_x: f32,
        speed: f32,
    },
    /// Bobs in place
    Blimp { rect: Rect, base_y: f32 },
    /// Bobs in place
    Storm { rect: Rect, base_y: f32 },
}

impl AirObstacle {
    pub fn rect(&self) -> &Rect {
        match self {
            AirObstacle::Plane { rect, .. }
            | AirObstacle::Blimp { rect, .. }
            | AirObstacle::Storm { rect, .. } => rect,
        }
    }

    pub fn kind(&self) -> ObstacleKind {
        match self {
            AirObstacle::Plane { .. } => ObstacleKind::Plane,
            AirObstacle::Blimp { .. } => ObstacleKind::Blimp,
            AirObstacle::Storm { .. } => ObstacleKind::Storm,
        }
    }

    /// Advance the motion function to host time `now` (ms).
    ///
    /// The sine divisors are gameplay-tuned; keep them exact.
    pub fn advance(&mut self, dt: f32, now: f64) {
        match self {
            AirObstacle::Plane {
                rect,
                base_y,
                spawn_x,
                speed,
            } => {
                rect.pos.x -= *speed * dt;
                let phase = now / 800.0 + *spawn_x as f64 * 0.01;
                rect.pos.y = *base_y + (phase.sin() * 40.0) as f32;
            }
            AirObstacle::Blimp { rect, base_y } | AirObstacle::Storm { rect, base_y } => {
                let phase = now / 1500.0 + rect.pos.x as f64;
                rect.pos.y = *base_y + (phase.sin() * 30.0) as f32;
            }
        }
    }
}

/// A fog bank drifting toward the player. Spans the full screen height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogBand {
    pub x: f32,
    pub width: f32,
    /// Once set, the band never costs energy again and is not drawn
    pub cleared: bool,
}

impl FogBand {
    /// Screen-space left edge
    pub fn screen_x(&self, scroll: f32) -> f32 {
        self.x - scroll
    }

    /// Horizontal overlap with a screen-space span
    pub fn overlaps_span(&self, scroll: f32, left: f32, right: f32) -> bool {
        let fx = self.screen_x(scroll);
        left < fx + self.width && right > fx
    }
}

/// The final stage's narrow gap between two tall trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shaft {
    pub x: f32,
    pub width: f32,
    pub left_tree: Rect,
    pub right_tree: Rect,
}

/// One generated flight stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLevel {
    pub stage_id: String,
    pub ground: Vec<GroundObstacle>,
    pub airborne: Vec<AirObstacle>,
    pub fogs: Vec<FogBand>,
    pub landing: Rect,
    pub length: f32,
    pub shaft: Option<Shaft>,
    pub is_final: bool,
}

/// Roof silhouette drawn on a city's buildings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoofStyle {
    Steep,
    Flat,
    Dome,
    Gabled,
}

/// Background landmarks; rendering only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Monument {
    OlympicTower,
    NotreDame,
    StatueOfLiberty,
    EmpireState,
    WashingtonMonument,
    Capitol,
    Parthenon,
    BatmanBuilding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    /// A building's main roof
    Building,
    /// A raised block sitting on a building's roof
    Rooftop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chimney {
    /// Index of the building the chimney sits on
    pub id: u32,
    pub rect: Rect,
    pub delivered: bool,
}

/// One generated city stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityLevel {
    pub city_id: String,
    /// Facade colour, 0xRRGGBB
    pub facade: u32,
    pub roof: RoofStyle,
    pub platforms: Vec<Platform>,
    pub chimneys: Vec<Chimney>,
    pub spawn: Vec2,
    /// Exit; only usable once every present is delivered
    pub sleigh: Rect,
    pub monuments: [Monument; 2],
}

impl CityLevel {
    pub fn platform_rects(&self) -> Vec<Rect> {
        self.platforms.iter().map(|p| p.rect).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_weaves_around_base() {
        let mut plane = AirObstacle::Plane {
            rect: Rect::new(1000.0, 150.0, 80.0, 25.0),
            base_y: 150.0,
            spawn_x: 1000.0,
            speed: 3.0,
        };
        for frame in 0..120 {
            plane.advance(1.0, frame as f64 * 16.67);
            let y = plane.rect().top();
            assert!((110.0..=190.0).contains(&y));
        }
        assert!((plane.rect().left() - 640.0).abs() < 1e-3);
    }

    #[test]
    fn test_blimp_bobs_in_place() {
        let mut blimp = AirObstacle::Blimp {
            rect: Rect::new(800.0, 200.0, 100.0, 50.0),
            base_y: 200.0,
        };
        blimp.advance(3.0, 12345.0);
        assert_eq!(blimp.rect().left(), 800.0);
        assert!((blimp.rect().top() - 200.0).abs() <= 30.0);
    }

    #[test]
    fn test_fog_overlap_uses_scroll() {
        let fog = FogBand {
            x: 600.0,
            width: 200.0,
            cleared: false,
        };
        assert!(!fog.overlaps_span(0.0, 150.0, 175.0));
        assert!(fog.overlaps_span(450.0, 150.0, 175.0));
    }
}
