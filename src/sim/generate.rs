//! Deterministic stage generation
//!
//! Layouts are a pure function of the stage id (and, for flight, the stage
//! length). There is no external randomness: the sample source is a
//! closed-form hash of an integer cursor that starts at the sum of the id's
//! UTF-16 code units and advances once per scan step. Retrying a stage keeps
//! the existing layout; a fresh run regenerates the identical one.

use glam::Vec2;

use super::level::{
    AirObstacle, Chimney, CityLevel, FlightLevel, FogBand, GroundObstacle, Monument, Platform,
    PlatformKind, RoofStyle, Shaft, TreeKind,
};
use super::rect::Rect;
use crate::consts::{WORLD_H, WORLD_W};

/// Snow line the ground obstacles stand on
const GROUND_LINE: f32 = WORLD_H - 100.0;

/// Stage id of the campaign's last flight
pub const FINAL_STAGE_ID: &str = "final";

/// Hash an integer into [0, 1): `frac(sin(s) * 10000)`
#[inline]
pub fn hash01(s: i64) -> f64 {
    let x = (s as f64).sin() * 10000.0;
    x - x.floor()
}

/// Reproducible sample sequence keyed by a stage id
#[derive(Debug, Clone)]
pub struct SeedSequence {
    cursor: i64,
}

impl SeedSequence {
    pub fn from_id(id: &str) -> Self {
        Self {
            cursor: id.encode_utf16().map(i64::from).sum(),
        }
    }

    /// Move to the next scan step
    #[inline]
    pub fn step(&mut self) {
        self.cursor += 1;
    }

    /// Sample at `cursor + offset` without advancing
    #[inline]
    pub fn sample(&self, offset: i64) -> f32 {
        hash01(self.cursor + offset) as f32
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }
}

/// Tree silhouette for a flight stage; unknown ids get pines
pub fn tree_kind_for(stage_id: &str) -> TreeKind {
    match stage_id {
        "to_nyc" | "to_dc" => TreeKind::Oak,
        "to_nash" | FINAL_STAGE_ID => TreeKind::Magnolia,
        _ => TreeKind::Pine,
    }
}

/// Generate a flight stage of the given scroll length
pub fn generate_flight(stage_id: &str, length: f32) -> FlightLevel {
    let mut seq = SeedSequence::from_id(stage_id);
    let is_final = stage_id == FINAL_STAGE_ID;
    let dense = if is_final { 2.5 } else { 1.0 };
    let tree = tree_kind_for(stage_id);

    // Ground obstacles: keep the approach to the landing zone clear
    let mut ground = Vec::new();
    let ground_end = if is_final { length - 600.0 } else { length - 400.0 };
    let ground_step = 150.0 / dense;
    let mut x = 200.0;
    while x < ground_end {
        seq.step();
        let r = seq.sample(0);
        if r < 0.6 {
            let h = 60.0 + seq.sample(1) * 80.0;
            ground.push(GroundObstacle::Tree {
                rect: Rect::new(x + seq.sample(2) * 50.0, GROUND_LINE - h, 40.0, h),
                tree,
                variation: seq.sample(3),
            });
        } else if r < 0.8 && !is_final {
            let h = 100.0 + seq.sample(1) * 150.0;
            ground.push(GroundObstacle::Building {
                rect: Rect::new(
                    x + seq.sample(2) * 30.0,
                    GROUND_LINE - h,
                    60.0 + seq.sample(3) * 40.0,
                    h,
                ),
                variation: seq.sample(4),
            });
        }
        x += ground_step;
    }

    // Airborne obstacles
    let mut airborne = Vec::new();
    let air_step = if is_final { 150.0 } else { 400.0 };
    let air_end = if is_final { length - 500.0 } else { length - 600.0 };
    let gate = if is_final { 0.7 } else { 0.3 };
    let mut x = 400.0;
    while x < air_end {
        seq.step();
        if seq.sample(0) < gate {
            let type_roll = seq.sample(1);
            let obstacle = if type_roll < 0.30 {
                let base_y = 100.0 + seq.sample(2) * 200.0;
                AirObstacle::Plane {
                    rect: Rect::new(x, base_y, 80.0, 25.0),
                    base_y,
                    spawn_x: x,
                    speed: 2.0 + seq.sample(3) * 2.0,
                }
            } else if type_roll < 0.55 {
                let base_y = 100.0 + seq.sample(2) * 200.0;
                AirObstacle::Blimp {
                    rect: Rect::new(x, base_y, 100.0, 50.0),
                    base_y,
                }
            } else {
                let base_y = 30.0 + seq.sample(2) * 60.0;
                AirObstacle::Storm {
                    rect: Rect::new(x, base_y, 120.0, 40.0),
                    base_y,
                }
            };
            airborne.push(obstacle);
        }
        x += air_step;
    }

    // Fog banks, never in the final approach
    let mut fogs = Vec::new();
    if !is_final {
        let mut x = 600.0;
        while x < length - 800.0 {
            seq.step();
            if seq.sample(0) < 0.5 {
                fogs.push(FogBand {
                    x,
                    width: 200.0 + seq.sample(1) * 150.0,
                    cleared: false,
                });
            }
            x += 800.0;
        }
    }

    let (landing, shaft) = if is_final {
        let shaft_x = length - 350.0;
        let width = 100.0;
        let tree_h = 400.0;
        let shaft = Shaft {
            x: shaft_x,
            width,
            left_tree: Rect::new(shaft_x - 60.0, GROUND_LINE - tree_h, 60.0, tree_h),
            right_tree: Rect::new(shaft_x + width, GROUND_LINE - tree_h, 60.0, tree_h),
        };
        (Rect::new(shaft_x, WORLD_H - 180.0, 100.0, 50.0), Some(shaft))
    } else {
        let y = 200.0 + seq.sample(100) * 150.0;
        (Rect::new(length - 300.0, y, 120.0, 50.0), None)
    };

    log::debug!(
        "Generated flight '{}': {} ground, {} airborne, {} fog",
        stage_id,
        ground.len(),
        airborne.len(),
        fogs.len()
    );

    FlightLevel {
        stage_id: stage_id.to_string(),
        ground,
        airborne,
        fogs,
        landing,
        length,
        shaft,
        is_final,
    }
}

/// Look and skyline of a city
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityStyle {
    pub facade: u32,
    pub roof: RoofStyle,
    pub heights: [f32; BUILDINGS],
    pub monuments: [Monument; 2],
}

impl CityStyle {
    /// Style for a city id; unknown ids fall back to Montreal
    pub fn for_city(city_id: &str) -> Self {
        match city_id {
            "nyc" => Self {
                facade: 0x2f3542,
                roof: RoofStyle::Flat,
                heights: [280.0, 350.0, 250.0, 320.0, 380.0, 220.0, 300.0],
                monuments: [Monument::StatueOfLiberty, Monument::EmpireState],
            },
            "dc" => Self {
                facade: 0xdfe6e9,
                roof: RoofStyle::Dome,
                heights: [150.0, 200.0, 170.0, 190.0, 160.0, 180.0, 140.0],
                monuments: [Monument::WashingtonMonument, Monument::Capitol],
            },
            "nashville" => Self {
                facade: 0x8b7355,
                roof: RoofStyle::Gabled,
                heights: [160.0, 220.0, 180.0, 240.0, 200.0, 170.0, 190.0],
                monuments: [Monument::Parthenon, Monument::BatmanBuilding],
            },
            "montreal" => Self::MONTREAL,
            other => {
                log::warn!("Unknown city '{}', using default style", other);
                Self::MONTREAL
            }
        }
    }

    const MONTREAL: Self = Self {
        facade: 0x4a6572,
        roof: RoofStyle::Steep,
        heights: [180.0, 240.0, 160.0, 220.0, 260.0, 140.0, 200.0],
        monuments: [Monument::OlympicTower, Monument::NotreDame],
    };
}

/// Buildings per city
pub const BUILDINGS: usize = 7;
/// Gaps between consecutive buildings
const BUILDING_GAPS: [f32; BUILDINGS - 1] = [35.0, 50.0, 40.0, 55.0, 45.0, 50.0];
const CITY_MARGIN: f32 = 20.0;

/// Generate a city stage
pub fn generate_city(city_id: &str) -> CityLevel {
    let style = CityStyle::for_city(city_id);
    let total_gaps: f32 = BUILDING_GAPS.iter().sum();
    let base_width = (WORLD_W - 2.0 * CITY_MARGIN - total_gaps) / BUILDINGS as f32;

    let mut platforms = Vec::new();
    let mut chimneys = Vec::new();
    let mut x = CITY_MARGIN;
    for (i, &h) in style.heights.iter().enumerate() {
        let y = WORLD_H - h;
        let w = base_width + if i % 2 == 0 { -10.0 } else { 10.0 };
        platforms.push(Platform {
            rect: Rect::new(x, y, w, h),
            kind: PlatformKind::Building,
        });

        // Raised block on every other inner building
        if i > 0 && i < BUILDINGS - 1 && i % 2 == 0 {
            let roof_h = 40.0 + ((i * 10) % 30) as f32;
            let roof_w = w * 0.5;
            platforms.push(Platform {
                rect: Rect::new(x + (w - roof_w) / 2.0, y - roof_h, roof_w, roof_h),
                kind: PlatformKind::Rooftop,
            });
        }

        // One chimney on each of the middle three buildings
        if (2..=4).contains(&i) {
            chimneys.push(Chimney {
                id: i as u32,
                rect: Rect::new(x + w / 2.0 - 15.0, y - 35.0, 30.0, 40.0),
                delivered: false,
            });
        }

        x += w + BUILDING_GAPS.get(i).copied().unwrap_or(45.0);
    }

    let first = platforms[0].rect;
    CityLevel {
        city_id: city_id.to_string(),
        facade: style.facade,
        roof: style.roof,
        platforms,
        chimneys,
        spawn: Vec2::new(first.left() + 20.0, first.top() - 30.0),
        sleigh: Rect::new(first.left() + 10.0, first.top() - 25.0, 60.0, 30.0),
        monuments: style.monuments,
    }
}
