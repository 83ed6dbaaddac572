//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time only arrives as host timestamps passed into `tick`
//! - Seeded RNG only (level layouts use the stage-id hash, everything else
//!   the run's Pcg32)
//! - Stable iteration order (generation order)
//! - No rendering or platform dependencies

pub mod city;
pub mod collision;
pub mod effects;
pub mod flight;
pub mod generate;
pub mod level;
pub mod machine;
pub mod rect;
pub mod state;
pub mod tick;

pub use collision::{lands_on, nearest_platform};
pub use effects::{Effects, TimedEffect};
pub use generate::{generate_city, generate_flight};
pub use level::{CityLevel, FlightLevel, ObstacleKind};
pub use machine::{apply_command, enter_stage};
pub use rect::Rect;
pub use state::{
    GameEvent, Goody, GoodyKind, LossCause, Mode, Player, RunState, STAGES, Stage, StageKind,
};
pub use tick::{Command, HeldInputs, TickInput, tick};
