//! Run state and core simulation types
//!
//! `RunState` is the single owned aggregate: every other piece of mutable
//! simulation state is reachable through it. Hosts only ever see it through
//! a shared reference.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::Effects;
use super::level::{CityLevel, FlightLevel, ObstacleKind};
use super::rect::Rect;
use crate::consts::*;
use crate::tuning::Tuning;

/// Top-level game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Title,
    Intro,
    Flight,
    City,
    /// Picture break after the designated city, with a countdown
    DcInterstitial,
    Win,
    GameOver,
}

impl Mode {
    /// Only a restart leaves these
    pub fn is_terminal(&self) -> bool {
        matches!(self, Mode::Win | Mode::GameOver)
    }

    /// Modes that run physics (and can be paused)
    pub fn is_playing(&self) -> bool {
        matches!(self, Mode::Flight | Mode::City)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageKind {
    Flight,
    City,
}

/// One campaign segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: StageKind,
    pub is_final: bool,
}

const fn flight(id: &'static str, name: &'static str) -> Stage {
    Stage {
        id,
        name,
        kind: StageKind::Flight,
        is_final: false,
    }
}

const fn city(id: &'static str, name: &'static str) -> Stage {
    Stage {
        id,
        name,
        kind: StageKind::City,
        is_final: false,
    }
}

/// The campaign, in order
pub const STAGES: [Stage; 9] = [
    flight("northpole", "North Pole"),
    city("montreal", "Montreal"),
    flight("to_nyc", "To NYC"),
    city("nyc", "New York City"),
    flight("to_dc", "To DC"),
    city("dc", "Washington DC"),
    flight("to_nash", "To Nashville"),
    city("nashville", "Nashville"),
    Stage {
        id: "final",
        name: "Final Approach",
        kind: StageKind::Flight,
        is_final: true,
    },
];

/// The sleigh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner, screen space
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub grounded: bool,
    /// Jumps spent since the last ground contact
    pub air_jumps_used: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(150.0, 250.0),
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_W, PLAYER_H),
            grounded: false,
            air_jumps_used: 0,
        }
    }
}

impl Player {
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Place at `pos` at rest
    pub fn reset_to(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.air_jumps_used = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoodyKind {
    Candy,
    Cookie,
    Cocoa,
}

impl GoodyKind {
    pub const ALL: [GoodyKind; 3] = [GoodyKind::Candy, GoodyKind::Cookie, GoodyKind::Cocoa];
}

/// A falling bonus item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goody {
    pub kind: GoodyKind,
    pub center: Vec2,
    pub speed: f32,
}

/// Goody pickup box edge
pub const GOODY_SIZE: f32 = 30.0;

impl Goody {
    pub fn rect(&self) -> Rect {
        Rect::centered(self.center, Vec2::splat(GOODY_SIZE))
    }
}

/// Ambient snow (cosmetic)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snowflake {
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
}

/// What cost the player a life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossCause {
    Ground,
    Obstacle(ObstacleKind),
    ShaftTree,
    Fall,
}

/// Things that happened during one tick, for audio and renderer hooks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ModeChanged { from: Mode, to: Mode },
    StageEntered { index: usize },
    LifeLost { cause: LossCause, lives_left: u32 },
    Landed { points: u64 },
    FogCleared { x: f32 },
    FogHit,
    WindWarning { direction: f32 },
    GustStarted { direction: f32, strength: f32 },
    ChimneyDelivered { id: u32, delivered: u32 },
    AllDelivered,
    GoodyCollected { kind: GoodyKind },
    Won { score: u64 },
    GameOver { score: u64 },
}

/// Edge state for the one-shot inputs carried by held flags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputLatch {
    pub prev: super::tick::HeldInputs,
    /// Set on a jump press, cleared when consumed or released
    pub jump_armed: bool,
    /// Set on a clear-fog press or command in flight, consumed by the next flight frame
    pub clear_fog_armed: bool,
}

impl InputLatch {
    /// Drop pending one-shots; held keys still need a fresh press
    pub fn disarm(&mut self) {
        self.jump_armed = false;
        self.clear_fog_armed = false;
    }
}

/// Complete run state
#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    pub mode: Mode,
    pub paused: bool,
    pub lives: u32,
    /// Always within [0, max energy]
    pub energy: f32,
    /// Index into [`STAGES`]; only ever increases within a run
    pub stage_index: usize,
    pub score: u64,
    pub player: Player,
    /// Flight scroll distance
    pub scroll_x: f32,
    /// Final approach: horizontal scroll stopped above the shaft
    pub in_shaft: bool,
    pub flight: Option<FlightLevel>,
    pub city: Option<CityLevel>,
    /// Presents delivered in the current city
    pub delivered: u32,
    /// Sleigh usable once every present is delivered
    pub can_exit: bool,
    pub goodies: Vec<Goody>,
    pub collected: Vec<GoodyKind>,
    pub last_goody_at: f64,
    /// Wind clock for the current city; starts on the first live frame
    pub last_gust_at: Option<f64>,
    pub effects: Effects,
    pub snow: Vec<Snowflake>,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    pub input: InputLatch,
    /// Host timestamp of the most recent frame
    pub now: f64,
    /// Host timestamp of the last simulated frame (None before the first)
    pub last_frame_at: Option<f64>,
    /// Seed for goodies, wind and snow
    pub seed: u64,
    #[serde(skip)]
    rng: Pcg32,
}

impl RunState {
    /// Fresh state on the title screen
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self {
            mode: Mode::Title,
            paused: false,
            lives: tuning.starting_lives,
            energy: tuning.max_energy,
            stage_index: 0,
            score: 0,
            player: Player {
                pos: tuning.flight_spawn,
                ..Default::default()
            },
            scroll_x: 0.0,
            in_shaft: false,
            flight: None,
            city: None,
            delivered: 0,
            can_exit: false,
            goodies: Vec::new(),
            collected: Vec::new(),
            last_goody_at: 0.0,
            last_gust_at: None,
            effects: Effects::default(),
            snow: Vec::with_capacity(SNOWFLAKES),
            events: Vec::new(),
            input: InputLatch::default(),
            now: 0.0,
            last_frame_at: None,
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Current campaign stage (None once the campaign is exhausted)
    pub fn stage(&self) -> Option<&'static Stage> {
        STAGES.get(self.stage_index)
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Flight progress in [0, 1]
    pub fn progress(&self) -> f32 {
        self.flight
            .as_ref()
            .map(|f| (self.scroll_x / f.length).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }

    /// Switch modes, logging and publishing the change
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            log::info!("Mode {:?} -> {:?}", self.mode, mode);
            self.events.push(GameEvent::ModeChanged {
                from: self.mode,
                to: mode,
            });
            self.mode = mode;
        }
    }
}
