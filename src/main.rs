//! Sleigh Run entry point
//!
//! The browser build is driven from JS through `sleigh_run::wasm`. Natively
//! this runs a headless autopilot through the campaign and logs what happens,
//! which is handy for eyeballing tuning changes.
//!
//! Usage: `sleigh-run [seed] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(2024);
    let tuning = match args.next().map(std::fs::read_to_string) {
        Some(Ok(json)) => sleigh_run::Tuning::from_json(&json).unwrap_or_else(|err| {
            log::warn!("Ignoring tuning file: {err}");
            sleigh_run::Tuning::default()
        }),
        Some(Err(err)) => {
            log::warn!("Could not read tuning file: {err}");
            sleigh_run::Tuning::default()
        }
        None => sleigh_run::Tuning::default(),
    };

    log::info!("Sleigh Run (native) starting, seed {seed}");
    let summary = autopilot::run(seed, tuning);
    println!(
        "{:?} after {:.1}s: stage {}, score {}, lives {}",
        summary.mode, summary.seconds, summary.stage_index, summary.score, summary.lives
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is sleigh_run::wasm::wasm_start
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use sleigh_run::sim::{Command, GameEvent, HeldInputs, Mode, RunState};
    use sleigh_run::{Engine, Settings, Tuning};

    const FRAME_MS: f64 = 16.67;
    /// Give up after ten minutes of game time
    const MAX_FRAMES: u32 = 36_000;

    pub struct Summary {
        pub mode: Mode,
        pub stage_index: usize,
        pub score: u64,
        pub lives: u32,
        pub seconds: f64,
    }

    pub fn run(seed: u64, tuning: Tuning) -> Summary {
        let mut engine = Engine::with_config(seed, tuning, Settings::default());
        engine.submit_command(Command::StartGame);
        engine.submit_command(Command::StartStage);

        let mut now = 0.0;
        for _ in 0..MAX_FRAMES {
            let held = steer(engine.snapshot());
            if engine.snapshot().mode == Mode::DcInterstitial
                && engine.snapshot().effects.interstitial.is_none()
            {
                engine.submit_command(Command::ConfirmInterstitial);
            }
            engine.advance(now, held);
            report(engine.snapshot());
            if engine.snapshot().mode.is_terminal() {
                break;
            }
            now += FRAME_MS;
        }

        let state = engine.snapshot();
        Summary {
            mode: state.mode,
            stage_index: state.stage_index,
            score: state.score,
            lives: state.lives,
            seconds: now / 1000.0,
        }
    }

    fn report(state: &RunState) {
        for event in &state.events {
            match event {
                GameEvent::LifeLost { cause, lives_left } => {
                    log::info!("Lost a life to {cause:?} ({lives_left} left)")
                }
                GameEvent::Landed { points } => log::info!("Landed for {points}"),
                GameEvent::AllDelivered => log::info!("City done"),
                _ => log::trace!("{event:?}"),
            }
        }
    }

    /// Crude controller: hold altitude toward the landing zone in flight,
    /// walk and hop toward the next target on rooftops
    fn steer(state: &RunState) -> HeldInputs {
        let mut held = HeldInputs::default();
        match state.mode {
            Mode::Flight => {
                let Some(level) = &state.flight else {
                    return held;
                };
                let target_y = level.landing.top() + 10.0;
                held.action = state.player.pos.y > target_y && state.player.vel.y > -1.5;
                held.clear_fog = level
                    .fogs
                    .iter()
                    .any(|f| !f.cleared && f.screen_x(state.scroll_x) - state.player.pos.x < 200.0)
                    && state.now as u64 / 100 % 2 == 0;
            }
            Mode::City => {
                let Some(level) = &state.city else {
                    return held;
                };
                let target = if state.can_exit {
                    Some(level.sleigh)
                } else {
                    level.chimneys.iter().find(|c| !c.delivered).map(|c| c.rect)
                };
                if let Some(target) = target {
                    let dx = target.center_x() - (state.player.pos.x + state.player.size.x / 2.0);
                    held.left = dx < -4.0;
                    held.right = dx > 4.0;
                    // Hop whenever grounded and the target sits higher
                    held.action = state.player.grounded && target.top() < state.player.pos.y;
                }
            }
            _ => {}
        }
        held
    }
}
