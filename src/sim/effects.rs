//! Timestamped, self-expiring effects
//!
//! Every window the physics reads is a `{started_at, duration}` record tested
//! against the host timestamp of the current frame. Nothing here runs on its
//! own clock: if the host stops supplying frames, nothing expires.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// A window of host time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    /// Host timestamp (ms) the window opened
    pub started_at: f64,
    pub duration: f64,
}

impl TimedEffect {
    pub fn new(started_at: f64, duration: f64) -> Self {
        Self {
            started_at,
            duration,
        }
    }

    /// Active until `now - started_at` reaches the duration
    #[inline]
    pub fn is_active(&self, now: f64) -> bool {
        now - self.started_at < self.duration
    }

    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.started_at).max(0.0)
    }

    pub fn remaining(&self, now: f64) -> f64 {
        (self.duration - self.elapsed(now)).max(0.0)
    }

    /// 0 at start, 1 once expired
    pub fn progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed(now) / self.duration).min(1.0) as f32
    }
}

/// `Some` and still running
#[inline]
pub fn is_active(effect: &Option<TimedEffect>, now: f64) -> bool {
    effect.is_some_and(|e| e.is_active(now))
}

/// Announced gust: the direction is fixed when the warning fires
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindWarning {
    /// -1 pushes left, +1 pushes right
    pub direction: f32,
    /// Lead time before the gust
    pub effect: TimedEffect,
}

/// A gust pushing the player sideways
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindGust {
    pub direction: f32,
    pub strength: f32,
    pub effect: TimedEffect,
}

/// Fog-clearing beam fired from the player (cosmetic)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    /// Screen x of the targeted fog band when fired
    pub target_x: f32,
    pub effect: TimedEffect,
}

/// Electric flash where the player was hit (cosmetic)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zap {
    pub origin: Vec2,
    pub effect: TimedEffect,
}

/// Cleared fog breaking apart (cosmetic), in scroll space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DissolvingFog {
    pub x: f32,
    pub width: f32,
    pub effect: TimedEffect,
}

/// Short-lived HUD line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub effect: TimedEffect,
}

/// All windows the simulation tracks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Effects {
    /// Pre-roll after stage entry or respawn: scroll, gravity and input frozen
    pub ready: Option<TimedEffect>,
    /// Collisions ignored
    pub invincibility: Option<TimedEffect>,
    /// Opened when fog first comes on screen, dropped when none is visible.
    /// Stays latched after expiry so a long fog bank only softens gravity once.
    pub fog_pause: Option<TimedEffect>,
    pub wind_warning: Option<WindWarning>,
    pub wind_gust: Option<WindGust>,
    /// No wind warnings right after a city respawn
    pub wind_calm: Option<TimedEffect>,
    pub beam: Option<Beam>,
    pub zap: Option<Zap>,
    pub dissolving_fogs: Vec<DissolvingFog>,
    pub message: Option<Message>,
    /// Countdown on the interstitial screen before the next flight
    pub interstitial: Option<TimedEffect>,
}

impl Effects {
    pub fn ready_active(&self, now: f64) -> bool {
        is_active(&self.ready, now)
    }

    pub fn invincible(&self, now: f64) -> bool {
        is_active(&self.invincibility, now)
    }

    /// Whole seconds left on the ready countdown, for the HUD
    pub fn ready_countdown(&self, now: f64) -> Option<u32> {
        self.ready
            .filter(|r| r.is_active(now))
            .map(|r| (r.remaining(now) / 1000.0).ceil() as u32)
    }

    pub fn start_ready(&mut self, now: f64, tuning: &Tuning) {
        self.ready = Some(TimedEffect::new(now, tuning.ready_ms));
    }

    /// Ready pre-roll plus an invincibility window that outlasts it
    pub fn start_respawn(&mut self, now: f64, tuning: &Tuning) {
        self.start_ready(now, tuning);
        self.invincibility = Some(TimedEffect::new(
            now,
            tuning.invincibility_ms.max(tuning.ready_ms),
        ));
    }

    pub fn clear_wind(&mut self) {
        self.wind_warning = None;
        self.wind_gust = None;
    }

    pub fn show_message(&mut self, text: impl Into<String>, now: f64, duration: f64) {
        self.message = Some(Message {
            text: text.into(),
            effect: TimedEffect::new(now, duration),
        });
    }

    /// Current HUD message, if it has not expired
    pub fn message_text(&self, now: f64) -> Option<&str> {
        self.message
            .as_ref()
            .filter(|m| m.effect.is_active(now))
            .map(|m| m.text.as_str())
    }

    /// Drop expired windows that nothing needs to remember.
    ///
    /// The fog pause latch, the wind warning and the interstitial countdown
    /// are resolved by the steps that own them and are left alone here.
    pub fn prune(&mut self, now: f64) {
        fn keep(effect: &mut Option<TimedEffect>, now: f64) {
            if effect.is_some_and(|e| !e.is_active(now)) {
                *effect = None;
            }
        }
        keep(&mut self.ready, now);
        keep(&mut self.invincibility, now);
        keep(&mut self.wind_calm, now);
        if self.wind_gust.is_some_and(|g| !g.effect.is_active(now)) {
            self.wind_gust = None;
        }
        if self.beam.is_some_and(|b| !b.effect.is_active(now)) {
            self.beam = None;
        }
        if self.zap.is_some_and(|z| !z.effect.is_active(now)) {
            self.zap = None;
        }
        self.dissolving_fogs.retain(|d| d.effect.is_active(now));
        if self
            .message
            .as_ref()
            .is_some_and(|m| !m.effect.is_active(now))
        {
            self.message = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_effect_expiry_boundary() {
        let effect = TimedEffect::new(1000.0, 500.0);
        assert!(effect.is_active(1000.0));
        assert!(effect.is_active(1499.9));
        assert!(!effect.is_active(1500.0));
        assert_eq!(effect.remaining(1200.0), 300.0);
        assert_eq!(effect.progress(1250.0), 0.5);
        assert_eq!(effect.progress(9999.0), 1.0);
    }

    #[test]
    fn test_respawn_invincibility_outlasts_ready() {
        let tuning = Tuning::default();
        let mut effects = Effects::default();
        effects.start_respawn(10_000.0, &tuning);
        let ready = effects.ready.unwrap();
        let inv = effects.invincibility.unwrap();
        assert!(inv.duration >= ready.duration);
        assert!(effects.ready_active(12_999.0));
        assert!(!effects.ready_active(13_000.0));
        assert!(effects.invincible(14_000.0));
    }

    #[test]
    fn test_ready_countdown_rounds_up() {
        let tuning = Tuning::default();
        let mut effects = Effects::default();
        effects.start_ready(0.0, &tuning);
        assert_eq!(effects.ready_countdown(0.0), Some(3));
        assert_eq!(effects.ready_countdown(1001.0), Some(2));
        assert_eq!(effects.ready_countdown(2999.0), Some(1));
        assert_eq!(effects.ready_countdown(3000.0), None);
    }

    #[test]
    fn test_prune_keeps_latches() {
        let mut effects = Effects {
            fog_pause: Some(TimedEffect::new(0.0, 2000.0)),
            wind_warning: Some(WindWarning {
                direction: 1.0,
                effect: TimedEffect::new(0.0, 1500.0),
            }),
            zap: Some(Zap {
                origin: Vec2::ZERO,
                effect: TimedEffect::new(0.0, 400.0),
            }),
            ..Default::default()
        };
        effects.show_message("Fog!", 0.0, 1500.0);
        effects.prune(5000.0);
        assert!(effects.fog_pause.is_some());
        assert!(effects.wind_warning.is_some());
        assert!(effects.zap.is_none());
        assert!(effects.message.is_none());
    }
}
