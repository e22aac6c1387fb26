//! Frame-time feedback loop trading render resolution and particle count
//! against a 60 fps target.
//!
//! Sampling happens every frame. A rebalance is attempted at most once per
//! adjustment interval and only with enough samples; its policy, in order:
//!
//! 1. emergency drop to the floors when the mean is far below target,
//!    gated by a cooldown;
//! 2. nothing while that cooldown runs;
//! 3. a mild downgrade below the lower edge of the dead band;
//! 4. a smaller upgrade above its upper edge.

use crate::constants::*;
use crate::error::ConfigError;
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GovernorConfig {
    pub pixel_scale_floor: f32,
    pub pixel_scale_ceiling: f32,
    pub pixel_scale_initial: f32,
    pub pixel_scale_step_down: f32,
    pub pixel_scale_step_up: f32,
    pub fraction_ceiling: f32,
    pub fraction_emergency_floor: f32,
    pub fraction_downgrade_floor: f32,
    pub fraction_emergency_drop: f32,
    pub fraction_step_down: f32,
    pub fraction_step_up: f32,
    pub window: usize,
    pub min_samples: usize,
    pub max_plausible_fps: f32,
    pub adjust_interval: Duration,
    pub emergency_cooldown: Duration,
    pub fps_emergency: f32,
    pub fps_downgrade: f32,
    pub fps_upgrade: f32,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self::for_device(1.0)
    }
}

impl GovernorConfig {
    /// Bounds derived from the display's pixel density. The ceiling follows
    /// the density up to a cap; the floor never exceeds the ceiling.
    pub fn for_device(pixel_ratio: f32) -> Self {
        let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        let ceiling = ratio.min(PIXEL_SCALE_CAP);
        let floor = PIXEL_SCALE_FLOOR.min(ceiling);
        Self {
            pixel_scale_floor: floor,
            pixel_scale_ceiling: ceiling,
            pixel_scale_initial: (ratio * PIXEL_SCALE_INITIAL_FACTOR).clamp(floor, ceiling),
            pixel_scale_step_down: PIXEL_SCALE_STEP_DOWN,
            pixel_scale_step_up: PIXEL_SCALE_STEP_UP,
            fraction_ceiling: FRACTION_CEILING,
            fraction_emergency_floor: FRACTION_EMERGENCY_FLOOR,
            fraction_downgrade_floor: FRACTION_DOWNGRADE_FLOOR,
            fraction_emergency_drop: FRACTION_EMERGENCY_DROP,
            fraction_step_down: FRACTION_STEP_DOWN,
            fraction_step_up: FRACTION_STEP_UP,
            window: GOVERNOR_WINDOW,
            min_samples: GOVERNOR_MIN_SAMPLES,
            max_plausible_fps: GOVERNOR_MAX_PLAUSIBLE_FPS,
            adjust_interval: GOVERNOR_ADJUST_INTERVAL,
            emergency_cooldown: GOVERNOR_EMERGENCY_COOLDOWN,
            fps_emergency: FPS_EMERGENCY,
            fps_downgrade: FPS_DOWNGRADE,
            fps_upgrade: FPS_UPGRADE,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pixel_scale_floor > self.pixel_scale_ceiling {
            return Err(ConfigError::InvertedBounds {
                knob: "pixel scale",
                floor: self.pixel_scale_floor,
                ceiling: self.pixel_scale_ceiling,
            });
        }
        let range = self.pixel_scale_floor..=self.pixel_scale_ceiling;
        if !range.contains(&self.pixel_scale_initial) {
            return Err(ConfigError::InitialOutOfBounds {
                knob: "pixel scale",
                value: self.pixel_scale_initial,
                floor: self.pixel_scale_floor,
                ceiling: self.pixel_scale_ceiling,
            });
        }
        for floor in [self.fraction_emergency_floor, self.fraction_downgrade_floor] {
            if floor > self.fraction_ceiling {
                return Err(ConfigError::InvertedBounds {
                    knob: "active fraction",
                    floor,
                    ceiling: self.fraction_ceiling,
                });
            }
            if floor < ACTIVE_FRACTION_MIN {
                return Err(ConfigError::FractionFloorTooLow(floor));
            }
        }
        if self.fraction_ceiling > ACTIVE_FRACTION_MAX {
            return Err(ConfigError::InvertedBounds {
                knob: "active fraction",
                floor: self.fraction_ceiling,
                ceiling: ACTIVE_FRACTION_MAX,
            });
        }
        if self.window == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        if self.min_samples == 0 || self.min_samples > self.window {
            return Err(ConfigError::MinSamples {
                min_samples: self.min_samples,
                window: self.window,
            });
        }
        if !(self.fps_emergency <= self.fps_downgrade && self.fps_downgrade <= self.fps_upgrade) {
            return Err(ConfigError::UnorderedThresholds);
        }
        Ok(())
    }

    /// Lowest active fraction the governor can ever request.
    pub fn fraction_floor(&self) -> f32 {
        self.fraction_emergency_floor.min(self.fraction_downgrade_floor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdjustmentKind {
    Emergency,
    Downgrade,
    Upgrade,
}

/// Result of one rebalance that changed (or, for emergencies, re-asserted) the knobs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adjustment {
    pub kind: AdjustmentKind,
    pub mean_fps: f32,
    pub pixel_scale: f32,
    pub active_fraction: f32,
}

#[derive(Clone, Debug)]
pub struct AdaptiveGovernor {
    config: GovernorConfig,
    pixel_scale: f32,
    active_fraction: f32,
    samples: VecDeque<f32>,
    last_time: Duration,
    last_adjust: Duration,
    last_emergency: Option<Duration>,
}

impl AdaptiveGovernor {
    /// `now` is the timestamp of creation on the caller's monotonic clock.
    pub fn new(config: GovernorConfig, now: Duration) -> Self {
        Self {
            pixel_scale: config.pixel_scale_initial,
            active_fraction: config.fraction_ceiling,
            samples: VecDeque::with_capacity(config.window),
            last_time: now,
            last_adjust: now,
            last_emergency: None,
            config,
        }
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    pub fn pixel_scale(&self) -> f32 {
        self.pixel_scale
    }

    pub fn active_fraction(&self) -> f32 {
        self.active_fraction
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Take one frame-time sample at `now` and rebalance when due.
    pub fn tick(&mut self, now: Duration) -> Option<Adjustment> {
        let delta = now.saturating_sub(self.last_time).as_secs_f32();
        self.last_time = now;
        if !self.record_fps(1.0 / delta) {
            return None;
        }
        if now.saturating_sub(self.last_adjust) < self.config.adjust_interval
            || self.samples.len() < self.config.min_samples
        {
            return None;
        }
        let mean = self.samples.iter().sum::<f32>() / self.samples.len() as f32;
        self.samples.clear();
        self.last_adjust = now;
        log::debug!("[governor] mean fps {:.1}", mean);
        self.rebalance(mean, now)
    }

    /// Push an fps sample into the window. Non-finite or implausibly high
    /// values are dropped and reported as `false`.
    pub fn record_fps(&mut self, fps: f32) -> bool {
        if !fps.is_finite() || fps <= 0.0 || fps > self.config.max_plausible_fps {
            return false;
        }
        if self.samples.len() == self.config.window {
            self.samples.pop_front();
        }
        self.samples.push_back(fps);
        true
    }

    /// Evaluate the policy for a mean fps measured at `now`.
    pub fn rebalance(&mut self, mean_fps: f32, now: Duration) -> Option<Adjustment> {
        let cfg = self.config;
        let cooling = self
            .last_emergency
            .map(|t| now.saturating_sub(t) < cfg.emergency_cooldown);

        if mean_fps < cfg.fps_emergency && cooling != Some(true) {
            self.last_emergency = Some(now);
            let fraction = (self.active_fraction - cfg.fraction_emergency_drop)
                .max(cfg.fraction_emergency_floor)
                .min(self.active_fraction);
            return Some(self.apply(
                AdjustmentKind::Emergency,
                mean_fps,
                cfg.pixel_scale_floor,
                fraction,
            ));
        }
        if cooling == Some(true) {
            return None;
        }

        let (kind, scale, fraction) = if mean_fps < cfg.fps_downgrade {
            (
                AdjustmentKind::Downgrade,
                (self.pixel_scale - cfg.pixel_scale_step_down).max(cfg.pixel_scale_floor),
                (self.active_fraction - cfg.fraction_step_down)
                    .max(cfg.fraction_downgrade_floor)
                    .min(self.active_fraction),
            )
        } else if mean_fps > cfg.fps_upgrade {
            (
                AdjustmentKind::Upgrade,
                (self.pixel_scale + cfg.pixel_scale_step_up).min(cfg.pixel_scale_ceiling),
                (self.active_fraction + cfg.fraction_step_up).min(cfg.fraction_ceiling),
            )
        } else {
            return None;
        };

        if scale == self.pixel_scale && fraction == self.active_fraction {
            return None;
        }
        Some(self.apply(kind, mean_fps, scale, fraction))
    }

    fn apply(
        &mut self,
        kind: AdjustmentKind,
        mean_fps: f32,
        scale: f32,
        fraction: f32,
    ) -> Adjustment {
        self.pixel_scale = scale;
        self.active_fraction = fraction;
        log::info!(
            "[governor] {:?} at {:.1} fps: pixel scale {:.2}, active fraction {:.2}",
            kind,
            mean_fps,
            scale,
            fraction
        );
        Adjustment {
            kind,
            mean_fps,
            pixel_scale: scale,
            active_fraction: fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_density_display_keeps_floor_under_ceiling() {
        let cfg = GovernorConfig::for_device(1.0);
        assert!(cfg.pixel_scale_floor <= cfg.pixel_scale_ceiling);
        assert!(cfg.validate().is_ok());
        let dense = GovernorConfig::for_device(3.0);
        assert_eq!(dense.pixel_scale_ceiling, PIXEL_SCALE_CAP);
        assert_eq!(dense.pixel_scale_floor, PIXEL_SCALE_FLOOR);
    }

    #[test]
    fn invalid_samples_are_dropped() {
        let mut g = AdaptiveGovernor::new(GovernorConfig::default(), Duration::ZERO);
        assert!(!g.record_fps(f32::INFINITY));
        assert!(!g.record_fps(f32::NAN));
        assert!(!g.record_fps(500.0));
        assert!(g.record_fps(60.0));
        assert_eq!(g.sample_count(), 1);
        // A zero-length frame gives infinite fps.
        assert_eq!(g.tick(Duration::ZERO), None);
        assert_eq!(g.sample_count(), 1);
    }

    #[test]
    fn window_is_bounded() {
        let mut g = AdaptiveGovernor::new(GovernorConfig::default(), Duration::ZERO);
        for _ in 0..500 {
            g.record_fps(60.0);
        }
        assert_eq!(g.sample_count(), GOVERNOR_WINDOW);
    }

    #[test]
    fn downgrade_never_raises_fraction() {
        let cfg = GovernorConfig::for_device(1.5);
        let mut g = AdaptiveGovernor::new(cfg, Duration::ZERO);
        let e = g.rebalance(30.0, Duration::from_secs(1)).unwrap();
        assert_eq!(e.kind, AdjustmentKind::Emergency);
        // 1.0 - 0.15 = 0.85, then another emergency after cooldown gives 0.75.
        let e = g.rebalance(30.0, Duration::from_secs(10)).unwrap();
        assert!((e.active_fraction - 0.75).abs() < 1e-6);
        let d = g.rebalance(50.0, Duration::from_secs(20)).unwrap_or(e);
        assert!(d.active_fraction <= 0.75 + 1e-6);
    }

    #[test]
    fn dead_band_changes_nothing() {
        let mut g = AdaptiveGovernor::new(GovernorConfig::for_device(1.5), Duration::ZERO);
        assert_eq!(g.rebalance(60.0, Duration::from_secs(5)), None);
        assert_eq!(g.rebalance(55.0, Duration::from_secs(7)), None);
        assert_eq!(g.rebalance(65.0, Duration::from_secs(9)), None);
    }
}
