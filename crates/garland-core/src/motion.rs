//! Per-particle smoothing toward mode targets and the shared group rotation.
//!
//! Every rate is "fraction of the remaining distance per 60 Hz reference
//! frame". A frame of any other length is converted with [`frame_alpha`], so
//! motion speed does not depend on the display refresh rate.

use crate::constants::*;
use crate::mode::{Mode, Target};
use crate::particle::{wrap_angle, Particle};
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use std::f32::consts::{PI, TAU};
use std::time::Duration;

// 0.7 * 20π = 14π, so the orbit and the wobble both repeat every 20π.
const ORBIT_PERIOD: f32 = 20.0 * PI;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothingRates {
    pub assembled: f32,
    pub dispersed: f32,
    pub focus_target: f32,
    pub focus_background: f32,
    pub scale: f32,
    pub group_yaw: f32,
    pub group_pitch: f32,
}

impl Default for SmoothingRates {
    fn default() -> Self {
        Self {
            assembled: RATE_ASSEMBLED,
            dispersed: RATE_DISPERSED,
            focus_target: RATE_FOCUS_TARGET,
            focus_background: RATE_FOCUS_BACKGROUND,
            scale: RATE_SCALE,
            group_yaw: RATE_GROUP_YAW,
            group_pitch: RATE_GROUP_PITCH,
        }
    }
}

/// Blend factor equivalent to applying `rate` once per reference frame for
/// `frames` reference frames.
#[inline]
pub fn frame_alpha(rate: f32, frames: f32) -> f32 {
    if frames <= 0.0 {
        return 0.0;
    }
    1.0 - (1.0 - rate.clamp(0.0, 1.0)).powf(frames)
}

/// Converts absolute frame timestamps into elapsed reference frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    last: Option<Duration>,
}

impl FrameClock {
    pub fn tick(&mut self, now: Duration) -> f32 {
        let dt = match self.last {
            None => REFERENCE_FRAME_SEC,
            Some(prev) => now.saturating_sub(prev).as_secs_f32().min(MAX_FRAME_DT_SEC),
        };
        self.last = Some(now);
        dt / REFERENCE_FRAME_SEC
    }
}

#[derive(Clone, Debug)]
pub struct TransitionInterpolator {
    rates: SmoothingRates,
    idle_yaw: f32,
    orbit_angle: f32,
    yaw: f32,
    pitch: f32,
    held: Option<(f32, f32)>,
}

impl TransitionInterpolator {
    pub fn new(rates: SmoothingRates) -> Self {
        Self {
            rates,
            idle_yaw: 0.0,
            orbit_angle: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            held: None,
        }
    }

    pub fn rates(&self) -> &SmoothingRates {
        &self.rates
    }

    pub fn orbit_angle(&self) -> f32 {
        self.orbit_angle
    }

    pub fn group_yaw(&self) -> f32 {
        self.yaw
    }

    pub fn group_pitch(&self) -> f32 {
        self.pitch
    }

    /// Whether the group rotation is currently held for focus.
    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }

    /// Maps group-local particle space to world space.
    pub fn group_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(GROUP_SCALE),
            Quat::from_euler(EulerRot::XYZ, self.pitch, self.yaw, 0.0),
            Vec3::ZERO,
        )
    }

    /// Advance the global motion state by `frames` reference frames.
    ///
    /// While focused the group rotation is held at the value captured on the
    /// first focused frame and idle drift pauses; `offset` is ignored.
    pub fn advance(&mut self, mode: Mode, offset: Vec2, frames: f32) {
        if matches!(mode, Mode::Dispersed | Mode::Focus) {
            self.orbit_angle =
                (self.orbit_angle + ORBIT_ANGLE_PER_FRAME * frames).rem_euclid(ORBIT_PERIOD);
        }

        let (target_yaw, target_pitch) = if mode == Mode::Focus {
            *self.held.get_or_insert((self.yaw, self.pitch))
        } else {
            self.held = None;
            self.idle_yaw += IDLE_YAW_PER_FRAME * frames;
            if self.idle_yaw > TAU {
                // Shift both so the smoothed yaw never sees a jump.
                self.idle_yaw -= TAU;
                self.yaw -= TAU;
            }
            (self.idle_yaw + offset.x, offset.y)
        };

        self.yaw += (target_yaw - self.yaw) * frame_alpha(self.rates.group_yaw, frames);
        self.pitch += (target_pitch - self.pitch) * frame_alpha(self.rates.group_pitch, frames);
    }

    /// Move one particle's transform toward `target`.
    pub fn apply(&self, particle: &mut Particle, target: Target, frames: f32) {
        let spin = particle.spin();
        let t = particle.transform_mut();
        let (rate, scale_goal) = match target {
            Target::Assembled(_) => (self.rates.assembled, 1.0),
            Target::Dispersed(_) => (self.rates.dispersed, 1.0),
            Target::FocusSubject(_) => (self.rates.focus_target, FOCUS_SCALE),
            Target::FocusBackground(_) => (self.rates.focus_background, 1.0),
        };

        match target {
            Target::Dispersed(_) | Target::FocusBackground(_) => {
                t.rotation = wrap_euler(t.rotation + spin * frames);
            }
            Target::FocusSubject(_) => {
                // Face the viewer squarely, unwinding along the short way.
                t.rotation = wrap_euler(t.rotation) * (1.0 - frame_alpha(rate, frames));
            }
            Target::Assembled(_) => {}
        }

        t.position += (target.position() - t.position) * frame_alpha(rate, frames);
        t.scale += (scale_goal - t.scale) * frame_alpha(self.rates.scale, frames);
    }
}

impl Default for TransitionInterpolator {
    fn default() -> Self {
        Self::new(SmoothingRates::default())
    }
}

#[inline]
fn wrap_euler(v: Vec3) -> Vec3 {
    Vec3::new(wrap_angle(v.x), wrap_angle(v.y), wrap_angle(v.z))
}
