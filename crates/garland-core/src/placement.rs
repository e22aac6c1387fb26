//! Procedural placement: the assembled cone/helix home and the dispersed shell.
//!
//! Every function draws from a caller-supplied random source in a fixed order,
//! so identical `(index, kind, total, seed)` always reproduce the same poses.

use crate::constants::*;
use crate::particle::{ParticleKind, ScatterPose, Transform};
use glam::Vec3;
use rand::prelude::*;
use std::f32::consts::{PI, TAU};

/// Everything computed once when a particle is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub home: Vec3,
    pub scatter: ScatterPose,
    pub phase: f32,
    pub spin: Vec3,
    pub initial: Transform,
}

/// Axis-aligned envelope of the home poses for one kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HomeBounds {
    pub max_radius: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl HomeBounds {
    pub fn contains(&self, p: Vec3) -> bool {
        let r = (p.x * p.x + p.z * p.z).sqrt();
        r <= self.max_radius && p.y >= self.min_height && p.y <= self.max_height
    }
}

/// Derive an independent generator for one particle from the registry seed.
pub fn particle_rng(seed: u64, index: usize) -> StdRng {
    let mix = seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(mix)
}

pub fn home_bounds(kind: ParticleKind) -> HomeBounds {
    let half = HOME_HEIGHT_SPAN / 2.0;
    if kind.is_ambient() {
        HomeBounds {
            max_radius: HOME_RADIUS_MAX * AMBIENT_HOME_SPREAD,
            min_height: -half * AMBIENT_HOME_SPREAD,
            max_height: half * AMBIENT_HOME_SPREAD,
        }
    } else {
        // Jitter is at most half the amplitude on each axis.
        let j = HOME_JITTER / 2.0;
        HomeBounds {
            max_radius: HOME_RADIUS_MAX + j * std::f32::consts::SQRT_2,
            min_height: -half - j,
            max_height: half + j,
        }
    }
}

/// Home position on the assembled cone.
pub fn home_pose<R: Rng + ?Sized>(
    index: usize,
    kind: ParticleKind,
    total: usize,
    rng: &mut R,
) -> Vec3 {
    let t_linear = if total == 0 {
        0.0
    } else {
        (index as f32 / total as f32).clamp(0.0, 1.0)
    };
    let t = t_linear.powf(HOME_DENSITY_EXPONENT);
    let height = HOME_HEIGHT_SPAN * (1.0 - t) - HOME_HEIGHT_SPAN / 2.0;
    let radius = HOME_RADIUS_MAX * t;
    let angle = t * HOME_SPIRAL_TIGHTNESS * PI;
    let pos = Vec3::new(angle.cos() * radius, height, angle.sin() * radius);

    if kind.is_ambient() {
        pos * AMBIENT_HOME_SPREAD
    } else {
        let jitter = Vec3::new(
            rng.gen::<f32>() - 0.5,
            rng.gen::<f32>() - 0.5,
            rng.gen::<f32>() - 0.5,
        ) * HOME_JITTER;
        pos + jitter
    }
}

/// Shell position used while dispersed.
pub fn scatter_pose<R: Rng + ?Sized>(kind: ParticleKind, rng: &mut R) -> ScatterPose {
    if kind.is_ambient() {
        let radius = AMBIENT_SCATTER_RADIUS_MIN + rng.gen::<f32>() * AMBIENT_SCATTER_RADIUS_SPREAD;
        let angle = rng.gen::<f32>() * TAU;
        let span = AMBIENT_SCATTER_HEIGHT_MAX - AMBIENT_SCATTER_HEIGHT_MIN;
        let height = (AMBIENT_SCATTER_HEIGHT_MIN + rng.gen::<f32>() * span)
            .clamp(AMBIENT_SCATTER_HEIGHT_MIN, AMBIENT_SCATTER_HEIGHT_MAX);
        return ScatterPose {
            radius,
            angle,
            height,
        };
    }
    let angle = rng.gen::<f32>() * TAU;
    let bias = rng.gen::<f32>().powf(SCATTER_RADIAL_EXPONENT);
    let jitter = 1.0 + (rng.gen::<f32>() - 0.5) * SCATTER_RADIAL_JITTER;
    let radius = (SCATTER_RADIUS_BASE + bias * SCATTER_RADIUS_SPREAD) * jitter;
    let span = SCATTER_HEIGHT_MAX - SCATTER_HEIGHT_MIN;
    let height = (SCATTER_HEIGHT_MIN + rng.gen::<f32>() * span)
        .clamp(SCATTER_HEIGHT_MIN, SCATTER_HEIGHT_MAX);
    ScatterPose {
        radius,
        angle,
        height,
    }
}

/// Full creation-time placement for a procedurally generated particle.
pub fn place<R: Rng + ?Sized>(
    index: usize,
    kind: ParticleKind,
    total: usize,
    rng: &mut R,
) -> Placement {
    let home = home_pose(index, kind, total, rng);
    let scatter = scatter_pose(kind, rng);
    let phase = rng.gen::<f32>() * TAU;
    let spin = Vec3::new(
        rng.gen::<f32>() - 0.5,
        rng.gen::<f32>() - 0.5,
        rng.gen::<f32>() - 0.5,
    ) * (2.0 * SPIN_MAX_PER_FRAME);
    let spawn = Vec3::new(
        rng.gen::<f32>() - 0.5,
        rng.gen::<f32>() - 0.5,
        rng.gen::<f32>() - 0.5,
    ) * (2.0 * SPAWN_CUBE_HALF_EXTENT);
    let initial = Transform {
        position: spawn,
        rotation: Vec3::new(rng.gen::<f32>() * PI, rng.gen::<f32>() * PI, 0.0),
        scale: 1.0,
    };
    Placement {
        home,
        scatter,
        phase,
        spin,
        initial,
    }
}
