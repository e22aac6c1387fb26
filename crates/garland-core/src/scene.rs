//! Per-frame orchestration of registry, mode machine, interpolator and governor.

use crate::device::{DeviceHints, DeviceProfile, ParticleBudget};
use crate::error::ConfigError;
use crate::focus::FocusSelector;
use crate::governor::{AdaptiveGovernor, Adjustment, GovernorConfig};
use crate::instance::InstanceRaw;
use crate::mode::{ModeEvent, ModeMachine, ModeState, Transition};
use crate::motion::{FrameClock, SmoothingRates, TransitionInterpolator};
use crate::particle::{MediaHandle, Particle, ParticleId};
use crate::registry::{KindMix, ParticleRegistry};
use crate::viewer::Viewer;
use glam::{Mat4, Vec2};
use rand::prelude::*;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    pub seed: u64,
    pub budget: ParticleBudget,
    pub kind_mix: KindMix,
    pub rates: SmoothingRates,
    pub governor: GovernorConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::for_device(&DeviceProfile::detect(DeviceHints::default()), 42)
    }
}

impl SceneConfig {
    pub fn for_device(profile: &DeviceProfile, seed: u64) -> Self {
        Self {
            seed,
            budget: profile.budget,
            kind_mix: KindMix::default(),
            rates: SmoothingRates::default(),
            governor: GovernorConfig::for_device(profile.hints.effective_pixel_ratio()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.kind_mix.validate()?;
        self.governor.validate()
    }
}

/// Everything the render surface hands in for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    /// Monotonic timestamp of this frame.
    pub now: Duration,
    pub viewer: Viewer,
    /// External yaw (x) and pitch (y) offset, e.g. from a tracked hand.
    pub rotation_offset: Vec2,
}

impl FrameInput {
    pub fn at(now: Duration) -> Self {
        Self {
            now,
            viewer: Viewer::default(),
            rotation_offset: Vec2::ZERO,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    /// Elapsed time in 60 Hz reference frames.
    pub frames: f32,
    pub visible: usize,
    pub adjustment: Option<Adjustment>,
}

pub struct Choreographer {
    registry: ParticleRegistry,
    selector: FocusSelector,
    modes: ModeMachine,
    motion: TransitionInterpolator,
    governor: AdaptiveGovernor,
    clock: FrameClock,
    rng: StdRng,
    instances: Vec<InstanceRaw>,
}

impl Choreographer {
    pub fn new(config: SceneConfig, now: Duration) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut registry =
            ParticleRegistry::populate(config.seed, &config.budget, &config.kind_mix)?;
        let governor = AdaptiveGovernor::new(config.governor, now);
        registry.set_active_fraction(governor.active_fraction());
        log::info!(
            "[scene] {} particles ({} decorations, {} placeholders, {} ambient)",
            registry.len(),
            config.budget.decorations,
            config.budget.placeholders,
            config.budget.ambient
        );
        Ok(Self {
            instances: Vec::with_capacity(registry.len()),
            registry,
            selector: FocusSelector::new(),
            modes: ModeMachine::new(),
            motion: TransitionInterpolator::new(config.rates),
            governor,
            clock: FrameClock::default(),
            rng: StdRng::seed_from_u64(config.seed.rotate_left(17)),
        })
    }

    pub fn handle(&mut self, event: ModeEvent) -> Option<Transition> {
        let transition = self
            .modes
            .apply(event, &mut self.selector, &self.registry, &mut self.rng);
        if let Some(t) = &transition {
            log::info!("[mode] {:?} -> {:?} focus={:?}", t.from, t.to, t.focus);
        }
        transition
    }

    pub fn add_media_particle(&mut self, handle: MediaHandle) -> ParticleId {
        let id = self.registry.add_media_particle(handle);
        self.selector.invalidate();
        id
    }

    /// Remove user media. Releases focus first if it was the focus target.
    pub fn evict_media(&mut self, handle: MediaHandle) -> bool {
        let Some(id) = self.registry.evict_media(handle) else {
            return false;
        };
        self.selector.invalidate();
        if let Some(t) = self.modes.release_focus(id) {
            log::info!("[mode] {:?} -> {:?} (focus target evicted)", t.from, t.to);
        }
        true
    }

    /// Run one frame: resolve targets, interpolate, sample, maybe rebalance.
    pub fn update(&mut self, input: FrameInput) -> FrameReport {
        let frames = self.clock.tick(input.now);
        let mode = self.modes.state().mode();
        self.motion.advance(mode, input.rotation_offset, frames);
        self.modes
            .ensure_anchor(&input.viewer, self.motion.group_transform());

        let orbit = self.motion.orbit_angle();
        for particle in self.registry.iter_mut() {
            if !particle.is_visible() {
                continue;
            }
            let target = self.modes.resolve_target(particle, orbit);
            self.motion.apply(particle, target, frames);
        }

        let adjustment = self.governor.tick(input.now);
        if let Some(adj) = &adjustment {
            self.registry.set_active_fraction(adj.active_fraction);
        }

        self.pack_instances();
        FrameReport {
            frames,
            visible: self.instances.len(),
            adjustment,
        }
    }

    fn pack_instances(&mut self) {
        let group = self.motion.group_transform();
        self.instances.clear();
        self.instances
            .extend(self.registry.visible().map(|p| InstanceRaw::new(&group, p)));
    }

    pub fn visible(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.registry.visible()
    }

    /// Instance data packed by the last `update`.
    pub fn instances(&self) -> &[InstanceRaw] {
        &self.instances
    }

    pub fn registry(&self) -> &ParticleRegistry {
        &self.registry
    }

    pub fn governor(&self) -> &AdaptiveGovernor {
        &self.governor
    }

    pub fn pixel_scale(&self) -> f32 {
        self.governor.pixel_scale()
    }

    pub fn active_fraction(&self) -> f32 {
        self.registry.active_fraction()
    }

    pub fn controls_frozen(&self) -> bool {
        self.modes.state().controls_frozen()
    }

    pub fn mode_state(&self) -> &ModeState {
        self.modes.state()
    }

    pub fn group_transform(&self) -> Mat4 {
        self.motion.group_transform()
    }
}
