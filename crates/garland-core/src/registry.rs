//! Arena of particle records with activation subsetting and media slots.

use crate::constants::*;
use crate::device::ParticleBudget;
use crate::error::ConfigError;
use crate::particle::{MediaHandle, Ornament, Particle, ParticleId, ParticleKind, Transform};
use crate::placement::{particle_rng, place, Placement};
use fnv::FnvHashMap;
use glam::Vec3;
use rand::distributions::WeightedIndex;
use rand::prelude::*;

// Salts keep kind draws and media placements independent of per-particle streams
const KIND_SALT: u64 = 0x6B69_6E64_5F6D_6978;
const MEDIA_SALT: u64 = 0x6D65_6469_615F_736C;

const ORNAMENTS: [Ornament; 3] = [Ornament::Cube, Ornament::Bauble, Ornament::CandyCane];

/// Relative weights of the decoration shapes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindMix {
    pub cube: f32,
    pub bauble: f32,
    pub candy_cane: f32,
}

impl Default for KindMix {
    fn default() -> Self {
        Self {
            cube: 0.4,
            bauble: 0.3,
            candy_cane: 0.3,
        }
    }
}

impl KindMix {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("cube", self.cube),
            ("bauble", self.bauble),
            ("candy_cane", self.candy_cane),
        ];
        for (ornament, weight) in named {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight { ornament, weight });
            }
        }
        if named.iter().all(|(_, w)| *w == 0.0) {
            return Err(ConfigError::EmptyKindMix);
        }
        Ok(())
    }

    fn distribution(&self) -> Result<WeightedIndex<f32>, ConfigError> {
        self.validate()?;
        WeightedIndex::new([self.cube, self.bauble, self.candy_cane])
            .map_err(|_| ConfigError::EmptyKindMix)
    }
}

/// Owns every particle. Ids are indices into one contiguous array.
#[derive(Clone, Debug)]
pub struct ParticleRegistry {
    particles: Vec<Particle>,
    seed: u64,
    decoration_total: usize,
    non_media_count: usize,
    active_fraction: f32,
    by_handle: FnvHashMap<MediaHandle, ParticleId>,
    free_media: Vec<ParticleId>,
    media_generation: u64,
    sealed: bool,
}

impl ParticleRegistry {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            seed,
            decoration_total: 0,
            non_media_count: 0,
            active_fraction: ACTIVE_FRACTION_MAX,
            by_handle: FnvHashMap::default(),
            free_media: Vec::new(),
            media_generation: 0,
            sealed: false,
        }
    }

    /// Build the start-up population: decorations, placeholder frames, ambient motes.
    pub fn populate(
        seed: u64,
        budget: &ParticleBudget,
        mix: &KindMix,
    ) -> Result<Self, ConfigError> {
        let mut registry = Self::new(seed);
        registry.create_procedural(budget.decorations, mix)?;
        registry.create_placeholders(budget.placeholders)?;
        registry.create_ambient(budget.ambient)?;
        Ok(registry)
    }

    /// Append `count` decorations whose shape is drawn from `mix`.
    pub fn create_procedural(&mut self, count: usize, mix: &KindMix) -> Result<(), ConfigError> {
        self.ensure_unsealed()?;
        let dist = mix.distribution()?;
        let mut kind_rng = StdRng::seed_from_u64(self.seed ^ KIND_SALT);
        self.particles.reserve(count);
        for i in 0..count {
            let kind = ParticleKind::Decoration(ORNAMENTS[dist.sample(&mut kind_rng)]);
            self.push_procedural(i, kind, count);
        }
        self.decoration_total += count;
        self.set_active_fraction(self.active_fraction);
        Ok(())
    }

    /// Append the lightweight background layer.
    pub fn create_ambient(&mut self, count: usize) -> Result<(), ConfigError> {
        self.ensure_unsealed()?;
        self.particles.reserve(count);
        for i in 0..count {
            self.push_procedural(i, ParticleKind::Ambient, count);
        }
        self.set_active_fraction(self.active_fraction);
        Ok(())
    }

    /// Append media frames without user content. They are never focus candidates.
    pub fn create_placeholders(&mut self, count: usize) -> Result<(), ConfigError> {
        self.ensure_unsealed()?;
        for i in 0..count {
            self.push_procedural(i, ParticleKind::Media, count);
        }
        Ok(())
    }

    fn ensure_unsealed(&self) -> Result<(), ConfigError> {
        if self.sealed {
            Err(ConfigError::RegistrySealed)
        } else {
            Ok(())
        }
    }

    fn push_procedural(&mut self, index: usize, kind: ParticleKind, total: usize) {
        let id = ParticleId(self.particles.len());
        let mut rng = particle_rng(self.seed, id.index());
        let placement = place(index, kind, total, &mut rng);
        if !kind.is_media() {
            self.non_media_count += 1;
        }
        self.particles.push(Particle::new(id, kind, placement, None));
    }

    // The epsilon absorbs f32 representation error, e.g. 100 * 0.7 must give 70.
    fn budget_for(&self, non_media: usize) -> usize {
        let exact = non_media as f64 * self.active_fraction as f64;
        ((exact + 1e-3).floor() as usize).min(non_media)
    }

    /// Insert a user-supplied media particle and return its id.
    ///
    /// Re-adding a handle that is already present returns the existing id.
    pub fn add_media_particle(&mut self, handle: MediaHandle) -> ParticleId {
        if let Some(&id) = self.by_handle.get(&handle) {
            log::warn!("[media] handle {} already present as particle {}", handle.0, id.0);
            return id;
        }
        self.sealed = true;
        self.media_generation += 1;

        let slot = self.free_media.pop();
        let id = slot.unwrap_or(ParticleId(self.particles.len()));
        let mut rng = particle_rng(self.seed ^ MEDIA_SALT ^ self.media_generation, id.index());
        let total = self.decoration_total.max(1);
        let index = rng.gen_range(0..total);
        let placement = Placement {
            initial: Transform {
                position: Vec3::from(MEDIA_SPAWN_POSITION),
                rotation: Vec3::ZERO,
                scale: 1.0,
            },
            ..place(index, ParticleKind::Media, total, &mut rng)
        };
        let particle = Particle::new(id, ParticleKind::Media, placement, Some(handle));
        match slot {
            Some(id) => self.particles[id.index()] = particle,
            None => self.particles.push(particle),
        }
        self.by_handle.insert(handle, id);
        log::info!("[media] added handle {} as particle {}", handle.0, id.0);
        id
    }

    /// Retire the media particle bound to `handle`. Its slot may be reused later.
    pub fn evict_media(&mut self, handle: MediaHandle) -> Option<ParticleId> {
        let Some(id) = self.by_handle.remove(&handle) else {
            log::warn!("[media] evict of unknown handle {}", handle.0);
            return None;
        };
        let particle = &mut self.particles[id.index()];
        particle.retired = true;
        particle.active = false;
        self.free_media.push(id);
        self.media_generation += 1;
        log::info!("[media] evicted handle {} from particle {}", handle.0, id.0);
        Some(id)
    }

    /// Clamp `fraction` to the allowed range and recompute which non-media
    /// particles are active. The first `floor(n * f)` in id order stay active.
    pub fn set_active_fraction(&mut self, fraction: f32) -> f32 {
        let fraction = if fraction.is_nan() {
            ACTIVE_FRACTION_MAX
        } else {
            fraction.clamp(ACTIVE_FRACTION_MIN, ACTIVE_FRACTION_MAX)
        };
        self.active_fraction = fraction;
        let budget = self.budget_for(self.non_media_count);
        let mut used = 0usize;
        for p in &mut self.particles {
            if p.kind().is_media() {
                p.active = !p.retired;
                continue;
            }
            p.active = used < budget;
            used += 1;
        }
        fraction
    }

    pub fn active_fraction(&self) -> f32 {
        self.active_fraction
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id.index())
    }

    pub fn id_for(&self, handle: MediaHandle) -> Option<ParticleId> {
        self.by_handle.get(&handle).copied()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn non_media_count(&self) -> usize {
        self.non_media_count
    }

    pub fn active_non_media(&self) -> usize {
        self.particles
            .iter()
            .filter(|p| !p.kind().is_media() && p.active)
            .count()
    }

    /// Bumped whenever the set of focus-eligible particles may have changed.
    pub fn media_generation(&self) -> u64 {
        self.media_generation
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.particles.iter()
    }

    /// Mutable traversal for the interpolator. Poses stay read-only.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> + '_ {
        self.particles.iter_mut()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.particles.iter().filter(|p| p.is_visible())
    }

    pub fn focus_eligible(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.particles
            .iter()
            .filter(|p| p.is_focus_eligible())
            .map(|p| p.id())
    }
}
