//! Shuffled pool of focus candidates.
//!
//! Ids are handed out without repeats until every eligible particle has been
//! issued once, then the pool is rebuilt and reshuffled. The pool tracks the
//! registry's media generation, so media added or evicted since the last
//! request is picked up without a full rescan on every call.

use crate::particle::{MediaHandle, ParticleId};
use crate::registry::ParticleRegistry;
use fnv::FnvHashSet;
use rand::prelude::*;

// A reused media slot holds a different handle, so it counts as a new candidate.
type IssuedKey = (ParticleId, Option<MediaHandle>);

#[derive(Clone, Debug, Default)]
pub struct FocusSelector {
    pool: Vec<ParticleId>,
    issued: FnvHashSet<IssuedKey>,
    generation: Option<u64>,
}

impl FocusSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the pool stale. The next request re-reads membership from the
    /// registry; ids already issued this cycle are not put back.
    pub fn invalidate(&mut self) {
        self.generation = None;
    }

    /// Pop the next focus candidate, or `None` when no user media exists.
    pub fn request_focus<R: Rng + ?Sized>(
        &mut self,
        registry: &ParticleRegistry,
        rng: &mut R,
    ) -> Option<ParticleId> {
        if self.generation != Some(registry.media_generation()) {
            self.refresh(registry, rng);
        }
        if self.pool.is_empty() {
            self.rebuild(registry, rng);
        }
        let id = self.pool.pop()?;
        self.issued.insert(issued_key(registry, id));
        Some(id)
    }

    /// Candidates left before the next rebuild.
    pub fn remaining(&self) -> usize {
        self.pool.len()
    }

    fn refresh<R: Rng + ?Sized>(&mut self, registry: &ParticleRegistry, rng: &mut R) {
        let issued = &self.issued;
        self.pool = registry
            .focus_eligible()
            .filter(|id| !issued.contains(&issued_key(registry, *id)))
            .collect();
        self.pool.shuffle(rng);
        self.generation = Some(registry.media_generation());
    }

    fn rebuild<R: Rng + ?Sized>(&mut self, registry: &ParticleRegistry, rng: &mut R) {
        self.issued.clear();
        self.pool = registry.focus_eligible().collect();
        self.pool.shuffle(rng);
        self.generation = Some(registry.media_generation());
    }
}

fn issued_key(registry: &ParticleRegistry, id: ParticleId) -> IssuedKey {
    (id, registry.get(id).and_then(|p| p.media()))
}
