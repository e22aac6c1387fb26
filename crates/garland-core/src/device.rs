//! Device capability hints and the particle budgets derived from them.

/// Capability hints read once at startup. Unknown values fall back to defaults.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceHints {
    pub pixel_ratio: f32,
    pub logical_cores: u32,
    pub memory_gb: f32,
    pub is_mobile: bool,
}

impl Default for DeviceHints {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            logical_cores: 4,
            memory_gb: 4.0,
            is_mobile: false,
        }
    }
}

impl DeviceHints {
    /// Pixel ratio sanitized to a finite positive value no larger than 3.
    pub fn effective_pixel_ratio(&self) -> f32 {
        if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio.min(3.0)
        } else {
            1.0
        }
    }

    pub fn score(&self) -> f32 {
        let cores = if self.logical_cores == 0 { 4 } else { self.logical_cores };
        let memory = if self.memory_gb.is_finite() && self.memory_gb > 0.0 {
            self.memory_gb
        } else {
            4.0
        };
        let dense_penalty = if self.effective_pixel_ratio() > 2.0 { 1.0 } else { 0.0 };
        cores as f32 * 0.6 + memory * 0.8 - dense_penalty
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceTier {
    Low,
    Medium,
    High,
}

/// Initial procedural particle counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticleBudget {
    pub decorations: usize,
    pub ambient: usize,
    pub placeholders: usize,
}

impl DeviceTier {
    pub fn from_score(score: f32) -> Self {
        if score >= 9.0 {
            DeviceTier::High
        } else if score <= 5.0 {
            DeviceTier::Low
        } else {
            DeviceTier::Medium
        }
    }

    pub fn budget(self) -> ParticleBudget {
        match self {
            DeviceTier::High => ParticleBudget {
                decorations: 1000,
                ambient: 1200,
                placeholders: 14,
            },
            DeviceTier::Medium => ParticleBudget {
                decorations: 800,
                ambient: 1000,
                placeholders: 12,
            },
            DeviceTier::Low => ParticleBudget {
                decorations: 480,
                ambient: 600,
                placeholders: 8,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceProfile {
    pub hints: DeviceHints,
    pub tier: DeviceTier,
    pub budget: ParticleBudget,
}

impl DeviceProfile {
    pub fn detect(hints: DeviceHints) -> Self {
        let tier = DeviceTier::from_score(hints.score());
        let profile = Self {
            hints,
            tier,
            budget: tier.budget(),
        };
        log::info!(
            "[device] mobile={} cores={} mem={} ratio={:.2} tier={:?}",
            hints.is_mobile,
            hints.logical_cores,
            hints.memory_gb,
            hints.effective_pixel_ratio(),
            tier
        );
        profile
    }
}
