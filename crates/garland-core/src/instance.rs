//! GPU-facing per-instance records packed from visible particles.

use crate::particle::Particle;
use glam::Mat4;

/// Sentinel written into `media` for particles without user content.
pub const NO_MEDIA: u32 = u32::MAX;

/// Per-instance data uploaded by the render surface, one per visible particle.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    /// Column-major world matrix (group transform times particle transform).
    pub model: [[f32; 4]; 4],
    pub kind: u32,
    pub media: u32,
    pub _pad: [u32; 2],
}

impl InstanceRaw {
    pub fn new(group: &Mat4, particle: &Particle) -> Self {
        let model = *group * particle.transform().matrix();
        Self {
            model: model.to_cols_array_2d(),
            kind: particle.kind().code(),
            media: particle.media().map_or(NO_MEDIA, |h| h.0),
            _pad: [0; 2],
        }
    }

    /// Size of one instance in 32-bit words.
    pub const WORDS: usize = std::mem::size_of::<InstanceRaw>() / 4;
}
