//! Fixed-shape particle records stored contiguously by the registry.

use glam::{EulerRot, Mat4, Quat, Vec3};
use std::f32::consts::{PI, TAU};

/// Stable index of a particle inside its registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub usize);

impl ParticleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Opaque reference to user media owned by the render surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MediaHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ornament {
    Cube,
    Bauble,
    /// Wrapped-tube decoration.
    CandyCane,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Decoration(Ornament),
    Media,
    Ambient,
}

impl ParticleKind {
    #[inline]
    pub fn is_media(self) -> bool {
        matches!(self, ParticleKind::Media)
    }

    #[inline]
    pub fn is_ambient(self) -> bool {
        matches!(self, ParticleKind::Ambient)
    }

    /// Numeric code written into instance data so shaders can pick a mesh.
    pub fn code(self) -> u32 {
        match self {
            ParticleKind::Decoration(Ornament::Cube) => 0,
            ParticleKind::Decoration(Ornament::Bauble) => 1,
            ParticleKind::Decoration(Ornament::CandyCane) => 2,
            ParticleKind::Media => 3,
            ParticleKind::Ambient => 4,
        }
    }
}

/// Placement on the dispersed cylindrical shell, before orbit rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterPose {
    pub radius: f32,
    pub angle: f32,
    pub height: f32,
}

impl ScatterPose {
    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.angle.cos() * self.radius,
            self.height,
            self.angle.sin() * self.radius,
        )
    }

    /// Position after rotating the shell about +Y by `orbit` radians.
    pub fn at_orbit(&self, orbit: f32) -> Vec3 {
        Quat::from_rotation_y(orbit) * self.position()
    }
}

/// The only per-frame written state of a particle. Rotation is XYZ Euler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.position)
    }
}

/// Wrap an angle into `[-PI, PI)` so accumulated spin stays bounded.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

#[derive(Clone, Debug)]
pub struct Particle {
    id: ParticleId,
    kind: ParticleKind,
    home: Vec3,
    scatter: ScatterPose,
    phase: f32,
    spin: Vec3,
    media: Option<MediaHandle>,
    user_supplied: bool,
    pub(crate) transform: Transform,
    pub(crate) active: bool,
    pub(crate) retired: bool,
}

impl Particle {
    pub(crate) fn new(
        id: ParticleId,
        kind: ParticleKind,
        placement: crate::placement::Placement,
        media: Option<MediaHandle>,
    ) -> Self {
        Self {
            id,
            kind,
            home: placement.home,
            scatter: placement.scatter,
            phase: placement.phase,
            spin: placement.spin,
            user_supplied: media.is_some(),
            media,
            transform: placement.initial,
            active: true,
            retired: false,
        }
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }
    pub fn kind(&self) -> ParticleKind {
        self.kind
    }
    pub fn home(&self) -> Vec3 {
        self.home
    }
    pub fn scatter(&self) -> &ScatterPose {
        &self.scatter
    }
    pub fn phase(&self) -> f32 {
        self.phase
    }
    /// Per-axis rotation applied each reference frame while dispersed.
    pub fn spin(&self) -> Vec3 {
        self.spin
    }
    pub fn media(&self) -> Option<MediaHandle> {
        self.media
    }
    /// True only for media particles created from uploaded content.
    pub fn is_user_supplied(&self) -> bool {
        self.user_supplied
    }
    pub fn transform(&self) -> &Transform {
        &self.transform
    }
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
    pub fn is_retired(&self) -> bool {
        self.retired
    }
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.active && !self.retired
    }
    pub fn is_focus_eligible(&self) -> bool {
        self.user_supplied && !self.retired
    }
}
