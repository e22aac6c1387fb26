//! Visual mode state machine and per-frame target resolution.

use crate::constants::*;
use crate::focus::FocusSelector;
use crate::particle::{Particle, ParticleId};
use crate::registry::ParticleRegistry;
use crate::viewer::Viewer;
use glam::{Mat4, Vec3};
use rand::Rng;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Assembled,
    Dispersed,
    Focus,
}

/// Discrete requests delivered by input collaborators (gestures, taps).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModeEvent {
    /// Flip between assembled and dispersed; from focus this assembles.
    Toggle,
    EnterAssembled,
    EnterDispersed,
    EnterFocus,
    ExitFocus,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusTarget {
    pub id: ParticleId,
    /// Group-local position in front of the viewer, fixed on the first frame
    /// after acquisition.
    pub anchor: Option<Vec3>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModeState {
    mode: Mode,
    focus: Option<FocusTarget>,
}

impl ModeState {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn focus(&self) -> Option<&FocusTarget> {
        self.focus.as_ref()
    }

    pub fn focus_target(&self) -> Option<ParticleId> {
        self.focus.map(|f| f.id)
    }

    /// The render surface must not move the camera while this is set.
    pub fn controls_frozen(&self) -> bool {
        self.mode == Mode::Focus
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
    pub focus: Option<ParticleId>,
}

/// Where a particle is heading this frame and which motion style applies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Target {
    Assembled(Vec3),
    Dispersed(Vec3),
    FocusSubject(Vec3),
    FocusBackground(Vec3),
}

impl Target {
    pub fn position(&self) -> Vec3 {
        match *self {
            Target::Assembled(p)
            | Target::Dispersed(p)
            | Target::FocusSubject(p)
            | Target::FocusBackground(p) => p,
        }
    }
}

/// Dispersed target: the orbiting shell position plus a phase-shifted bob.
pub fn dispersed_position(particle: &Particle, orbit: f32) -> Vec3 {
    let wobble = (orbit * WOBBLE_FREQUENCY + particle.phase()).sin() * WOBBLE_AMPLITUDE;
    particle.scatter().at_orbit(orbit) + Vec3::Y * wobble
}

#[derive(Clone, Debug, Default)]
pub struct ModeMachine {
    state: ModeState,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ModeState {
        &self.state
    }

    /// Apply one event. Returns `None` when the event leaves the state as is,
    /// including a focus request with no eligible media.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        event: ModeEvent,
        selector: &mut FocusSelector,
        registry: &ParticleRegistry,
        rng: &mut R,
    ) -> Option<Transition> {
        let from = self.state.mode;
        let (to, focus) = match (event, from) {
            (ModeEvent::Toggle, Mode::Assembled) => (Mode::Dispersed, None),
            (ModeEvent::Toggle, _) => (Mode::Assembled, None),
            (ModeEvent::EnterAssembled, Mode::Assembled) => return None,
            (ModeEvent::EnterAssembled, _) => (Mode::Assembled, None),
            (ModeEvent::EnterDispersed, Mode::Dispersed) => return None,
            (ModeEvent::EnterDispersed, _) => (Mode::Dispersed, None),
            (ModeEvent::EnterFocus, Mode::Dispersed) => {
                let Some(id) = selector.request_focus(registry, rng) else {
                    log::info!("[mode] focus requested but no user media is available");
                    return None;
                };
                (Mode::Focus, Some(FocusTarget { id, anchor: None }))
            }
            (ModeEvent::EnterFocus, _) => return None,
            (ModeEvent::ExitFocus, Mode::Focus) => (Mode::Dispersed, None),
            (ModeEvent::ExitFocus, _) => return None,
        };
        self.state = ModeState { mode: to, focus };
        Some(Transition {
            from,
            to,
            focus: focus.map(|f| f.id),
        })
    }

    /// Drop back to dispersed if `id` is the current focus target.
    pub fn release_focus(&mut self, id: ParticleId) -> Option<Transition> {
        if self.state.focus_target() != Some(id) {
            return None;
        }
        let from = self.state.mode;
        self.state = ModeState {
            mode: Mode::Dispersed,
            focus: None,
        };
        Some(Transition {
            from,
            to: Mode::Dispersed,
            focus: None,
        })
    }

    /// Fix the focus anchor once per acquisition. `group` maps group-local
    /// space to world space and must be the frozen focus-time transform.
    pub fn ensure_anchor(&mut self, viewer: &Viewer, group: Mat4) -> Option<Vec3> {
        let focus = self.state.focus.as_mut()?;
        let anchor = *focus.anchor.get_or_insert_with(|| {
            let world = viewer.point_ahead(FOCUS_DISTANCE);
            group.inverse().transform_point3(world)
        });
        Some(anchor)
    }

    pub fn resolve_target(&self, particle: &Particle, orbit: f32) -> Target {
        match self.state.mode {
            Mode::Assembled => Target::Assembled(particle.home()),
            Mode::Dispersed => Target::Dispersed(dispersed_position(particle, orbit)),
            Mode::Focus => match self.state.focus {
                Some(FocusTarget {
                    id,
                    anchor: Some(anchor),
                }) if id == particle.id() => Target::FocusSubject(anchor),
                _ => Target::FocusBackground(dispersed_position(particle, orbit)),
            },
        }
    }
}
