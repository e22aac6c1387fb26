// Integration tests for the mode state machine and target resolution.

use garland_core::{
    dispersed_position, FocusSelector, KindMix, MediaHandle, Mode, ModeEvent, ModeMachine,
    ParticleRegistry, Target, Viewer,
};
use glam::{Mat4, Vec3};
use rand::prelude::*;

struct Rig {
    machine: ModeMachine,
    selector: FocusSelector,
    registry: ParticleRegistry,
    rng: StdRng,
}

impl Rig {
    fn new(media: u32) -> Self {
        let mut registry = ParticleRegistry::new(21);
        registry.create_procedural(40, &KindMix::default()).unwrap();
        for h in 0..media {
            registry.add_media_particle(MediaHandle(h));
        }
        Self {
            machine: ModeMachine::new(),
            selector: FocusSelector::new(),
            registry,
            rng: StdRng::seed_from_u64(21),
        }
    }

    fn send(&mut self, event: ModeEvent) -> Option<garland_core::Transition> {
        self.machine
            .apply(event, &mut self.selector, &self.registry, &mut self.rng)
    }

    fn mode(&self) -> Mode {
        self.machine.state().mode()
    }
}

#[test]
fn starts_assembled_without_focus() {
    let rig = Rig::new(0);
    assert_eq!(rig.mode(), Mode::Assembled);
    assert_eq!(rig.machine.state().focus_target(), None);
    assert!(!rig.machine.state().controls_frozen());
}

#[test]
fn toggle_flips_between_assembled_and_dispersed() {
    let mut rig = Rig::new(0);
    let t = rig.send(ModeEvent::Toggle).unwrap();
    assert_eq!((t.from, t.to), (Mode::Assembled, Mode::Dispersed));
    let t = rig.send(ModeEvent::Toggle).unwrap();
    assert_eq!((t.from, t.to), (Mode::Dispersed, Mode::Assembled));
}

#[test]
fn focus_without_media_stays_dispersed() {
    let mut rig = Rig::new(0);
    rig.send(ModeEvent::EnterDispersed);
    assert_eq!(rig.send(ModeEvent::EnterFocus), None);
    assert_eq!(rig.mode(), Mode::Dispersed);
    assert!(!rig.machine.state().controls_frozen());
}

#[test]
fn focus_is_only_entered_from_dispersed() {
    let mut rig = Rig::new(2);
    assert_eq!(rig.send(ModeEvent::EnterFocus), None);
    assert_eq!(rig.mode(), Mode::Assembled);
    rig.send(ModeEvent::EnterDispersed);
    let t = rig.send(ModeEvent::EnterFocus).unwrap();
    assert_eq!(t.to, Mode::Focus);
    assert!(t.focus.is_some());
    assert!(rig.machine.state().controls_frozen());
    // A second request while focused changes nothing.
    let target = rig.machine.state().focus_target();
    assert_eq!(rig.send(ModeEvent::EnterFocus), None);
    assert_eq!(rig.machine.state().focus_target(), target);
}

#[test]
fn leaving_focus_clears_target_and_unfreezes() {
    for exit in [
        ModeEvent::ExitFocus,
        ModeEvent::EnterDispersed,
        ModeEvent::Toggle,
        ModeEvent::EnterAssembled,
    ] {
        let mut rig = Rig::new(1);
        rig.send(ModeEvent::EnterDispersed);
        rig.send(ModeEvent::EnterFocus).unwrap();
        let t = rig.send(exit).unwrap();
        assert_eq!(t.from, Mode::Focus);
        assert_eq!(t.focus, None);
        assert_eq!(rig.machine.state().focus_target(), None);
        assert!(!rig.machine.state().controls_frozen(), "{exit:?}");
    }
}

#[test]
fn exit_focus_outside_focus_is_a_no_op() {
    let mut rig = Rig::new(1);
    assert_eq!(rig.send(ModeEvent::ExitFocus), None);
    rig.send(ModeEvent::EnterDispersed);
    assert_eq!(rig.send(ModeEvent::ExitFocus), None);
    assert_eq!(rig.mode(), Mode::Dispersed);
}

#[test]
fn entering_dispersed_twice_is_idempotent() {
    let mut rig = Rig::new(1);
    rig.send(ModeEvent::EnterDispersed).unwrap();
    let particle = rig.registry.get(garland_core::ParticleId(5)).unwrap().clone();
    let before = rig.machine.resolve_target(&particle, 1.25);
    let focus_before = rig.machine.state().focus_target();
    assert_eq!(rig.send(ModeEvent::EnterDispersed), None);
    assert_eq!(rig.machine.state().focus_target(), focus_before);
    assert_eq!(rig.machine.resolve_target(&particle, 1.25), before);
}

#[test]
fn assembled_targets_are_home_poses() {
    let rig = Rig::new(0);
    for p in rig.registry.iter() {
        assert_eq!(rig.machine.resolve_target(p, 3.0), Target::Assembled(p.home()));
    }
}

#[test]
fn dispersed_target_orbits_and_wobbles() {
    let mut rig = Rig::new(0);
    rig.send(ModeEvent::Toggle);
    let p = rig.registry.get(garland_core::ParticleId(0)).unwrap();
    let a = rig.machine.resolve_target(p, 0.0).position();
    let b = rig.machine.resolve_target(p, 1.0).position();
    let horizontal = |v: Vec3| (v.x * v.x + v.z * v.z).sqrt();
    assert!((horizontal(a) - horizontal(b)).abs() < 1e-3);
    assert!((a - b).length() > 1e-3);
    assert!((a.y - p.scatter().height).abs() <= 0.6 + 1e-5);
}

#[test]
fn focus_subject_uses_the_cached_anchor() {
    let mut rig = Rig::new(3);
    rig.send(ModeEvent::EnterDispersed);
    let t = rig.send(ModeEvent::EnterFocus).unwrap();
    let focus_id = t.focus.unwrap();
    let viewer = Viewer::default();
    let anchor = rig.machine.ensure_anchor(&viewer, Mat4::IDENTITY).unwrap();
    assert!((anchor - Vec3::new(0.0, 2.0, 35.0)).length() < 1e-4);

    // The anchor does not follow later viewer movement.
    let moved = Viewer {
        eye: Vec3::new(10.0, 5.0, 40.0),
        ..viewer
    };
    assert_eq!(rig.machine.ensure_anchor(&moved, Mat4::IDENTITY), Some(anchor));

    let subject = rig.registry.get(focus_id).unwrap();
    assert_eq!(rig.machine.resolve_target(subject, 0.5), Target::FocusSubject(anchor));

    let other = rig
        .registry
        .iter()
        .find(|p| p.id() != focus_id)
        .unwrap();
    assert_eq!(
        rig.machine.resolve_target(other, 0.5),
        Target::FocusBackground(dispersed_position(other, 0.5))
    );
}

#[test]
fn anchor_is_expressed_in_group_space() {
    let mut rig = Rig::new(1);
    rig.send(ModeEvent::EnterDispersed);
    rig.send(ModeEvent::EnterFocus).unwrap();
    let group = Mat4::from_scale(Vec3::splat(2.0));
    let anchor = rig.machine.ensure_anchor(&Viewer::default(), group).unwrap();
    assert!((group.transform_point3(anchor) - Vec3::new(0.0, 2.0, 35.0)).length() < 1e-4);
}

#[test]
fn releasing_a_non_target_is_ignored() {
    let mut rig = Rig::new(2);
    rig.send(ModeEvent::EnterDispersed);
    let focus = rig.send(ModeEvent::EnterFocus).unwrap().focus.unwrap();
    assert_eq!(rig.machine.release_focus(garland_core::ParticleId(0)), None);
    let t = rig.machine.release_focus(focus).unwrap();
    assert_eq!(t.to, Mode::Dispersed);
    assert_eq!(rig.machine.state().focus_target(), None);
}
