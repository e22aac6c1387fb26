// Integration tests driving the whole choreographer frame by frame.

use garland_core::{
    Choreographer, ConfigError, FrameInput, KindMix, MediaHandle, Mode, ModeEvent, ParticleBudget,
    SceneConfig, Viewer, NO_MEDIA,
};
use glam::Vec3;
use std::time::Duration;

fn small_config() -> SceneConfig {
    SceneConfig {
        budget: ParticleBudget {
            decorations: 60,
            ambient: 40,
            placeholders: 4,
        },
        ..SceneConfig::default()
    }
}

/// Step `frames` frames at `fps`, starting at frame index `from`. Returns the next index.
fn run(ch: &mut Choreographer, from: u32, frames: u32, fps: f64) -> u32 {
    for i in from..from + frames {
        ch.update(FrameInput::at(Duration::from_secs_f64(i as f64 / fps)));
    }
    from + frames
}

#[test]
fn default_config_populates_the_medium_budget() {
    let ch = Choreographer::new(SceneConfig::default(), Duration::ZERO).unwrap();
    assert_eq!(ch.registry().len(), 800 + 12 + 1000);
    assert_eq!(ch.mode_state().mode(), Mode::Assembled);
    assert_eq!(ch.active_fraction(), 1.0);
    assert!(!ch.controls_frozen());
}

#[test]
fn invalid_kind_mix_is_rejected() {
    let config = SceneConfig {
        kind_mix: KindMix {
            cube: 0.0,
            bauble: 0.0,
            candy_cane: 0.0,
        },
        ..small_config()
    };
    assert_eq!(
        Choreographer::new(config, Duration::ZERO).err(),
        Some(ConfigError::EmptyKindMix)
    );
}

#[test]
fn assembling_converges_without_overshoot() {
    let mut ch = Choreographer::new(small_config(), Duration::ZERO).unwrap();
    let distance = |ch: &Choreographer| -> Vec<f32> {
        ch.visible()
            .map(|p| p.transform().position.distance(p.home()))
            .collect()
    };
    let mut last = distance(&ch);
    for i in 0..600 {
        run(&mut ch, i, 1, 60.0);
        let now = distance(&ch);
        for (a, b) in now.iter().zip(&last) {
            assert!(a <= &(b + 1e-4), "particle moved away from home: {a} > {b}");
        }
        last = now;
    }
    assert!(last.iter().all(|d| *d < 1e-2));
}

#[test]
fn motion_does_not_depend_on_frame_rate() {
    let mut fast = Choreographer::new(small_config(), Duration::ZERO).unwrap();
    let mut slow = Choreographer::new(small_config(), Duration::ZERO).unwrap();
    run(&mut fast, 0, 61, 60.0);
    run(&mut slow, 0, 31, 30.0);
    for (a, b) in fast.visible().zip(slow.visible()) {
        let d = a.transform().position.distance(b.transform().position);
        assert!(d < 1e-2, "{:?} diverged by {d}", a.id());
    }
}

#[test]
fn instances_mirror_visible_particles() {
    let mut ch = Choreographer::new(small_config(), Duration::ZERO).unwrap();
    let media = ch.add_media_particle(MediaHandle(7));
    let report = ch.update(FrameInput::at(Duration::from_millis(16)));
    assert_eq!(report.visible, ch.visible().count());
    assert_eq!(ch.instances().len(), report.visible);
    let packed: Vec<_> = ch.instances().iter().filter(|i| i.media != NO_MEDIA).collect();
    assert_eq!(packed.len(), 1);
    assert_eq!(packed[0].media, 7);
    assert!(ch.visible().any(|p| p.id() == media));
}

#[test]
fn slow_frames_shed_procedural_particles_but_keep_media() {
    let mut ch = Choreographer::new(small_config(), Duration::ZERO).unwrap();
    let media = ch.add_media_particle(MediaHandle(1));
    let non_media = ch.registry().non_media_count();

    let mut adjustments = Vec::new();
    for i in 1..=200u64 {
        let report = ch.update(FrameInput::at(Duration::from_millis(25 * i)));
        adjustments.extend(report.adjustment);
    }
    assert_eq!(adjustments.len(), 1);
    assert!((ch.active_fraction() - 0.85).abs() < 1e-6);
    assert_eq!(ch.registry().active_non_media(), non_media * 85 / 100);
    assert!(ch.visible().any(|p| p.id() == media));
    assert_eq!(ch.pixel_scale(), ch.governor().config().pixel_scale_floor);
}

#[test]
fn focus_brings_the_subject_in_front_of_the_viewer() {
    let mut ch = Choreographer::new(small_config(), Duration::ZERO).unwrap();
    let media = ch.add_media_particle(MediaHandle(3));
    let next = run(&mut ch, 0, 120, 60.0);
    ch.handle(ModeEvent::EnterDispersed).unwrap();
    let next = run(&mut ch, next, 60, 60.0);
    let t = ch.handle(ModeEvent::EnterFocus).unwrap();
    assert_eq!(t.focus, Some(media));
    assert!(ch.controls_frozen());

    run(&mut ch, next, 600, 60.0);
    let subject = ch.registry().get(media).unwrap();
    let world = ch.group_transform().transform_point3(subject.transform().position);
    let expected = Viewer::default().point_ahead(15.0);
    assert!(world.distance(expected) < 1e-2, "{world} vs {expected}");
    assert!((subject.transform().scale - 4.5).abs() < 1e-2);
    assert!(subject.transform().rotation.length() < 1e-2);

    let anchor = ch.mode_state().focus().and_then(|f| f.anchor).unwrap();
    assert!(anchor.distance(subject.transform().position) < 1e-2);
}

#[test]
fn background_keeps_orbiting_during_focus() {
    let mut ch = Choreographer::new(small_config(), Duration::ZERO).unwrap();
    ch.add_media_particle(MediaHandle(3));
    ch.handle(ModeEvent::EnterDispersed);
    let next = run(&mut ch, 0, 60, 60.0);
    ch.handle(ModeEvent::EnterFocus).unwrap();
    let before: Vec<Vec3> = ch.visible().map(|p| p.transform().position).collect();
    run(&mut ch, next, 60, 60.0);
    let moved = ch
        .visible()
        .zip(&before)
        .filter(|(p, b)| p.transform().position.distance(**b) > 0.1)
        .count();
    assert!(moved > before.len() / 2);
}

#[test]
fn evicting_the_focus_target_returns_to_dispersed() {
    let mut ch = Choreographer::new(small_config(), Duration::ZERO).unwrap();
    let media = ch.add_media_particle(MediaHandle(9));
    ch.handle(ModeEvent::EnterDispersed);
    ch.handle(ModeEvent::EnterFocus).unwrap();
    assert_eq!(ch.mode_state().focus_target(), Some(media));

    assert!(ch.evict_media(MediaHandle(9)));
    assert_eq!(ch.mode_state().mode(), Mode::Dispersed);
    assert!(!ch.controls_frozen());
    ch.update(FrameInput::at(Duration::from_millis(16)));
    assert!(ch.visible().all(|p| p.id() != media));
    assert!(ch.instances().iter().all(|i| i.media == NO_MEDIA));

    // Nothing left to focus on.
    assert_eq!(ch.handle(ModeEvent::EnterFocus), None);
    assert!(!ch.evict_media(MediaHandle(9)));
}

#[test]
fn media_added_mid_focus_joins_the_next_cycle() {
    let mut ch = Choreographer::new(small_config(), Duration::ZERO).unwrap();
    let first = ch.add_media_particle(MediaHandle(0));
    ch.handle(ModeEvent::EnterDispersed);
    assert_eq!(ch.handle(ModeEvent::EnterFocus).unwrap().focus, Some(first));
    let second = ch.add_media_particle(MediaHandle(1));
    ch.handle(ModeEvent::ExitFocus).unwrap();
    assert_eq!(ch.handle(ModeEvent::EnterFocus).unwrap().focus, Some(second));
}
