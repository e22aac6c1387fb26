// Integration tests for procedural placement.

use garland_core::placement::{home_bounds, home_pose, particle_rng, place, scatter_pose};
use garland_core::{Ornament, ParticleKind};

const KINDS: [ParticleKind; 5] = [
    ParticleKind::Decoration(Ornament::Cube),
    ParticleKind::Decoration(Ornament::Bauble),
    ParticleKind::Decoration(Ornament::CandyCane),
    ParticleKind::Media,
    ParticleKind::Ambient,
];

#[test]
fn home_pose_is_deterministic_for_a_seed() {
    for kind in KINDS {
        for index in [0, 1, 17, 99] {
            let a = home_pose(index, kind, 100, &mut particle_rng(42, index));
            let b = home_pose(index, kind, 100, &mut particle_rng(42, index));
            assert_eq!(a, b, "{kind:?} at {index}");
        }
    }
}

#[test]
fn different_seeds_give_different_jitter() {
    let kind = ParticleKind::Decoration(Ornament::Cube);
    let a = home_pose(10, kind, 100, &mut particle_rng(1, 10));
    let b = home_pose(10, kind, 100, &mut particle_rng(2, 10));
    assert_ne!(a, b);
}

#[test]
fn home_pose_stays_within_bounds_for_every_kind() {
    for kind in KINDS {
        let bounds = home_bounds(kind);
        for total in [1usize, 7, 100, 1500] {
            for index in 0..total {
                let p = home_pose(index, kind, total, &mut particle_rng(9, index));
                assert!(bounds.contains(p), "{kind:?} {index}/{total} -> {p:?} outside {bounds:?}");
            }
        }
    }
}

#[test]
fn cone_widens_toward_the_base() {
    // Ambient placement has no jitter, which makes the shape exact.
    let top = home_pose(10, ParticleKind::Ambient, 1000, &mut particle_rng(0, 10));
    let bottom = home_pose(990, ParticleKind::Ambient, 1000, &mut particle_rng(0, 990));
    let radius = |p: glam::Vec3| (p.x * p.x + p.z * p.z).sqrt();
    assert!(top.y > bottom.y);
    assert!(radius(top) < radius(bottom));
}

#[test]
fn density_is_biased_toward_the_base() {
    let total = 1000;
    let below_middle = (0..total)
        .map(|i| home_pose(i, ParticleKind::Ambient, total, &mut particle_rng(3, i)))
        .filter(|p| p.y < 0.0)
        .count();
    assert!(below_middle > total / 2, "only {below_middle} below the middle");
}

#[test]
fn scatter_prefers_the_outer_shell() {
    let mut rng = particle_rng(5, 0);
    let kind = ParticleKind::Decoration(Ornament::Bauble);
    let n = 2000;
    let outer = (0..n)
        .map(|_| scatter_pose(kind, &mut rng))
        .filter(|s| s.radius > 22.0)
        .count();
    assert!(outer > n / 2, "outer half holds {outer} of {n}");
}

#[test]
fn ambient_scatter_surrounds_the_main_shell() {
    let mut rng = particle_rng(6, 0);
    for _ in 0..500 {
        let s = scatter_pose(ParticleKind::Ambient, &mut rng);
        assert!(s.radius >= 18.0 && s.radius <= 36.0);
        assert!(s.height >= -6.0 && s.height <= 12.0);
    }
}

#[test]
fn full_placement_is_reproducible() {
    let kind = ParticleKind::Media;
    let a = place(3, kind, 12, &mut particle_rng(77, 3));
    let b = place(3, kind, 12, &mut particle_rng(77, 3));
    assert_eq!(a, b);
    assert!(a.phase >= 0.0 && a.phase < std::f32::consts::TAU);
    assert!(a.spin.abs().max_element() <= 0.025 + 1e-6);
}
