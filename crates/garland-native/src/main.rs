//! Headless soak harness: drives the choreographer through a synthetic
//! frame-cost model and logs what the governor does about it.

use clap::{Parser, ValueEnum};
use garland_core::{
    AdjustmentKind, Choreographer, DeviceHints, DeviceProfile, DeviceTier, FrameInput, MediaHandle,
    ModeEvent, SceneConfig,
};
use glam::Vec2;
use std::time::Duration;

// Mode script, one event every `MODE_STEP_FRAMES` frames
const MODE_SCRIPT: [ModeEvent; 4] = [
    ModeEvent::EnterDispersed,
    ModeEvent::EnterFocus,
    ModeEvent::ExitFocus,
    ModeEvent::EnterAssembled,
];
const MODE_STEP_FRAMES: u32 = 600;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Tier {
    Low,
    Medium,
    High,
}

impl From<Tier> for DeviceTier {
    fn from(t: Tier) -> Self {
        match t {
            Tier::Low => DeviceTier::Low,
            Tier::Medium => DeviceTier::Medium,
            Tier::High => DeviceTier::High,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "garland-soak", about = "Run the garland governor against a simulated GPU")]
struct Args {
    /// Number of frames to simulate
    #[arg(long, default_value_t = 3600)]
    frames: u32,
    /// Particle budget tier
    #[arg(long, value_enum, default_value_t = Tier::Medium)]
    tier: Tier,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Simulated cost of one particle at pixel scale 1, in microseconds
    #[arg(long, default_value_t = 3.5)]
    cost_per_particle_us: f64,
    /// Fixed per-frame cost in milliseconds
    #[arg(long, default_value_t = 4.0)]
    base_cost_ms: f64,
    /// User media items added after the first second
    #[arg(long, default_value_t = 6)]
    media: u32,
    /// Display pixel ratio used for the governor's bounds
    #[arg(long, default_value_t = 2.0)]
    pixel_ratio: f32,
}

/// Simulated frame time: fixed cost plus per-particle cost scaled by pixel area.
fn frame_cost(
    base_ms: f64,
    cost_per_particle_us: f64,
    active: usize,
    pixel_scale: f32,
) -> Duration {
    let area = (pixel_scale as f64).powi(2);
    let ms = base_ms + cost_per_particle_us * 1e-3 * active as f64 * area;
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

#[derive(Debug, Default, PartialEq)]
struct Summary {
    frames: u32,
    emergencies: u32,
    downgrades: u32,
    upgrades: u32,
    simulated: Duration,
    pixel_scale: f32,
    active_fraction: f32,
    visible: usize,
}

impl Summary {
    fn mean_fps(&self) -> f64 {
        if self.simulated.is_zero() {
            return 0.0;
        }
        self.frames as f64 / self.simulated.as_secs_f64()
    }
}

fn simulate(args: &Args) -> anyhow::Result<Summary> {
    let tier = DeviceTier::from(args.tier);
    let hints = DeviceHints {
        pixel_ratio: args.pixel_ratio,
        ..DeviceHints::default()
    };
    let profile = DeviceProfile {
        hints,
        tier,
        budget: tier.budget(),
    };
    let config = SceneConfig::for_device(&profile, args.seed);
    let mut scene = Choreographer::new(config, Duration::ZERO)?;
    log::info!(
        "[soak] tier={:?} particles={} frames={} pixel scale {:.2}",
        tier,
        scene.registry().len(),
        args.frames,
        scene.pixel_scale()
    );

    let mut summary = Summary::default();
    let mut now = Duration::ZERO;
    let mut visible = scene.registry().len();
    let media_at = Duration::from_secs(1);
    let mut media_added = false;

    for frame in 0..args.frames {
        if !media_added && now >= media_at {
            for h in 0..args.media {
                scene.add_media_particle(MediaHandle(h));
            }
            media_added = true;
        }
        if frame > 0 && frame % MODE_STEP_FRAMES == 0 {
            let step = (frame / MODE_STEP_FRAMES - 1) as usize % MODE_SCRIPT.len();
            scene.handle(MODE_SCRIPT[step]);
        }

        now += frame_cost(
            args.base_cost_ms,
            args.cost_per_particle_us,
            visible,
            scene.pixel_scale(),
        );
        // Slow sway stands in for a tracked hand.
        let t = now.as_secs_f32();
        let report = scene.update(FrameInput {
            rotation_offset: Vec2::new((t * 0.3).sin() * 0.4, (t * 0.2).sin() * 0.15),
            ..FrameInput::at(now)
        });
        visible = report.visible;

        if let Some(adj) = report.adjustment {
            match adj.kind {
                AdjustmentKind::Emergency => summary.emergencies += 1,
                AdjustmentKind::Downgrade => summary.downgrades += 1,
                AdjustmentKind::Upgrade => summary.upgrades += 1,
            }
        }
        summary.frames += 1;
    }

    summary.simulated = now;
    summary.pixel_scale = scene.pixel_scale();
    summary.active_fraction = scene.active_fraction();
    summary.visible = visible;
    Ok(summary)
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let summary = simulate(&args)?;
    log::info!(
        "[soak] {} frames in {:.1}s ({:.1} fps): {} emergency, {} downgrade, {} upgrade; \
         final pixel scale {:.2}, active fraction {:.2}, {} visible",
        summary.frames,
        summary.simulated.as_secs_f64(),
        summary.mean_fps(),
        summary.emergencies,
        summary.downgrades,
        summary.upgrades,
        summary.pixel_scale,
        summary.active_fraction,
        summary.visible
    );
    Ok(())
}
