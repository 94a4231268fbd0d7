//! Headless walk through the prompt grid
//!
//! Usage: `vista-walk [config.toml]`
//!
//! Walks a fixed route with the procedural producer and logs every panorama
//! change. Set `RUST_LOG=debug` for per-frame detail.

use anyhow::Context;
use glam::Vec2;
use vista_stream::{
    ContentCache, ControlLoop, GenerationCoordinator, LogRenderer, MoveKeys, ProceduralProducer,
    ScriptedInput, ThreadSpawner, WalkConfig,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => WalkConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => WalkConfig::default(),
    };
    log::info!(
        "Walking a {}x{} grid from ({}, {})",
        config.grid.width(),
        config.grid.height(),
        config.start.x,
        config.start.y
    );

    let forward = MoveKeys {
        forward: true,
        ..MoveKeys::default()
    };
    let right = MoveKeys {
        right: true,
        ..MoveKeys::default()
    };
    let route = ScriptedInput::default()
        .idle(30)
        .hold(forward, 20)
        .idle(30)
        .turn(Vec2::new(900.0, -150.0))
        .hold(right, 20)
        .idle(30);

    let coordinator = GenerationCoordinator::new(
        ContentCache::new(),
        ProceduralProducer::new(),
        ThreadSpawner::new(),
    )
    .with_image_size(config.image_width, config.image_height);

    let mut walk = ControlLoop::new(config, coordinator, route, LogRenderer::new());
    let frames = walk.run();

    let cache = walk.coordinator().cache();
    println!(
        "{frames} frames, {} panoramas cached ({} KiB)",
        cache.len(),
        cache.memory_usage() / 1024
    );
    Ok(())
}
