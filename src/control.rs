//! Per-frame control loop
//!
//! Each frame runs, in this order: sample input, move and turn the viewpoint,
//! maybe start a production, drain finished productions into the cache,
//! settle the player's production flag, then draw the best available
//! panorama. Nothing in a frame waits on a production.

use glam::Vec2;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::artifact::ContentArtifact;
use crate::config::WalkConfig;
use crate::coordinator::GenerationCoordinator;
use crate::grid::PromptGrid;
use crate::producer::ContentProducer;
use crate::prompt::{SpatialPromptBlender, Tokenizer, WordTokenizer};
use crate::runtime::AsyncSpawner;
use crate::spatial::{CacheKey, Orientation};
use crate::view::{RegenerateOutcome, ViewState};

/// Four-direction movement keys held this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveKeys {
    /// Unrotated movement direction, `speed` units per held key
    ///
    /// Forward is −y, right is +x.
    pub fn direction(&self, speed: f32) -> Vec2 {
        let mut direction = Vec2::ZERO;
        if self.forward {
            direction.y -= speed;
        }
        if self.back {
            direction.y += speed;
        }
        if self.left {
            direction.x -= speed;
        }
        if self.right {
            direction.x += speed;
        }
        direction
    }
}

/// One frame of sampled input
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    pub movement: MoveKeys,
    /// Raw look input; scaled by the configured sensitivity
    pub look: Vec2,
    pub quit: bool,
}

/// Non-blocking input sampling
pub trait InputSource {
    fn sample(&mut self) -> anyhow::Result<FrameInput>;
}

/// Draws the panorama around the viewer
pub trait Renderer {
    fn draw(
        &mut self,
        artifact: Option<&ContentArtifact>,
        orientation: Orientation,
    ) -> anyhow::Result<()>;
}

/// What happened during one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub position: Vec2,
    pub orientation: Orientation,
    pub regenerate: RegenerateOutcome,
    /// Keys whose productions landed in the cache this frame
    pub completed: Vec<CacheKey>,
    /// Key of the panorama handed to the renderer
    pub shown: Option<CacheKey>,
    pub quit: bool,
}

/// Drives one player through the world
pub struct ControlLoop<P, S, I, R, T = WordTokenizer>
where
    P: ContentProducer + 'static,
    S: AsyncSpawner,
    I: InputSource,
    R: Renderer,
    T: Tokenizer,
{
    config: WalkConfig,
    grid: PromptGrid,
    blender: SpatialPromptBlender<T>,
    coordinator: GenerationCoordinator<P, S>,
    view: ViewState,
    input: I,
    renderer: R,
    frame: u64,
}

impl<P, S, I, R> ControlLoop<P, S, I, R, WordTokenizer>
where
    P: ContentProducer + 'static,
    S: AsyncSpawner,
    I: InputSource,
    R: Renderer,
{
    /// Loop using the default tokenizer
    pub fn new(
        config: WalkConfig,
        coordinator: GenerationCoordinator<P, S>,
        input: I,
        renderer: R,
    ) -> Self {
        Self::with_tokenizer(config, coordinator, input, renderer, WordTokenizer::new())
    }
}

impl<P, S, I, R, T> ControlLoop<P, S, I, R, T>
where
    P: ContentProducer + 'static,
    S: AsyncSpawner,
    I: InputSource,
    R: Renderer,
    T: Tokenizer,
{
    pub fn with_tokenizer(
        config: WalkConfig,
        coordinator: GenerationCoordinator<P, S>,
        input: I,
        renderer: R,
        tokenizer: T,
    ) -> Self {
        let grid = config.grid.clone();
        let view = ViewState::new(config.start, &grid)
            .with_key_resolution(config.key_resolution)
            .with_regenerate_distance(config.regenerate_distance);
        let blender = SpatialPromptBlender::new(tokenizer).with_separator(config.separator.clone());

        Self {
            config,
            grid,
            blender,
            coordinator,
            view,
            input,
            renderer,
            frame: 0,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn coordinator(&self) -> &GenerationCoordinator<P, S> {
        &self.coordinator
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run a single frame
    pub fn tick(&mut self) -> FrameReport {
        self.frame += 1;

        let input = match self.input.sample() {
            Ok(input) => input,
            Err(err) => {
                log::warn!("Input sampling failed: {err:#}");
                FrameInput::default()
            }
        };

        let direction = input.movement.direction(self.config.move_speed);
        if direction != Vec2::ZERO {
            let delta = self.view.orientation().rotate_movement(direction);
            self.view.move_by(delta);
        }
        self.view.look(input.look * self.config.look_sensitivity);

        let regenerate = match self.view.maybe_regenerate(
            &self.grid,
            &self.blender,
            self.config.max_prompt_tokens,
            &self.coordinator,
        ) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("Could not build content request: {err}");
                RegenerateOutcome::BelowThreshold
            }
        };

        let completed = self.coordinator.drain_into_cache();
        if let Some(key) = self.view.settle(self.coordinator.cache()) {
            log::debug!("Production for {key} resolved on frame {}", self.frame);
        }

        let shown = self
            .view
            .refresh_view(self.coordinator.cache(), &completed)
            .map(Arc::clone);
        if let Err(err) = self
            .renderer
            .draw(shown.as_deref(), self.view.orientation())
        {
            log::warn!("Renderer failed on frame {}: {err:#}", self.frame);
        }

        FrameReport {
            position: self.view.position(),
            orientation: self.view.orientation(),
            regenerate,
            completed,
            shown: shown.map(|artifact| artifact.key),
            quit: input.quit,
        }
    }

    /// Run frames at the configured rate until the input asks to quit
    ///
    /// Returns the number of frames run.
    pub fn run(&mut self) -> u64 {
        let frame_time = Duration::from_secs_f64(1.0 / f64::from(self.config.target_fps.max(1)));
        let start_frame = self.frame;

        loop {
            let started = Instant::now();
            if self.tick().quit {
                break;
            }
            if let Some(remaining) = frame_time.checked_sub(started.elapsed()) {
                std::thread::sleep(remaining);
            }
        }

        let metrics = self.coordinator.cache().metrics();
        log::info!(
            "Walk ended after {} frames: {} cached, {} produced, {} failed, hit rate {:.1}%",
            self.frame - start_frame,
            self.coordinator.cache().len(),
            metrics.productions_completed(),
            metrics.productions_failed(),
            metrics.cache_hit_rate()
        );
        self.frame - start_frame
    }
}

/// Replays a fixed list of inputs, then asks to quit
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<FrameInput>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = FrameInput>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Hold `keys` for `frames` frames
    pub fn hold(mut self, keys: MoveKeys, frames: usize) -> Self {
        let input = FrameInput {
            movement: keys,
            ..FrameInput::default()
        };
        self.frames.extend(std::iter::repeat(input).take(frames));
        self
    }

    /// Stand still for `frames` frames
    pub fn idle(self, frames: usize) -> Self {
        self.hold(MoveKeys::default(), frames)
    }

    /// Turn by `look` once
    pub fn turn(mut self, look: Vec2) -> Self {
        self.frames.push_back(FrameInput {
            look,
            ..FrameInput::default()
        });
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self) -> anyhow::Result<FrameInput> {
        Ok(self.frames.pop_front().unwrap_or(FrameInput {
            quit: true,
            ..FrameInput::default()
        }))
    }
}

/// Renderer that only logs what it would draw
#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: u64,
    last_shown: Option<CacheKey>,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    pub fn last_shown(&self) -> Option<CacheKey> {
        self.last_shown
    }
}

impl Renderer for LogRenderer {
    fn draw(
        &mut self,
        artifact: Option<&ContentArtifact>,
        orientation: Orientation,
    ) -> anyhow::Result<()> {
        self.frames += 1;
        let key = artifact.map(|a| a.key);
        if key != self.last_shown {
            match artifact {
                Some(a) => log::info!(
                    "Showing panorama {} ({}x{}) at yaw {:.1}, pitch {:.1}",
                    a.key,
                    a.width,
                    a.height,
                    orientation.yaw,
                    orientation.pitch
                ),
                None => log::info!("No panorama available yet"),
            }
            self.last_shown = key;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ContentCache;
    use crate::producer::ProceduralProducer;
    use crate::runtime::MockSpawner;

    type TestLoop = ControlLoop<ProceduralProducer, MockSpawner, ScriptedInput, LogRenderer>;

    fn control_loop(spawner: MockSpawner, input: ScriptedInput) -> TestLoop {
        let config = WalkConfig::default();
        let coordinator =
            GenerationCoordinator::new(ContentCache::new(), ProceduralProducer::new(), spawner)
                .with_image_size(4, 4);
        ControlLoop::new(config, coordinator, input, LogRenderer::new())
    }

    #[test]
    fn test_move_keys_direction() {
        let keys = MoveKeys {
            forward: true,
            right: true,
            ..MoveKeys::default()
        };
        assert_eq!(keys.direction(0.05), Vec2::new(0.05, -0.05));
        assert_eq!(MoveKeys::default().direction(0.05), Vec2::ZERO);
    }

    #[test]
    fn test_first_frame_requests_and_shows() {
        let mut control = control_loop(MockSpawner::blocking(), ScriptedInput::default().idle(1));

        let report = control.tick();
        assert_eq!(
            report.regenerate,
            RegenerateOutcome::Requested(CacheKey::new(25, 25))
        );
        // Blocking spawner finishes inside the frame, so it lands immediately
        assert_eq!(report.completed, vec![CacheKey::new(25, 25)]);
        assert_eq!(report.shown, Some(CacheKey::new(25, 25)));
        assert!(!control.view().is_producing());
    }

    #[test]
    fn test_frames_never_wait_on_production() {
        let spawner = MockSpawner::deferred();
        let mut control = control_loop(
            spawner.clone(),
            ScriptedInput::default().hold(
                MoveKeys {
                    right: true,
                    ..MoveKeys::default()
                },
                10,
            ),
        );

        for _ in 0..10 {
            let report = control.tick();
            assert_eq!(report.shown, None);
        }
        assert!(control.view().is_producing());
        assert_eq!(spawner.pending(), 1);

        spawner.run_pending();
        let report = control.tick();
        assert_eq!(report.completed, vec![CacheKey::new(25, 25)]);
        // Viewer moved on; the stale panorama is still the best available
        assert_eq!(report.shown, Some(CacheKey::new(25, 25)));
    }

    #[test]
    fn test_run_stops_on_quit() {
        let mut control = control_loop(MockSpawner::blocking(), ScriptedInput::default().idle(3));
        // Three idle frames plus the frame that reports quit
        assert_eq!(control.run(), 4);
        assert_eq!(control.renderer().frames_drawn(), 4);
    }

    #[test]
    fn test_look_scaled_by_sensitivity() {
        let mut control = control_loop(
            MockSpawner::new(),
            ScriptedInput::default().turn(Vec2::new(100.0, 2000.0)),
        );
        let report = control.tick();
        assert!((report.orientation.yaw - 10.0).abs() < 1e-4);
        assert_eq!(report.orientation.pitch, 90.0);
    }
}
