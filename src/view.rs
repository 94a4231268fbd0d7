//! Player viewpoint and the regenerate-or-not policy

use glam::Vec2;
use std::sync::Arc;

use crate::artifact::ContentArtifact;
use crate::cache::ContentCache;
use crate::coordinator::GenerationCoordinator;
use crate::grid::{GridError, PromptGrid};
use crate::producer::ContentProducer;
use crate::prompt::{SpatialPromptBlender, Tokenizer};
use crate::runtime::AsyncSpawner;
use crate::spatial::{CacheKey, GridBounds, Orientation, DEFAULT_KEY_RESOLUTION};

/// Default distance the viewpoint must travel before a new request
pub const DEFAULT_REGENERATE_DISTANCE: f32 = 0.1;

/// What [`ViewState::maybe_regenerate`] decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenerateOutcome {
    /// A production for this player is still running
    Busy,
    /// The viewpoint has not moved far enough since the last request
    BelowThreshold,
    /// The key was already cached and is now the current view
    CacheHit(CacheKey),
    /// A production for the key was already running elsewhere; waiting on it
    Joined(CacheKey),
    /// A new production was started
    Requested(CacheKey),
}

/// Continuous position and orientation of one player
///
/// At most one production is outstanding per player: while `producing` is
/// set, further requests are suppressed regardless of key.
#[derive(Debug, Clone)]
pub struct ViewState {
    position: Vec2,
    orientation: Orientation,
    bounds: GridBounds,
    key_resolution: u32,
    regenerate_distance: f32,
    producing: bool,
    pending_key: Option<CacheKey>,
    last_requested_position: Option<Vec2>,
    current: Option<Arc<ContentArtifact>>,
}

impl ViewState {
    /// Player at `start`, clamped into the grid
    pub fn new(start: Vec2, grid: &PromptGrid) -> Self {
        let bounds = grid.bounds();
        Self {
            position: bounds.clamp(start),
            orientation: Orientation::default(),
            bounds,
            key_resolution: DEFAULT_KEY_RESOLUTION,
            regenerate_distance: DEFAULT_REGENERATE_DISTANCE,
            producing: false,
            pending_key: None,
            last_requested_position: None,
            current: None,
        }
    }

    pub fn with_key_resolution(mut self, resolution: u32) -> Self {
        self.key_resolution = resolution.max(1);
        self
    }

    pub fn with_regenerate_distance(mut self, distance: f32) -> Self {
        self.regenerate_distance = distance.max(0.0);
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_producing(&self) -> bool {
        self.producing
    }

    pub fn pending_key(&self) -> Option<CacheKey> {
        self.pending_key
    }

    pub fn last_requested_position(&self) -> Option<Vec2> {
        self.last_requested_position
    }

    /// Artifact currently shown, if any has arrived yet
    pub fn current_artifact(&self) -> Option<&Arc<ContentArtifact>> {
        self.current.as_ref()
    }

    /// Key for the current position
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::quantize(self.position, self.key_resolution)
    }

    /// Translate by `delta`, staying inside the grid
    pub fn move_by(&mut self, delta: Vec2) {
        self.position = self.bounds.clamp(self.position + delta);
    }

    /// Turn by `delta` degrees (`x` = yaw, `y` = pitch)
    pub fn look(&mut self, delta: Vec2) {
        self.orientation.rotate(delta);
    }

    /// Start a production for the current position if warranted
    ///
    /// Nothing happens while a production is outstanding or when the
    /// viewpoint is within the regenerate distance of the last request.
    pub fn maybe_regenerate<T, P, S>(
        &mut self,
        grid: &PromptGrid,
        blender: &SpatialPromptBlender<T>,
        max_tokens: u32,
        coordinator: &GenerationCoordinator<P, S>,
    ) -> Result<RegenerateOutcome, GridError>
    where
        T: Tokenizer,
        P: ContentProducer + 'static,
        S: AsyncSpawner,
    {
        if self.producing {
            return Ok(RegenerateOutcome::Busy);
        }
        if let Some(last) = self.last_requested_position {
            if self.position.distance(last) <= self.regenerate_distance {
                return Ok(RegenerateOutcome::BelowThreshold);
            }
        }

        let key = self.cache_key();
        let cache = coordinator.cache();

        if let Some(artifact) = cache.lookup(key) {
            self.last_requested_position = Some(self.position);
            self.current = Some(artifact);
            return Ok(RegenerateOutcome::CacheHit(key));
        }

        let outcome = if cache.is_in_flight(key) {
            RegenerateOutcome::Joined(key)
        } else {
            let request = blender.blend(self.position, grid, max_tokens)?;
            if coordinator.request(key, request) {
                RegenerateOutcome::Requested(key)
            } else {
                RegenerateOutcome::Joined(key)
            }
        };

        self.last_requested_position = Some(self.position);
        self.producing = true;
        self.pending_key = Some(key);
        Ok(outcome)
    }

    /// Clear `producing` once the pending key has resolved
    ///
    /// Completion and failure both remove the key from the in-flight set,
    /// so either one ends the wait. Returns the resolved key.
    pub fn settle(&mut self, cache: &ContentCache) -> Option<CacheKey> {
        let key = self.pending_key?;
        if cache.is_in_flight(key) {
            return None;
        }
        self.producing = false;
        self.pending_key = None;
        Some(key)
    }

    /// Pick the artifact to show this frame
    ///
    /// Prefers the artifact for the current key; otherwise the most recently
    /// completed one; otherwise whatever was shown before.
    pub fn refresh_view(
        &mut self,
        cache: &ContentCache,
        completed: &[CacheKey],
    ) -> Option<&Arc<ContentArtifact>> {
        if let Some(artifact) = cache.lookup(self.cache_key()) {
            self.current = Some(artifact);
        } else if let Some(artifact) = completed.last().and_then(|&key| cache.lookup(key)) {
            self.current = Some(artifact);
        }
        self.current.as_ref()
    }
}
