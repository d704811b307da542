use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::{
    assets::image::Image,
    assets::loader::AssetLoader,
    config::ThemeConfig,
    foundation::rng::Rng64,
    show::paths::PathCollection,
};

/// Range of the random frame picked when a theme with no stills falls back to its animation.
const FALLBACK_FRAME_RANGE: usize = 2 << 16;

/// Outcome of one maintenance step on a [`Theme`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStep {
    /// Nothing to do.
    Idle,
    /// An animation was decoded and installed.
    LoadedAnimation,
    /// The animation was dropped.
    UnloadedAnimation,
    /// One more still was decoded.
    LoadedImage,
    /// One still was evicted.
    UnloadedImage,
    /// The loaded animation was replaced by a different one.
    SwappedAnimation,
    /// One still was replaced by a different one.
    SwappedImage,
    /// A decode returned nothing; the candidate stays available for a retry.
    Failed,
}

/// Map a monotonically increasing frame counter onto a ping-pong index in `[0, len)`.
///
/// The sequence runs `0, 1, .., len-1, len-2, .., 1` and repeats, so looped playback has no seam.
/// `len == 0` and `len == 1` both map to 0.
pub fn ping_pong_index(frame: usize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let period = 2 * len - 2;
    let f = frame % period;
    if f < len { f } else { period - f }
}

struct Stills {
    paths: PathCollection<PathBuf>,
    // Invariant: an index is a key here iff its path is disabled.
    images: HashMap<usize, Image>,
}

struct Animation {
    paths: PathCollection<PathBuf>,
    current: Option<usize>,
    frames: Vec<Image>,
}

/// One theme's asset cache.
///
/// Reads (`get_*`) are safe from any thread at any time. Maintenance (`perform_*`,
/// `set_target_load`) must come from a single context. The stills and animation locks are never
/// held together and never across a decode.
pub struct Theme {
    name: String,
    stills: Mutex<Stills>,
    animation: Mutex<Animation>,
    fonts: PathCollection<PathBuf>,
    text_lines: PathCollection<String>,
    image_path_count: usize,
    animation_path_count: usize,
    target_load: AtomicUsize,
    loader: Arc<dyn AssetLoader>,
    rng: Rng64,
}

impl std::fmt::Debug for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Theme")
            .field("name", &self.name)
            .field("target_load", &self.target_load())
            .field("loaded", &self.loaded())
            .field("animation_len", &self.animation_len())
            .finish()
    }
}

impl Theme {
    /// Build an empty (nothing loaded, target 0) theme from its configuration.
    pub fn new(
        name: impl Into<String>,
        config: &ThemeConfig,
        loader: Arc<dyn AssetLoader>,
        rng: Rng64,
    ) -> Self {
        Self {
            name: name.into(),
            stills: Mutex::new(Stills {
                paths: PathCollection::new(config.image_path.clone(), &rng),
                images: HashMap::new(),
            }),
            animation: Mutex::new(Animation {
                paths: PathCollection::new(config.animation_path.clone(), &rng),
                current: None,
                frames: Vec::new(),
            }),
            fonts: PathCollection::new(config.font_path.clone(), &rng),
            text_lines: PathCollection::new(config.text_line.clone(), &rng),
            image_path_count: config.image_path.len(),
            animation_path_count: config.animation_path.len(),
            target_load: AtomicUsize::new(0),
            loader,
            rng,
        }
    }

    /// Theme name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of configured still paths.
    pub fn image_path_count(&self) -> usize {
        self.image_path_count
    }

    /// Number of configured animation paths.
    pub fn animation_path_count(&self) -> usize {
        self.animation_path_count
    }

    /// Next still to display, falling back to a random animation frame, then to an empty image.
    pub fn get_image(&self) -> Image {
        let mut stills = self.stills.lock();
        if stills.images.is_empty() {
            drop(stills);
            return self.get_animation(self.rng.random(FALLBACK_FRAME_RANGE));
        }
        let index = stills.paths.next_index(false);
        match stills.images.get(&index) {
            Some(image) => {
                image.ensure_texture_uploaded();
                image.clone()
            }
            None => Image::default(),
        }
    }

    /// Animation frame for `frame`, in ping-pong order. Empty when no animation is loaded.
    pub fn get_animation(&self, frame: usize) -> Image {
        let animation = self.animation.lock();
        if animation.frames.is_empty() {
            return Image::default();
        }
        let image = &animation.frames[ping_pong_index(frame, animation.frames.len())];
        image.ensure_texture_uploaded();
        image.clone()
    }

    /// Next text line in round-robin order.
    pub fn get_text(&self) -> Option<&str> {
        self.text_lines.next().map(String::as_str)
    }

    /// Next font path in round-robin order.
    pub fn get_font(&self) -> Option<&Path> {
        self.fonts.next().map(PathBuf::as_path)
    }

    /// Desired number of cached stills.
    pub fn target_load(&self) -> usize {
        self.target_load.load(Ordering::Relaxed)
    }

    /// Change the desired number of cached stills; applied by later `perform_load` calls.
    pub fn set_target_load(&self, target_load: usize) {
        self.target_load.store(target_load, Ordering::Relaxed);
    }

    /// Number of cached stills.
    pub fn loaded(&self) -> usize {
        self.stills.lock().images.len()
    }

    /// `true` when an animation is resident.
    pub fn animation_loaded(&self) -> bool {
        !self.animation.lock().frames.is_empty()
    }

    /// Frame count of the resident animation, 0 when none.
    pub fn animation_len(&self) -> usize {
        self.animation.lock().frames.len()
    }

    /// `true` when the stills count matches the target (or no candidates remain) and the
    /// animation state matches whether the target is non-zero.
    pub fn all_loaded(&self) -> bool {
        let target = self.target_load();
        let stills_done = {
            let stills = self.stills.lock();
            stills.images.len() == target || stills.paths.enabled_count() == 0
        };
        stills_done
            && (self.animation_path_count == 0 || self.animation_loaded() == (target > 0))
    }

    /// Do at most one unit of load or unload work toward the target.
    ///
    /// A failed animation decode does not block stills: the same call moves on to the stills
    /// step and reports `Failed` only when that step has nothing to do either.
    pub fn perform_load(&self) -> LoadStep {
        let target = self.target_load();
        let mut animation_failed = false;
        if self.animation_path_count > 0 {
            let resident = self.animation_loaded();
            if target > 0 && !resident {
                match self.load_animation_internal(LoadStep::LoadedAnimation) {
                    LoadStep::Failed => animation_failed = true,
                    step => return step,
                }
            }
            if target == 0 && resident {
                return self.unload_animation_internal();
            }
        }

        let (count, candidates) = {
            let stills = self.stills.lock();
            (stills.images.len(), stills.paths.enabled_count())
        };
        if count < target && candidates > 0 {
            return self.load_image_internal();
        }
        if count > target {
            return self.unload_image_internal();
        }
        if animation_failed {
            LoadStep::Failed
        } else {
            LoadStep::Idle
        }
    }

    /// Refresh variety once at target: occasionally replace the animation, otherwise replace one
    /// still. The stills count is unchanged.
    pub fn perform_swap(&self) -> LoadStep {
        if self.animation_path_count > 2 && self.animation_loaded() && self.rng.random_chance(4) {
            return self.load_animation_internal(LoadStep::SwappedAnimation);
        }

        let (victim, candidate, path) = {
            let mut stills = self.stills.lock();
            if stills.images.len() <= 2 || stills.paths.enabled_count() == 0 {
                return LoadStep::Idle;
            }
            let victim = stills.paths.next_index(false);
            let candidate = stills.paths.next_index(true);
            let path = stills.paths.get(candidate).clone();
            (victim, candidate, path)
        };

        let image = self.loader.load_image(&path);
        if image.is_empty() {
            tracing::debug!(theme = %self.name, path = %path.display(), "swap load failed");
            return LoadStep::Failed;
        }

        let evicted = {
            let mut stills = self.stills.lock();
            let evicted = stills.images.remove(&victim);
            stills.paths.set_enabled(victim, true);
            stills.paths.set_enabled(candidate, false);
            stills.images.insert(candidate, image);
            evicted
        };
        drop(evicted);
        tracing::trace!(theme = %self.name, path = %path.display(), "swapped still");
        LoadStep::SwappedImage
    }

    /// Run `perform_load` until `all_loaded`. Blocking; meant for bootstrap only.
    ///
    /// Gives up after a bounded run of consecutive failed decodes and returns whether the theme
    /// reached `all_loaded`.
    #[tracing::instrument(skip(self), fields(theme = %self.name, target = self.target_load()))]
    pub fn perform_all_loads(&self) -> bool {
        let failure_limit = 4 * (self.image_path_count + self.animation_path_count) + 4;
        let mut failures = 0usize;
        while !self.all_loaded() {
            match self.perform_load() {
                LoadStep::Failed => {
                    failures += 1;
                    if failures >= failure_limit {
                        tracing::warn!(
                            theme = %self.name,
                            failures,
                            loaded = self.loaded(),
                            "giving up on bootstrap load"
                        );
                        return false;
                    }
                }
                LoadStep::Idle => break,
                _ => failures = 0,
            }
        }
        self.all_loaded()
    }

    fn load_image_internal(&self) -> LoadStep {
        let (index, path) = {
            let mut stills = self.stills.lock();
            let index = stills.paths.next_index(true);
            (index, stills.paths.get(index).clone())
        };

        let image = self.loader.load_image(&path);
        if image.is_empty() {
            tracing::debug!(theme = %self.name, path = %path.display(), "still load failed");
            return LoadStep::Failed;
        }

        let mut stills = self.stills.lock();
        stills.paths.set_enabled(index, false);
        stills.images.insert(index, image);
        tracing::trace!(theme = %self.name, path = %path.display(), loaded = stills.images.len(), "loaded still");
        LoadStep::LoadedImage
    }

    fn unload_image_internal(&self) -> LoadStep {
        let evicted = {
            let mut stills = self.stills.lock();
            if stills.images.is_empty() {
                return LoadStep::Idle;
            }
            let index = stills.paths.next_index(false);
            stills.paths.set_enabled(index, true);
            stills.images.remove(&index)
        };
        drop(evicted);
        tracing::trace!(theme = %self.name, "unloaded still");
        LoadStep::UnloadedImage
    }

    fn load_animation_internal(&self, success: LoadStep) -> LoadStep {
        let (index, path) = {
            let mut animation = self.animation.lock();
            if animation.paths.enabled_count() == 0 {
                return LoadStep::Idle;
            }
            let index = animation.paths.next_index(true);
            (index, animation.paths.get(index).clone())
        };

        let frames = self.loader.load_animation(&path);
        if frames.is_empty() {
            tracing::debug!(theme = %self.name, path = %path.display(), "animation load failed");
            return LoadStep::Failed;
        }
        let frame_count = frames.len();

        let previous = {
            let mut animation = self.animation.lock();
            if let Some(old) = animation.current.replace(index) {
                animation.paths.set_enabled(old, true);
            }
            animation.paths.set_enabled(index, false);
            std::mem::replace(&mut animation.frames, frames)
        };
        drop(previous);
        tracing::debug!(theme = %self.name, path = %path.display(), frames = frame_count, "loaded animation");
        success
    }

    fn unload_animation_internal(&self) -> LoadStep {
        let previous = {
            let mut animation = self.animation.lock();
            if let Some(old) = animation.current.take() {
                animation.paths.set_enabled(old, true);
            }
            std::mem::take(&mut animation.frames)
        };
        drop(previous);
        tracing::debug!(theme = %self.name, "unloaded animation");
        LoadStep::UnloadedAnimation
    }
}

#[cfg(test)]
#[path = "../../tests/unit/show/theme.rs"]
mod tests;
