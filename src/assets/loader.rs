use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use parking_lot::Mutex;

use crate::{
    assets::decode::{decode_animation, decode_image},
    assets::image::Image,
    foundation::error::ThemeloopResult,
    foundation::math::hash_str,
};

/// Decode collaborator used by themes to fill their caches.
///
/// Implementations must not fail loudly: a failed load returns an empty [`Image`] or an empty
/// frame list, and the theme retries later. Calls happen without any theme lock held.
pub trait AssetLoader: Send + Sync {
    /// Load one still.
    fn load_image(&self, path: &Path) -> Image;

    /// Load every frame of one animation.
    fn load_animation(&self, path: &Path) -> Vec<Image>;
}

/// Loader that reads and decodes files from disk.
///
/// Relative paths resolve against `root`; absolute paths are used as-is.
#[derive(Clone, Debug)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    /// Create a loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory used when resolving relative asset paths.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fallible variant of [`AssetLoader::load_image`].
    pub fn try_load_image(&self, path: &Path) -> ThemeloopResult<Image> {
        decode_image(&self.read_bytes(path)?)
    }

    /// Fallible variant of [`AssetLoader::load_animation`].
    pub fn try_load_animation(&self, path: &Path) -> ThemeloopResult<Vec<Image>> {
        decode_animation(&self.read_bytes(path)?)
    }

    fn read_bytes(&self, path: &Path) -> ThemeloopResult<Vec<u8>> {
        let full = self.root.join(path);
        Ok(std::fs::read(&full).with_context(|| format!("read asset '{}'", full.display()))?)
    }
}

impl AssetLoader for FsAssetLoader {
    fn load_image(&self, path: &Path) -> Image {
        match self.try_load_image(path) {
            Ok(img) => img,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "image load failed");
                Image::default()
            }
        }
    }

    fn load_animation(&self, path: &Path) -> Vec<Image> {
        match self.try_load_animation(path) {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "animation load failed");
                Vec::new()
            }
        }
    }
}

/// In-memory loader that synthesizes solid-color images from path hashes.
///
/// Used for headless demo runs and for tests. Paths registered with
/// [`SyntheticLoader::with_failing`] always fail, and every call is counted.
#[derive(Debug)]
pub struct SyntheticLoader {
    size: u32,
    animation_frames: usize,
    failing: HashSet<PathBuf>,
    decodes: Mutex<HashMap<PathBuf, usize>>,
}

impl Default for SyntheticLoader {
    fn default() -> Self {
        Self::new(4)
    }
}

impl SyntheticLoader {
    /// Create a loader producing `size`x`size` images and 4-frame animations.
    pub fn new(size: u32) -> Self {
        Self {
            size: size.max(1),
            animation_frames: 4,
            failing: HashSet::new(),
            decodes: Mutex::new(HashMap::new()),
        }
    }

    /// Set the number of frames produced per animation.
    pub fn with_animation_frames(mut self, frames: usize) -> Self {
        self.animation_frames = frames;
        self
    }

    /// Make loads of these paths fail.
    pub fn with_failing<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.failing.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Number of load attempts for `path`, successful or not.
    pub fn decode_count(&self, path: impl AsRef<Path>) -> usize {
        self.decodes
            .lock()
            .get(path.as_ref())
            .copied()
            .unwrap_or(0)
    }

    /// Total load attempts across all paths.
    pub fn total_decodes(&self) -> usize {
        self.decodes.lock().values().sum()
    }

    fn record(&self, path: &Path) -> bool {
        *self.decodes.lock().entry(path.to_path_buf()).or_insert(0) += 1;
        !self.failing.contains(path)
    }

    fn solid(&self, path: &Path, shade: u8) -> Image {
        let h = hash_str(&path.to_string_lossy()).to_le_bytes();
        let rgba = [h[0] ^ shade, h[1], h[2], 255];
        let px = (self.size as usize) * (self.size as usize);
        let bytes = rgba.iter().copied().cycle().take(px * 4).collect();
        Image::from_parts(self.size, self.size, bytes)
    }
}

impl AssetLoader for SyntheticLoader {
    fn load_image(&self, path: &Path) -> Image {
        if !self.record(path) {
            tracing::warn!(path = %path.display(), "synthetic image load failed");
            return Image::default();
        }
        self.solid(path, 0)
    }

    fn load_animation(&self, path: &Path) -> Vec<Image> {
        if !self.record(path) {
            tracing::warn!(path = %path.display(), "synthetic animation load failed");
            return Vec::new();
        }
        (0..self.animation_frames)
            .map(|i| self.solid(path, i as u8))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
