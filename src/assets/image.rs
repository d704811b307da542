use std::sync::{Arc, OnceLock};

use crate::foundation::error::{ThemeloopError, ThemeloopResult};
use crate::foundation::math::Fnv1a64;

/// Content key identifying the GPU texture backing an [`Image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureKey(pub u64);

struct ImageData {
    width: u32,
    height: u32,
    rgba8_premul: Vec<u8>,
    texture: OnceLock<TextureKey>,
}

/// Decoded still or animation frame.
///
/// Cloning copies a reference to the shared pixel data, never the pixels themselves. The default
/// value is empty and stands for "nothing available".
#[derive(Clone, Default)]
pub struct Image {
    data: Option<Arc<ImageData>>,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            None => f.write_str("Image(empty)"),
            Some(d) => f
                .debug_struct("Image")
                .field("width", &d.width)
                .field("height", &d.height)
                .field("uploaded", &d.texture.get().is_some())
                .finish(),
        }
    }
}

impl Image {
    /// Build an image from premultiplied RGBA8 pixels in row-major order.
    pub fn from_rgba8_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> ThemeloopResult<Self> {
        if width == 0 || height == 0 {
            return Err(ThemeloopError::validation("image dimensions must be > 0"));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(4))
            .ok_or_else(|| ThemeloopError::validation("image dimensions overflow"))?;
        if rgba8_premul.len() != expected {
            return Err(ThemeloopError::validation(format!(
                "image byte length {} does not match {width}x{height} RGBA8 ({expected})",
                rgba8_premul.len()
            )));
        }
        Ok(Self::from_parts(width, height, rgba8_premul))
    }

    pub(crate) fn from_parts(width: u32, height: u32, rgba8_premul: Vec<u8>) -> Self {
        Self {
            data: Some(Arc::new(ImageData {
                width,
                height,
                rgba8_premul,
                texture: OnceLock::new(),
            })),
        }
    }

    /// `true` for the "nothing available" value.
    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Width in pixels, 0 when empty.
    pub fn width(&self) -> u32 {
        self.data.as_ref().map_or(0, |d| d.width)
    }

    /// Height in pixels, 0 when empty.
    pub fn height(&self) -> u32 {
        self.data.as_ref().map_or(0, |d| d.height)
    }

    /// Premultiplied RGBA8 pixels, empty slice when empty.
    pub fn rgba8_premul(&self) -> &[u8] {
        self.data.as_ref().map_or(&[][..], |d| d.rgba8_premul.as_slice())
    }

    /// Upload the texture if that has not happened yet.
    ///
    /// The first call on any clone computes the [`TextureKey`]; later calls are free. No-op on an
    /// empty image.
    pub fn ensure_texture_uploaded(&self) {
        if let Some(d) = &self.data {
            d.texture.get_or_init(|| {
                let mut h = Fnv1a64::new_default();
                h.write_u32(d.width);
                h.write_u32(d.height);
                h.write_bytes(&d.rgba8_premul);
                TextureKey(h.finish())
            });
        }
    }

    /// `true` once [`Image::ensure_texture_uploaded`] has run on this image or any clone of it.
    pub fn is_uploaded(&self) -> bool {
        self.texture_key().is_some()
    }

    /// Texture key, present once uploaded.
    pub fn texture_key(&self) -> Option<TextureKey> {
        self.data.as_ref().and_then(|d| d.texture.get().copied())
    }

    /// `true` when both handles share the same pixel data (or are both empty).
    pub fn ptr_eq(&self, other: &Image) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image.rs"]
mod tests;
