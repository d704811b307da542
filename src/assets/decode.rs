use std::io::Cursor;

use anyhow::Context;
use image::AnimationDecoder;

use crate::{
    assets::image::Image,
    foundation::error::{ThemeloopError, ThemeloopResult},
};

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> ThemeloopResult<Image> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(image_from_rgba(dyn_img.to_rgba8()))
}

/// Decode animation bytes into frames.
///
/// GIF input yields every frame in order. Anything else `image` can read is treated as a
/// one-frame animation.
pub fn decode_animation(bytes: &[u8]) -> ThemeloopResult<Vec<Image>> {
    let format = image::guess_format(bytes).context("guess animation format")?;
    if format != image::ImageFormat::Gif {
        return Ok(vec![decode_image(bytes)?]);
    }

    let decoder =
        image::codecs::gif::GifDecoder::new(Cursor::new(bytes)).context("open gif decoder")?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .context("decode gif frames")?;
    if frames.is_empty() {
        return Err(ThemeloopError::decode("animation contains no frames"));
    }

    Ok(frames
        .into_iter()
        .map(|f| image_from_rgba(f.into_buffer()))
        .collect())
}

fn image_from_rgba(rgba: image::RgbaImage) -> Image {
    let (width, height) = rgba.dimensions();
    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    Image::from_parts(width, height, rgba8_premul)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
