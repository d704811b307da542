use std::io::Cursor;

use image::codecs::gif::GifEncoder;

use super::*;

fn png_bytes(rgba: Vec<u8>, w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn gif_bytes(frame_count: u8) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut enc = GifEncoder::new(&mut buf);
        let frames = (0..frame_count).map(|i| {
            let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([i * 40, 10, 200, 255]));
            image::Frame::new(img)
        });
        enc.encode_frames(frames).unwrap();
    }
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = png_bytes(vec![100u8, 50u8, 200u8, 128u8], 1, 1);

    let img = decode_image(&buf).unwrap();
    assert_eq!(img.width(), 1);
    assert_eq!(img.height(), 1);
    assert_eq!(
        img.rgba8_premul(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn decode_animation_gif_yields_all_frames() {
    let frames = decode_animation(&gif_bytes(3)).unwrap();
    assert_eq!(frames.len(), 3);
    assert!(frames.iter().all(|f| f.width() == 2 && f.height() == 2));
}

#[test]
fn decode_animation_still_is_single_frame() {
    let frames = decode_animation(&png_bytes(vec![1, 2, 3, 255], 1, 1)).unwrap();
    assert_eq!(frames.len(), 1);
}

#[test]
fn transparent_pixels_premultiply_to_zero() {
    let mut px = [9u8, 9, 9, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, [0, 0, 0, 0]);
}
