//! Burns an overlay into the image itself, for exports.

use crate::acquire::{decode, encode_png};
use crate::AcquisitionError;
use autospector_core::media::EncodedImage;
use autospector_core::overlay::{Overlay, Rgb};
use image::{DynamicImage, Rgba, RgbaImage};
use std::path::Path;

pub fn render_annotated(img: &DynamicImage, overlay: &Overlay) -> RgbaImage {
    let mut canvas = img.to_rgba8();
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return canvas;
    }
    // Strokes grow with the picture so they stay visible on large photos.
    let scale = (w.min(h) as f32 / 400.0).max(1.0);

    for a in overlay.draw_order() {
        let px = a.rect.to_pixels(w as f64, h as f64);
        let x0 = px.x.floor() as i64;
        let y0 = px.y.floor() as i64;
        let x1 = (px.x + px.width).ceil() as i64 - 1;
        let y1 = (px.y + px.height).ceil() as i64 - 1;
        if x1 < x0 || y1 < y0 {
            continue;
        }

        let t = ((a.style.stroke_width * scale).round() as i64).max(1);
        let color = a.style.stroke;

        fill_rect(&mut canvas, (x0, y0, x1, y1), color, a.style.fill_alpha);
        fill_rect(&mut canvas, (x0, y0, x1, y0 + t - 1), color, 1.0);
        fill_rect(&mut canvas, (x0, y1 - t + 1, x1, y1), color, 1.0);
        fill_rect(&mut canvas, (x0, y0, x0 + t - 1, y1), color, 1.0);
        fill_rect(&mut canvas, (x1 - t + 1, y0, x1, y1), color, 1.0);

        let c = 2 * t;
        for (cx, cy) in [(x0, y0), (x1, y0), (x0, y1), (x1, y1)] {
            fill_rect(&mut canvas, (cx - t, cy - t, cx - t + c, cy - t + c), color, 1.0);
        }

        if a.style.marker {
            let r = 3 * t;
            fill_rect(&mut canvas, (x1 - 2 * r, y1 + t, x1, y1 + t + 2 * r), color, 1.0);
        }
    }

    canvas
}

pub fn export_png(
    image: &EncodedImage,
    overlay: &Overlay,
    path: &Path,
) -> Result<(), AcquisitionError> {
    let img = decode(image)?;
    let annotated = DynamicImage::ImageRgba8(render_annotated(&img, overlay));
    let bytes = encode_png(&annotated)?;
    std::fs::write(path, bytes).map_err(|source| AcquisitionError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn fill_rect(canvas: &mut RgbaImage, (x0, y0, x1, y1): (i64, i64, i64, i64), c: Rgb, alpha: f32) {
    let (w, h) = canvas.dimensions();
    let x0 = x0.max(0);
    let y0 = y0.max(0);
    let x1 = x1.min(w as i64 - 1);
    let y1 = y1.min(h as i64 - 1);
    if x1 < x0 || y1 < y0 {
        return;
    }
    for y in y0..=y1 {
        for x in x0..=x1 {
            let p = canvas.get_pixel_mut(x as u32, y as u32);
            *p = blend(*p, c, alpha);
        }
    }
}

fn blend(p: Rgba<u8>, c: Rgb, alpha: f32) -> Rgba<u8> {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |base: u8, top: u8| (base as f32 * (1.0 - a) + top as f32 * a).round() as u8;
    Rgba([mix(p[0], c.r), mix(p[1], c.g), mix(p[2], c.b), p[3].max((a * 255.0) as u8)])
}
