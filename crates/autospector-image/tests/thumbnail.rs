use autospector_core::history::Thumbnailer;
use autospector_image::acquire::{decode_data_uri, encode_png, from_bytes};
use autospector_image::thumbnail::{shrink, thumbnail_data_uri, JpegThumbnailer, ThumbnailConfig};
use image::{DynamicImage, Rgb, RgbImage};

fn data_uri(w: u32, h: u32) -> String {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([200, 10, 10])));
    from_bytes(&encode_png(&img).unwrap(), Some("image/png"))
        .unwrap()
        .to_data_uri()
}

#[test]
fn wide_image_shrinks_to_max_width_keeping_aspect() {
    let thumb = thumbnail_data_uri(&data_uri(1200, 800), &ThumbnailConfig::default()).unwrap();
    assert!(thumb.starts_with("data:image/jpeg;base64,"));

    let img = decode_data_uri(&thumb).unwrap();
    assert_eq!((300, 200), (img.width(), img.height()));
}

#[test]
fn small_image_is_never_upscaled() {
    let img = DynamicImage::ImageRgb8(RgbImage::new(120, 90));
    let out = shrink(&img, &ThumbnailConfig::default());
    assert_eq!((120, 90), (out.width(), out.height()));
}

#[test]
fn thumbnailer_gives_up_on_garbage() {
    let t = JpegThumbnailer::default();
    assert_eq!(None, t.thumbnail("data:image/png;base64,bm90IGFuIGltYWdl"));
    assert_eq!(None, t.thumbnail("not a data uri"));
}

#[test]
fn custom_width_is_honoured() {
    let t = JpegThumbnailer::new(ThumbnailConfig {
        max_width: 100,
        jpeg_quality: 50,
    });
    let thumb = t.thumbnail(&data_uri(400, 400)).unwrap();
    let img = decode_data_uri(&thumb).unwrap();
    assert_eq!((100, 100), (img.width(), img.height()));
}
