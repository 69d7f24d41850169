use image::{Rgba, RgbaImage};

use super::*;

#[test]
fn encoded_png_decodes_to_straight_alpha() {
    let mut premul = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 255, 255]));
    premul.put_pixel(0, 0, Rgba([100, 50, 0, 128]));
    let bytes = encode_png(RasterImage::from_premultiplied(premul)).unwrap();

    assert_eq!(
        image::guess_format(&bytes).unwrap(),
        image::ImageFormat::Png
    );
    let back = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (3, 2));
    assert_eq!(back.get_pixel(1, 1).0, [0, 0, 255, 255]);

    let p = back.get_pixel(0, 0).0;
    assert_eq!(p[3], 128);
    assert!(p[0].abs_diff(199) <= 1, "{p:?}");
    assert!(p[1].abs_diff(100) <= 1, "{p:?}");
}

#[test]
fn encoding_is_deterministic() {
    let img = RgbaImage::from_fn(16, 16, |x, y| Rgba([(x * 16) as u8, (y * 16) as u8, 7, 255]));
    let a = encode_png(RasterImage::from_premultiplied(img.clone())).unwrap();
    let b = encode_png(RasterImage::from_premultiplied(img)).unwrap();
    assert_eq!(a, b);
}
