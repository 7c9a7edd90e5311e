use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb([200, 30, 40])
        } else {
            Rgb([30, 40, 200])
        }
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn gif_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Gif)
}
