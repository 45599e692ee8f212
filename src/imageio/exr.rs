use exr::prelude::*;
use image::{ImageBuffer, Rgb};

/// Writes a rendered `Film::into_image_buffer()` result to `path` as a
/// single-layer scanline EXR. `.exr` is appended if `path` doesn't already
/// carry it, matching what `RenderConfig::output` promises.
pub fn write_exr(path: &str, image: &ImageBuffer<Rgb<f32>, Vec<f32>>) -> anyhow::Result<()> {
    let (width, height) = (image.width() as usize, image.height() as usize);

    let path = if path.ends_with(".exr") {
        path.to_string()
    } else {
        format!("{}.exr", path)
    };

    write_rgb_file(path, width, height, |x, y| {
        let px = image.get_pixel(x as u32, y as u32);
        (px[0], px[1], px[2])
    })?;

    Ok(())
}
