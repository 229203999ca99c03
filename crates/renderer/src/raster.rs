use std::sync::Arc;

use image::ImageEncoder;
use usvg::fontdb;

use crate::RenderError;

pub(crate) fn rasterize_to_png(
    svg: &str,
    width: u32,
    height: u32,
    fonts: &Arc<fontdb::Database>,
) -> Result<Vec<u8>, RenderError> {
    let options = usvg::Options {
        fontdb: Arc::clone(fonts),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(svg, &options)?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or(RenderError::Allocation { width, height })?;

    let sx = width as f32 / tree.size().width();
    let sy = height as f32 / tree.size().height();
    let transform = resvg::tiny_skia::Transform::from_scale(sx, sy);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // tiny-skia hands back premultiplied alpha; PNG wants straight.
    let mut rgba = pixmap.take();
    demultiply_rgba8_in_place(&mut rgba);

    let mut png = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png).write_image(
        &rgba,
        width,
        height,
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(png)
}

fn demultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_plain_svg_to_png_bytes() {
        let fonts = Arc::new(fontdb::Database::new());
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"><rect x="0" y="0" width="8" height="8" fill="#336699"/></svg>"##;
        let png = rasterize_to_png(svg, 8, 8, &fonts).expect("png");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn rejects_malformed_svg() {
        let fonts = Arc::new(fontdb::Database::new());
        let result = rasterize_to_png("<svg", 8, 8, &fonts);
        assert!(matches!(result, Err(RenderError::InvalidSvg(_))));
    }

    #[test]
    fn demultiply_restores_straight_alpha() {
        // 50% alpha premultiplied: channel 64 ~= straight 128.
        let mut px = [64u8, 64, 64, 128];
        demultiply_rgba8_in_place(&mut px);
        assert_eq!(px[3], 128);
        assert!((px[0] as i16 - 128).abs() <= 1);
    }
}
