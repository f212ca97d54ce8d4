//! CPU raster primitives on `image` buffers
//!
//! All drawing is clipped to the frame; shapes may hang off any edge.

use glam::Vec2;
use image::{Rgb, RgbImage, RgbaImage};

/// Fill an axis-aligned rectangle
pub fn fill_rect(frame: &mut RgbImage, left: i32, top: i32, width: u32, height: u32, color: Rgb<u8>) {
    let (x0, x1) = clip_span(left, width, frame.width());
    let (y0, y1) = clip_span(top, height, frame.height());
    for y in y0..y1 {
        for x in x0..x1 {
            frame.put_pixel(x, y, color);
        }
    }
}

/// Outlined circle: pixels whose centre distance lies in `(radius - width, radius]`
pub fn draw_ring(frame: &mut RgbImage, center: Vec2, radius: f32, width: u32, color: Rgb<u8>) {
    let inner = radius - width as f32;
    let extent = radius.ceil() as i32;
    let (cx, cy) = (center.x.round() as i32, center.y.round() as i32);

    let (x0, x1) = clip_span(cx - extent, (2 * extent + 1) as u32, frame.width());
    let (y0, y1) = clip_span(cy - extent, (2 * extent + 1) as u32, frame.height());

    for y in y0..y1 {
        for x in x0..x1 {
            let d = Vec2::new(x as f32, y as f32).distance(center);
            if d <= radius && d > inner {
                frame.put_pixel(x, y, color);
            }
        }
    }
}

/// Paste an RGBA sprite with its top-left corner at (`left`, `top`),
/// alpha-blending over the frame
pub fn blit_rgba(frame: &mut RgbImage, sprite: &RgbaImage, left: i32, top: i32) {
    let (x0, x1) = clip_span(left, sprite.width(), frame.width());
    let (y0, y1) = clip_span(top, sprite.height(), frame.height());

    for y in y0..y1 {
        for x in x0..x1 {
            let src = sprite.get_pixel((x as i32 - left) as u32, (y as i32 - top) as u32);
            let alpha = src[3] as u32;
            if alpha == 0 {
                continue;
            }
            let dst = frame.get_pixel_mut(x, y);
            for c in 0..3 {
                dst[c] = ((src[c] as u32 * alpha + dst[c] as u32 * (255 - alpha) + 127) / 255) as u8;
            }
        }
    }
}

/// Intersect `[start, start + len)` with `[0, limit)`
fn clip_span(start: i32, len: u32, limit: u32) -> (u32, u32) {
    let lo = start.max(0) as i64;
    let hi = (start as i64 + len as i64).min(limit as i64);
    if hi <= lo {
        (0, 0)
    } else {
        (lo as u32, hi as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const BG: Rgb<u8> = Rgb([18, 18, 18]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    #[test]
    fn test_clip_span() {
        assert_eq!(clip_span(-5, 10, 100), (0, 5));
        assert_eq!(clip_span(95, 10, 100), (95, 100));
        assert_eq!(clip_span(120, 10, 100), (0, 0));
        assert_eq!(clip_span(-20, 10, 100), (0, 0));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut frame = RgbImage::from_pixel(10, 10, BG);
        fill_rect(&mut frame, 8, -2, 5, 4, WHITE);
        assert_eq!(*frame.get_pixel(9, 0), WHITE);
        assert_eq!(*frame.get_pixel(8, 1), WHITE);
        assert_eq!(*frame.get_pixel(8, 2), BG);
        assert_eq!(*frame.get_pixel(7, 0), BG);
    }

    #[test]
    fn test_ring_outline_only() {
        let mut frame = RgbImage::from_pixel(100, 100, BG);
        draw_ring(&mut frame, Vec2::new(50.0, 50.0), 40.0, 4, WHITE);
        assert_eq!(*frame.get_pixel(90, 50), WHITE);
        assert_eq!(*frame.get_pixel(87, 50), WHITE);
        assert_eq!(*frame.get_pixel(86, 50), BG);
        assert_eq!(*frame.get_pixel(50, 50), BG);
        assert_eq!(*frame.get_pixel(91, 50), BG);
    }

    #[test]
    fn test_blit_blends_alpha() {
        let mut frame = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        let mut sprite = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 255]));
        sprite.put_pixel(1, 1, Rgba([255, 255, 255, 0]));
        sprite.put_pixel(0, 1, Rgba([255, 255, 255, 128]));
        blit_rgba(&mut frame, &sprite, 1, 1);

        assert_eq!(*frame.get_pixel(1, 1), Rgb([200, 100, 50]));
        assert_eq!(*frame.get_pixel(2, 2), Rgb([0, 0, 0]));
        assert_eq!(*frame.get_pixel(1, 2), Rgb([128, 128, 128]));
        assert_eq!(*frame.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_blit_partially_offscreen() {
        let mut frame = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        let sprite = RgbaImage::from_pixel(3, 3, Rgba([9, 9, 9, 255]));
        blit_rgba(&mut frame, &sprite, -2, 3);
        assert_eq!(*frame.get_pixel(0, 3), Rgb([9, 9, 9]));
        assert_eq!(*frame.get_pixel(1, 3), Rgb([0, 0, 0]));
    }
}
