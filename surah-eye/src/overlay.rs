//! Frame annotations drawn by the guidance loop before publishing.
//!
//! Pixel primitives write straight into the image; text is attached as
//! [`Label`]s for the display sink to render.

use image::{Rgb, RgbImage};
use surah_core::{BoundingBox, Landmark};

use crate::frame::{Frame, Label};

pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

const BOX_THICKNESS: u32 = 2;
const CLOSEST_THICKNESS: u32 = 2;

fn put_pixel_checked(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    let (w, h) = img.dimensions();
    if x >= 0 && y >= 0 && (x as u64) < w as u64 && (y as u64) < h as u64 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Draw a rectangle border with the given thickness, clipped to the image
pub fn draw_rect(img: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    if bbox.is_degenerate() {
        return;
    }
    let x0 = bbox.x as i64;
    let y0 = bbox.y as i64;
    let x1 = bbox.right() as i64;
    let y1 = bbox.bottom() as i64;
    for t in 0..thickness as i64 {
        let (xx0, yy0, xx1, yy1) = (x0 + t, y0 + t, x1 - t, y1 - t);
        if xx0 > xx1 || yy0 > yy1 {
            break;
        }
        for x in xx0..=xx1 {
            put_pixel_checked(img, x, yy0, color);
            put_pixel_checked(img, x, yy1, color);
        }
        for y in yy0..=yy1 {
            put_pixel_checked(img, xx0, y, color);
            put_pixel_checked(img, xx1, y, color);
        }
    }
}

/// Bresenham line; thickness widens the stroke perpendicular to its major axis
pub fn draw_line(img: &mut RgbImage, from: (i32, i32), to: (i32, i32), color: Rgb<u8>, thickness: u32) {
    let (mut x, mut y) = (from.0 as i64, from.1 as i64);
    let (x1, y1) = (to.0 as i64, to.1 as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let steep = dy.abs() > dx;
    let half = thickness.max(1) as i64 / 2;

    loop {
        for offset in -half..=(thickness.max(1) as i64 - 1 - half) {
            if steep {
                put_pixel_checked(img, x + offset, y, color);
            } else {
                put_pixel_checked(img, x, y + offset, color);
            }
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Tracked box with its name and the tracking status line
pub fn annotate_target(frame: &mut Frame, bbox: &BoundingBox, name: &str, tracking: bool) {
    draw_rect(&mut frame.image, bbox, GREEN, BOX_THICKNESS);
    frame.add_label(Label::new(name.to_uppercase(), (bbox.x + 10, bbox.y + 30), GREEN));
    if tracking {
        frame.add_label(Label::new("Tracking", (10, 50), BLUE));
    } else {
        frame.add_label(Label::new("Track Lost", (10, 50), RED));
    }
}

/// Thin lines from each landmark to the target centre, the closest one in red
pub fn annotate_landmarks(frame: &mut Frame, landmarks: &[Landmark], target: &BoundingBox, closest: Option<&Landmark>) {
    let center = target.center_px();
    for lm in landmarks {
        draw_line(&mut frame.image, (lm.x, lm.y), center, BLUE, 1);
    }
    if let Some(lm) = closest {
        draw_line(&mut frame.image, (lm.x, lm.y), center, RED, CLOSEST_THICKNESS);
    }
}

pub fn annotate_distance(frame: &mut Frame, distance: f64) {
    frame.add_label(Label::new(format!("Distance: {}px", distance.round() as i64), (125, 25), BLACK));
}

pub fn annotate_rate(frame: &mut Frame, rate: f64) {
    frame.add_label(Label::new(format!("FPS: {:.0}", rate), (10, 25), BLACK));
}

#[cfg(test)]
mod tests {
    use super::*;
    use surah_core::HandLandmark;

    #[test]
    fn test_draw_rect_border_only() {
        let mut img = RgbImage::new(20, 20);
        draw_rect(&mut img, &BoundingBox::new(2, 2, 10, 10), GREEN, 1);
        assert_eq!(*img.get_pixel(2, 2), GREEN);
        assert_eq!(*img.get_pixel(12, 12), GREEN);
        assert_eq!(*img.get_pixel(7, 2), GREEN);
        assert_eq!(*img.get_pixel(7, 7), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_rect_clips_out_of_bounds() {
        let mut img = RgbImage::new(10, 10);
        draw_rect(&mut img, &BoundingBox::new(-5, -5, 30, 30), GREEN, 2);
        draw_rect(&mut img, &BoundingBox::new(50, 50, 5, 5), GREEN, 2);
        // Nothing visible for either box, and no panic
        assert_eq!(*img.get_pixel(5, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_line_endpoints() {
        let mut img = RgbImage::new(20, 20);
        draw_line(&mut img, (1, 1), (15, 8), RED, 1);
        assert_eq!(*img.get_pixel(1, 1), RED);
        assert_eq!(*img.get_pixel(15, 8), RED);
    }

    #[test]
    fn test_draw_line_partially_offscreen() {
        let mut img = RgbImage::new(10, 10);
        draw_line(&mut img, (-10, 5), (5, 5), BLUE, 3);
        assert_eq!(*img.get_pixel(0, 5), BLUE);
        assert_eq!(*img.get_pixel(5, 5), BLUE);
        assert_eq!(*img.get_pixel(5, 4), BLUE);
    }

    #[test]
    fn test_annotate_target_labels() {
        let mut frame = Frame::blank(100, 100, 1);
        annotate_target(&mut frame, &BoundingBox::new(10, 10, 30, 30), "cup", false);
        let texts: Vec<_> = frame.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["CUP", "Track Lost"]);
        assert_eq!(*frame.image.get_pixel(10, 10), GREEN);
    }

    #[test]
    fn test_annotate_landmarks_highlights_closest() {
        let mut frame = Frame::blank(100, 100, 1);
        let target = BoundingBox::new(40, 40, 20, 20);
        let a = Landmark::new(HandLandmark::Wrist, 10, 50);
        let b = Landmark::new(HandLandmark::IndexFingerTip, 90, 50);
        annotate_landmarks(&mut frame, &[a, b], &target, Some(&b));
        assert_eq!(*frame.image.get_pixel(90, 50), RED);
        assert_eq!(*frame.image.get_pixel(10, 50), BLUE);
    }

    #[test]
    fn test_stat_labels() {
        let mut frame = Frame::blank(10, 10, 1);
        annotate_distance(&mut frame, 7.07);
        annotate_rate(&mut frame, 29.6);
        assert_eq!(frame.labels[0].text, "Distance: 7px");
        assert_eq!(frame.labels[1].text, "FPS: 30");
    }
}
