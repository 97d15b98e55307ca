//! Overlay drawing for violation artifacts.
//!
//! Draws the ROI and every detection box on a frame before it is persisted.
//! Per-label colors match the live operator view: hand red, scooper orange,
//! pizza green, anything else gray, ROI blue. Text labels are a display
//! concern and are not rendered here.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::detect::{BoundingBox, Detection};
use crate::roi::Roi;
use crate::tracker::{LABEL_HAND, LABEL_PIZZA, LABEL_SCOOPER};

const COLOR_ROI: Rgb<u8> = Rgb([0, 0, 255]);
const COLOR_HAND: Rgb<u8> = Rgb([255, 0, 0]);
const COLOR_SCOOPER: Rgb<u8> = Rgb([255, 165, 0]);
const COLOR_PIZZA: Rgb<u8> = Rgb([0, 255, 0]);
const COLOR_OTHER: Rgb<u8> = Rgb([200, 200, 200]);

pub fn annotate(frame: &mut RgbImage, roi: &Roi, detections: &[Detection]) {
    draw_rect(frame, roi.x1, roi.y1, roi.x2, roi.y2, COLOR_ROI);
    for det in detections {
        let color = label_color(&det.label);
        let BoundingBox { x1, y1, x2, y2 } = det.bbox;
        draw_rect(frame, x1, y1, x2, y2, color);
    }
}

fn label_color(label: &str) -> Rgb<u8> {
    match label {
        LABEL_HAND => COLOR_HAND,
        LABEL_SCOOPER => COLOR_SCOOPER,
        LABEL_PIZZA => COLOR_PIZZA,
        _ => COLOR_OTHER,
    }
}

fn draw_rect(frame: &mut RgbImage, x1: u32, y1: u32, x2: u32, y2: u32, color: Rgb<u8>) {
    if x2 < x1 || y2 < y1 {
        return;
    }
    // Edges are inclusive, so a degenerate rectangle still marks its pixel.
    let rect = Rect::at(x1 as i32, y1 as i32).of_size(x2 - x1 + 1, y2 - y1 + 1);
    draw_hollow_rect_mut(frame, rect, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_roi_outline() {
        let mut frame = RgbImage::new(100, 100);
        let roi = Roi::new(10, 10, 50, 50).unwrap();
        annotate(&mut frame, &roi, &[]);
        assert_eq!(*frame.get_pixel(10, 10), COLOR_ROI);
        assert_eq!(*frame.get_pixel(30, 10), COLOR_ROI);
        // Interior untouched.
        assert_eq!(*frame.get_pixel(30, 30), Rgb([0, 0, 0]));
    }

    #[test]
    fn tolerates_degenerate_and_out_of_bounds_boxes() {
        let mut frame = RgbImage::new(50, 50);
        let roi = Roi::new(20, 20, 20, 20).unwrap();
        let dets = vec![
            Detection::new(
                "hand",
                0.9,
                BoundingBox {
                    x1: 40,
                    y1: 40,
                    x2: 200,
                    y2: 200,
                },
            ),
            Detection::new(
                "pizza",
                0.8,
                BoundingBox {
                    x1: 5,
                    y1: 5,
                    x2: 5,
                    y2: 30,
                },
            ),
        ];
        // Must not panic.
        annotate(&mut frame, &roi, &dets);
    }
}
