//! Monitored region of interest.
//!
//! The ROI is an axis-aligned rectangle in pixel coordinates of the frame size
//! in use when it was selected. It is latched once per consumer session, before
//! any violation evaluation, and is immutable afterwards.

use anyhow::{anyhow, Result};
use image::RgbImage;

use crate::detect::BoundingBox;

/// Axis-aligned monitored rectangle, inclusive on all four edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Roi {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Roi {
    /// Build an ROI, rejecting inverted rectangles. A zero-area rectangle
    /// (`x1 == x2` or `y1 == y2`) is degenerate but legal: containment then
    /// only admits zero-area boxes on the same edge.
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Result<Self> {
        if x1 > x2 || y1 > y2 {
            return Err(anyhow!(
                "inverted roi rectangle: ({}, {}, {}, {})",
                x1,
                y1,
                x2,
                y2
            ));
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// Full containment test, boundary-inclusive. Partial overlap does not
    /// count: all four box edges must be within the ROI edges.
    pub fn contains_box(&self, b: &BoundingBox) -> bool {
        b.x1 >= self.x1 && b.y1 >= self.y1 && b.x2 <= self.x2 && b.y2 <= self.y2
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }
}

/// Strategy for obtaining the session ROI from the first decoded frame.
///
/// The consumer depends only on this trait; the shipped variant reads a fixed
/// rectangle from configuration. An interactive capture (human draws the
/// rectangle on a display) would implement the same seam, keeping the core
/// free of any display requirement.
pub trait RoiProvider: Send {
    fn roi_for(&mut self, first_frame: &RgbImage) -> Result<Roi>;
}

/// ROI from configuration. Ignores the frame content.
pub struct FixedRoiProvider {
    roi: Roi,
}

impl FixedRoiProvider {
    pub fn new(roi: Roi) -> Self {
        Self { roi }
    }
}

impl RoiProvider for FixedRoiProvider {
    fn roi_for(&mut self, _first_frame: &RgbImage) -> Result<Roi> {
        Ok(self.roi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x1: u32, y1: u32, x2: u32, y2: u32) -> BoundingBox {
        BoundingBox { x1, y1, x2, y2 }
    }

    #[test]
    fn rejects_inverted_rectangles() {
        assert!(Roi::new(100, 0, 50, 100).is_err());
        assert!(Roi::new(0, 100, 100, 50).is_err());
    }

    #[test]
    fn fully_inside_counts() {
        let roi = Roi::new(0, 0, 100, 100).unwrap();
        assert!(roi.contains_box(&bbox(10, 10, 90, 90)));
        assert!(roi.contains_box(&bbox(40, 40, 60, 60)));
    }

    #[test]
    fn boundaries_are_inclusive() {
        let roi = Roi::new(0, 0, 100, 100).unwrap();
        assert!(roi.contains_box(&bbox(0, 0, 100, 100)));
        assert!(roi.contains_box(&bbox(0, 50, 50, 100)));
    }

    #[test]
    fn partial_overlap_is_excluded() {
        let roi = Roi::new(0, 0, 100, 100).unwrap();
        assert!(!roi.contains_box(&bbox(50, 50, 150, 150)));
        assert!(!roi.contains_box(&bbox(0, 90, 10, 101)));
    }

    #[test]
    fn fully_outside_is_excluded() {
        let roi = Roi::new(0, 0, 100, 100).unwrap();
        assert!(!roi.contains_box(&bbox(200, 200, 300, 300)));
        assert!(!roi.contains_box(&bbox(101, 0, 150, 50)));
    }

    #[test]
    fn one_pixel_past_each_edge_is_excluded() {
        let roi = Roi::new(10, 10, 100, 100).unwrap();
        assert!(!roi.contains_box(&bbox(9, 10, 100, 100)));
        assert!(!roi.contains_box(&bbox(10, 9, 100, 100)));
        assert!(!roi.contains_box(&bbox(10, 10, 101, 100)));
        assert!(!roi.contains_box(&bbox(10, 10, 100, 101)));
    }

    #[test]
    fn zero_area_roi_admits_only_matching_zero_area_boxes() {
        let roi = Roi::new(50, 50, 50, 50).unwrap();
        assert!(roi.contains_box(&bbox(50, 50, 50, 50)));
        assert!(!roi.contains_box(&bbox(50, 50, 51, 50)));
        assert!(!roi.contains_box(&bbox(49, 50, 50, 50)));
        assert!(!roi.contains_box(&bbox(40, 40, 60, 60)));
    }

    #[test]
    fn randomized_containment_matches_the_four_inequalities() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0x5c00);
        for _ in 0..1000 {
            let (rx1, rx2) = ordered_pair(&mut rng);
            let (ry1, ry2) = ordered_pair(&mut rng);
            let roi = Roi::new(rx1, ry1, rx2, ry2).unwrap();

            let (bx1, bx2) = ordered_pair(&mut rng);
            let (by1, by2) = ordered_pair(&mut rng);
            let b = bbox(bx1, by1, bx2, by2);

            let expected = bx1 >= rx1 && by1 >= ry1 && bx2 <= rx2 && by2 <= ry2;
            assert_eq!(roi.contains_box(&b), expected, "roi={:?} box={:?}", roi, b);
        }

        // Boxes sampled strictly within the ROI are always contained.
        for _ in 0..200 {
            let roi = Roi::new(50, 50, 150, 150).unwrap();
            let (bx1, bx2) = {
                let a = rng.gen_range(50..=150);
                let b = rng.gen_range(a..=150);
                (a, b)
            };
            let (by1, by2) = {
                let a = rng.gen_range(50..=150);
                let b = rng.gen_range(a..=150);
                (a, b)
            };
            assert!(roi.contains_box(&bbox(bx1, by1, bx2, by2)));
        }
    }

    fn ordered_pair(rng: &mut impl rand::Rng) -> (u32, u32) {
        let a = rng.gen_range(0..200);
        let b = rng.gen_range(0..200);
        (a.min(b), a.max(b))
    }

    #[test]
    fn fixed_provider_ignores_the_frame() {
        let roi = Roi::new(5, 5, 50, 50).unwrap();
        let mut provider = FixedRoiProvider::new(roi);
        let frame = RgbImage::new(640, 480);
        assert_eq!(provider.roi_for(&frame).unwrap(), roi);
        // Repeat calls return the same rectangle.
        assert_eq!(provider.roi_for(&frame).unwrap(), roi);
    }
}
