use std::collections::VecDeque;

use anyhow::Result;
use image::RgbImage;

use crate::detect::backend::Detector;
use crate::detect::result::Detection;

/// Stub backend. Returns scripted detection sets in order, then empty sets.
///
/// `StubDetector::new()` detects nothing, which keeps a session inert until a
/// real model backend is wired in. The scripted form drives deterministic
/// pipeline tests without any model.
pub struct StubDetector {
    script: VecDeque<Vec<Detection>>,
}

impl StubDetector {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
        }
    }

    pub fn scripted(frames: impl IntoIterator<Item = Vec<Detection>>) -> Self {
        Self {
            script: frames.into_iter().collect(),
        }
    }
}

impl Default for StubDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for StubDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>> {
        Ok(self.script.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::result::BoundingBox;

    #[test]
    fn plays_script_in_order_then_goes_quiet() {
        let det = Detection::new(
            "hand",
            0.9,
            BoundingBox {
                x1: 0,
                y1: 0,
                x2: 10,
                y2: 10,
            },
        );
        let mut stub = StubDetector::scripted([vec![det], vec![]]);
        let frame = RgbImage::new(8, 8);

        assert_eq!(stub.detect(&frame).unwrap().len(), 1);
        assert!(stub.detect(&frame).unwrap().is_empty());
        assert!(stub.detect(&frame).unwrap().is_empty());
    }
}
