use anyhow::Result;
use image::RgbImage;

use crate::detect::result::Detection;

/// Object detector backend.
///
/// The pipeline treats detection as a black box: synchronous, no side effects,
/// possibly slow (model inference). A slow backend directly throttles the
/// consumer, which is accepted for a sampled stream. Implementations report
/// raw detections; the consumer applies the confidence threshold.
pub trait Detector: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a frame. Zero or more detections per frame.
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>>;

    /// Optional warm-up hook (model load, first-inference cost).
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
