//! Frame consumer orchestration.
//!
//! Pulls payloads from the channel and processes each one fully before the
//! next: decode, latch the ROI on the first frame, detect, evaluate the
//! violation condition, persist an artifact on the rising edge. There is no
//! internal parallelism; a slow detector throttles consumption, which is
//! accepted for a sampled stream.
//!
//! Failure routing follows the pipeline taxonomy: decode and artifact errors
//! are logged and skipped, only channel errors terminate the session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use image::RgbImage;

use crate::annotate::annotate;
use crate::artifact::ArtifactStore;
use crate::channel::FrameReceiver;
use crate::codec::decode_frame;
use crate::detect::{Detection, Detector};
use crate::roi::{Roi, RoiProvider};
use crate::tracker::{FrameFlags, Transition, ViolationTracker};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// What one consumer session did, reported at shutdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames_processed: u64,
    /// Frames dropped to a decode or detector failure.
    pub frames_dropped: u64,
    pub violation_count: u64,
}

pub struct FrameConsumer {
    detector: Box<dyn Detector>,
    roi_provider: Box<dyn RoiProvider>,
    roi: Option<Roi>,
    tracker: ViolationTracker,
    artifacts: ArtifactStore,
    /// Detections below this confidence are discarded before evaluation.
    min_confidence: f32,
    frames_processed: u64,
    frames_dropped: u64,
}

impl FrameConsumer {
    pub fn new(
        detector: Box<dyn Detector>,
        roi_provider: Box<dyn RoiProvider>,
        artifacts: ArtifactStore,
        min_confidence: f32,
    ) -> Self {
        Self {
            detector,
            roi_provider,
            roi: None,
            tracker: ViolationTracker::new(),
            artifacts,
            min_confidence,
            frames_processed: 0,
            frames_dropped: 0,
        }
    }

    /// Consume until the shutdown flag is set or the channel fails.
    ///
    /// Shutdown is an explicit control-flow outcome checked once per message;
    /// no in-flight frame is guaranteed to complete on forced shutdown.
    pub fn run(
        &mut self,
        receiver: &mut FrameReceiver,
        shutdown: &AtomicBool,
    ) -> Result<SessionStats> {
        self.detector.warm_up().context("detector warm-up")?;
        log::info!(
            "consuming with detector '{}' (min confidence {:.2})",
            self.detector.name(),
            self.min_confidence
        );

        while !shutdown.load(Ordering::Relaxed) {
            match receiver.poll(POLL_INTERVAL)? {
                Some(payload) => self.process_payload(&payload)?,
                None => continue,
            }
        }
        log::info!("shutdown requested, stopping consumer");
        Ok(self.stats())
    }

    /// Process one payload end to end. Per-frame failures are absorbed here;
    /// an error return means the session itself is broken.
    pub fn process_payload(&mut self, payload: &[u8]) -> Result<()> {
        let mut frame = match decode_frame(payload) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("dropping frame: {}", e);
                self.frames_dropped += 1;
                return Ok(());
            }
        };

        let roi = self.session_roi(&frame)?;

        let detections = match self.detector.detect(&frame) {
            Ok(detections) => detections,
            Err(e) => {
                log::warn!("dropping frame: detector failed: {}", e);
                self.frames_dropped += 1;
                return Ok(());
            }
        };
        let detections: Vec<Detection> = detections
            .into_iter()
            .filter(|d| d.confidence >= self.min_confidence)
            .collect();

        let flags = FrameFlags::from_detections(&detections, &roi);
        match self.tracker.observe(flags.violating_now()) {
            Transition::Started => {
                log::warn!(
                    "violation #{}: hand in roi, pizza present, no scooper",
                    self.tracker.count()
                );
                annotate(&mut frame, &roi, &detections);
                match self.artifacts.save(&frame) {
                    Ok(path) => log::info!("violation frame saved: {}", path.display()),
                    // State tracking continues even when the disk does not.
                    Err(e) => log::error!("{}", e),
                }
            }
            Transition::Ended => {
                log::info!("violation #{} ended", self.tracker.count());
            }
            Transition::Ongoing | Transition::Clear => {}
        }

        self.frames_processed += 1;
        Ok(())
    }

    /// Latch the ROI from the first decoded frame. The provider runs exactly
    /// once per session; later frames reuse the cached rectangle.
    fn session_roi(&mut self, frame: &RgbImage) -> Result<Roi> {
        if let Some(roi) = self.roi {
            return Ok(roi);
        }
        let roi = self
            .roi_provider
            .roi_for(frame)
            .context("obtain session roi")?;
        log::info!(
            "roi latched: ({}, {}) - ({}, {})",
            roi.x1,
            roi.y1,
            roi.x2,
            roi.y2
        );
        self.roi = Some(roi);
        Ok(roi)
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            frames_processed: self.frames_processed,
            frames_dropped: self.frames_dropped,
            violation_count: self.tracker.count(),
        }
    }

    pub fn tracker(&self) -> &ViolationTracker {
        &self.tracker
    }

    pub fn roi(&self) -> Option<Roi> {
        self.roi
    }
}
