//! violationd - consume frames, run detection, track scooper violations.
//!
//! This daemon:
//! 1. Subscribes to the frame topic and decodes each payload
//! 2. Latches the monitored ROI from configuration on the first frame
//! 3. Runs the detector backend on every frame
//! 4. Drives the violation state machine (hand in ROI + pizza + no scooper)
//! 5. Persists an annotated frame under violations/ on each rising edge
//!
//! Per-frame failures are logged and skipped; only loss of the broker
//! connection terminates the process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};

use scooper_watch::config::ViolationdConfig;
use scooper_watch::{
    ArtifactStore, FixedRoiProvider, FrameConsumer, FrameReceiver, StubDetector,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = ViolationdConfig::load()?;
    let roi = cfg.roi.ok_or_else(|| anyhow!("no roi configured"))?;

    log::info!("violationd starting");
    log::info!("  broker: {}", cfg.broker_addr);
    log::info!("  topic: {}", cfg.topic);
    log::info!("  roi: ({}, {}) - ({}, {})", roi.x1, roi.y1, roi.x2, roi.y2);
    log::info!("  violations dir: {}", cfg.artifact_dir);
    log::info!("  min confidence: {:.2}", cfg.min_confidence);

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            log::info!("interrupt received, stopping consumer");
            shutdown.store(true, Ordering::Relaxed);
        })?;
    }

    // The stub backend detects nothing; a model backend implements the
    // Detector trait and replaces it here.
    let detector = StubDetector::new();
    log::warn!("stub detector active: no violations will be raised until a model backend is wired in");

    let artifacts = ArtifactStore::new(&cfg.artifact_dir)?;
    let mut consumer = FrameConsumer::new(
        Box::new(detector),
        Box::new(FixedRoiProvider::new(roi)),
        artifacts,
        cfg.min_confidence,
    );

    let mut receiver = FrameReceiver::connect(&cfg.channel())?;
    let result = consumer.run(&mut receiver, &shutdown);
    receiver.close()?;

    let stats = result?;
    log::info!(
        "session complete: {} frames processed, {} dropped, {} violations",
        stats.frames_processed,
        stats.frames_dropped,
        stats.violation_count
    );
    Ok(())
}
