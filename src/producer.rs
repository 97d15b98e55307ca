//! Frame producer.
//!
//! Encodes frames and publishes them through the frame channel. Side effect
//! only; the owning loop decides pacing and when to stop. `close` must run on
//! every exit path, including early break on end-of-stream.

use anyhow::Result;
use image::RgbImage;

use crate::channel::FrameSender;
use crate::codec::encode_frame;

pub struct FrameProducer {
    sender: FrameSender,
    frames_sent: u64,
}

impl FrameProducer {
    pub fn new(sender: FrameSender) -> Self {
        Self {
            sender,
            frames_sent: 0,
        }
    }

    pub fn publish_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let payload = encode_frame(frame)?;
        self.sender.publish(&payload)?;
        self.frames_sent += 1;
        log::debug!("frame {} published ({} bytes)", self.frames_sent, payload.len());
        Ok(())
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Release the channel connection.
    pub fn close(self) -> Result<()> {
        self.sender.close()
    }
}
