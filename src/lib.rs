//! Scooper-Watch
//!
//! This crate implements a frame-dispatch and violation-state pipeline for
//! food-prep hygiene monitoring. A producer reads frames from a video source
//! and publishes them through a message broker; a consumer decodes each frame,
//! runs an object detector, and raises a stateful violation when a hand enters
//! a monitored region (ROI) without a scooper while pizza is present.
//!
//! # Architecture
//!
//! ```text
//! source -> FrameProducer -> broker -> FrameConsumer -> Detector
//!                                            |
//!                                      ViolationTracker -> violations/
//! ```
//!
//! The producer and consumer are separate processes that share nothing but the
//! broker topic. The consumer processes one frame fully before pulling the
//! next; the broker is the only buffering and the only point of coordination.
//! Frames are a sampled, lossy stream: a frame lost between receipt and
//! processing is tolerated.
//!
//! # Module Structure
//!
//! - `codec`: frame <-> wire payload (JPEG + base64 in a JSON envelope)
//! - `channel`: MQTT publish/consume plumbing (QoS 1, at-least-once)
//! - `source`: sequential video frame sources
//! - `detect`: detection data model and backend trait
//! - `roi`: monitored rectangle and containment test
//! - `tracker`: the violation state machine
//! - `artifact`: persisted violation frames
//! - `producer` / `consumer`: the two pipeline ends

pub mod annotate;
pub mod artifact;
pub mod channel;
pub mod codec;
pub mod config;
pub mod consumer;
pub mod detect;
pub mod error;
pub mod producer;
pub mod roi;
pub mod source;
pub mod tracker;

pub use artifact::ArtifactStore;
pub use channel::{parse_broker_addr, BrokerEndpoint, ChannelConfig, FrameReceiver, FrameSender};
pub use consumer::{FrameConsumer, SessionStats};
pub use detect::{BoundingBox, Detection, Detector, StubDetector};
pub use error::PipelineError;
pub use producer::FrameProducer;
pub use roi::{FixedRoiProvider, Roi, RoiProvider};
pub use source::{open_source, ImageDirSource, StubSource, VideoSource};
pub use tracker::{FrameFlags, Transition, ViolationTracker};
