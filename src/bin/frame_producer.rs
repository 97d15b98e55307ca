//! frame_producer - read a video source and publish every frame to the broker.
//!
//! The producer owns one end of the frame channel. It reads frames
//! sequentially, encodes each as a JPEG envelope, and publishes at QoS 1 until
//! the source is exhausted or SIGINT is received. The channel connection is
//! released on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use scooper_watch::{open_source, ChannelConfig, FrameProducer, FrameSender, VideoSource};

#[derive(Parser, Debug)]
#[command(author, version, about = "Publish video frames to the detection queue")]
struct Args {
    /// Frame source: a directory of still images, or stub://<name>?frames=N
    /// for a synthetic stream.
    #[arg(long, env = "SCOOPER_SOURCE", default_value = "stub://kitchen?frames=100")]
    source: String,

    /// MQTT broker address (host:port or mqtt://host:port).
    #[arg(long, env = "SCOOPER_BROKER_ADDR", default_value = "127.0.0.1:1883")]
    broker_addr: String,

    /// Topic shared with the consumer; must match exactly.
    #[arg(long, env = "SCOOPER_TOPIC", default_value = "video_frames")]
    topic: String,

    /// MQTT client identifier.
    #[arg(long, env = "SCOOPER_CLIENT_ID", default_value = "frame_producer")]
    client_id: String,

    /// Publish rate in frames per second; 0 publishes as fast as the source
    /// and channel allow.
    #[arg(long, env = "SCOOPER_FPS", default_value_t = 10)]
    fps: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            log::info!("interrupt received, stopping producer");
            shutdown.store(true, Ordering::Relaxed);
        })?;
    }

    let mut source = open_source(&args.source)?;
    let sender = FrameSender::connect(&ChannelConfig {
        broker_addr: args.broker_addr.clone(),
        topic: args.topic.clone(),
        client_id: args.client_id.clone(),
    })?;
    let mut producer = FrameProducer::new(sender);

    log::info!("producing from {} to topic {}", args.source, args.topic);

    let pacing = if args.fps > 0 {
        Some(Duration::from_millis(1000 / u64::from(args.fps)))
    } else {
        None
    };

    let result = pump_frames(source.as_mut(), &mut producer, &shutdown, pacing);
    let sent = producer.frames_sent();
    let closed = producer.close();
    result?;
    closed?;

    log::info!("producer done: {} frames published", sent);
    Ok(())
}

fn pump_frames(
    source: &mut dyn VideoSource,
    producer: &mut FrameProducer,
    shutdown: &AtomicBool,
    pacing: Option<Duration>,
) -> Result<()> {
    while !shutdown.load(Ordering::Relaxed) {
        let Some(frame) = source.next_frame()? else {
            log::info!("video source exhausted");
            break;
        };
        producer.publish_frame(&frame)?;
        if let Some(interval) = pacing {
            std::thread::sleep(interval);
        }
    }
    Ok(())
}
