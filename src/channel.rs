//! Frame channel over MQTT.
//!
//! The producer and consumer communicate only through one broker topic with
//! QoS 1 (at-least-once). Publish order from a single producer is preserved;
//! consumption is fire-and-forget, so a crash between receipt and processing
//! loses that frame - acceptable for a sampled stream.
//!
//! Each end runs the rumqttc event loop on its own thread. On the publish
//! side the thread only drains acknowledgements; on the consume side it
//! forwards incoming payloads to the session thread. Connection loss surfaces
//! as [`PipelineError::Channel`], which is fatal to the owning process; there
//! is no automatic reconnect here.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use rumqttc::v5::{mqttbytes::QoS, Client, Connection, Event, Incoming, MqttOptions};

use crate::error::PipelineError;

pub const DEFAULT_BROKER_ADDR: &str = "127.0.0.1:1883";
pub const DEFAULT_TOPIC: &str = "video_frames";

const EVENT_LOOP_CAPACITY: usize = 10;
const KEEP_ALIVE: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct ChannelConfig {
    /// Broker address: `host:port`, `mqtt://host:port`, or bracketed IPv6.
    pub broker_addr: String,
    /// Topic shared by producer and consumer; must match exactly.
    pub topic: String,
    pub client_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerEndpoint {
    pub host: String,
    pub port: u16,
}

pub fn parse_broker_addr(addr: &str) -> Result<BrokerEndpoint> {
    let mut remainder = addr.trim();
    if let Some((scheme, rest)) = remainder.split_once("://") {
        match scheme {
            "mqtt" | "tcp" => {}
            other => return Err(anyhow!("unsupported broker scheme: {}", other)),
        }
        remainder = rest;
    }
    let (host, port) = split_host_port(remainder)?;
    Ok(BrokerEndpoint { host, port })
}

fn split_host_port(addr: &str) -> Result<(String, u16)> {
    // IPv6 addresses in brackets: [::1]:1883
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, rest) = rest
            .split_once(']')
            .ok_or_else(|| anyhow!("invalid broker address: {}", addr))?;
        let port = rest
            .strip_prefix(':')
            .ok_or_else(|| anyhow!("missing broker port in {}", addr))?;
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid broker port in {}", addr))?;
        return Ok((host.to_string(), port));
    }

    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("missing broker port in {}", addr))?;
    let port: u16 = port
        .parse()
        .with_context(|| format!("invalid broker port in {}", addr))?;
    Ok((host.to_string(), port))
}

fn mqtt_options(config: &ChannelConfig) -> Result<MqttOptions> {
    let endpoint = parse_broker_addr(&config.broker_addr)?;
    let mut options = MqttOptions::new(&config.client_id, endpoint.host, endpoint.port);
    options.set_keep_alive(KEEP_ALIVE);
    options.set_clean_start(true);
    Ok(options)
}

// ----------------------------------------------------------------------------
// Publish side
// ----------------------------------------------------------------------------

/// Publishing end of the frame channel.
///
/// `publish` may block briefly while the connection is saturated; that is the
/// only backpressure the pipeline has. `close` must run on every exit path of
/// the owning session.
pub struct FrameSender {
    client: Client,
    topic: String,
    drain: Option<JoinHandle<()>>,
}

impl FrameSender {
    pub fn connect(config: &ChannelConfig) -> Result<Self> {
        let options = mqtt_options(config)?;
        let (client, connection) = Client::new(options, EVENT_LOOP_CAPACITY);
        let drain = std::thread::spawn(move || drain_events(connection));
        log::info!(
            "frame sender connected to {} (topic {})",
            config.broker_addr,
            config.topic
        );
        Ok(Self {
            client,
            topic: config.topic.clone(),
            drain: Some(drain),
        })
    }

    pub fn publish(&self, payload: &[u8]) -> Result<(), PipelineError> {
        self.client
            .publish(&self.topic, QoS::AtLeastOnce, false, payload.to_vec())
            .map_err(|e| PipelineError::Channel(e.to_string()))
    }

    /// Disconnect and join the event loop thread.
    pub fn close(mut self) -> Result<()> {
        self.client.disconnect().context("mqtt disconnect")?;
        if let Some(handle) = self.drain.take() {
            let _ = handle.join();
        }
        Ok(())
    }
}

fn drain_events(mut connection: Connection) {
    for event in connection.iter() {
        match event {
            Ok(Event::Incoming(_)) | Ok(Event::Outgoing(_)) => {}
            Err(e) => {
                log::warn!("mqtt connection error: {}", e);
                break;
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Consume side
// ----------------------------------------------------------------------------

enum ReceiverEvent {
    Payload(Vec<u8>),
    Error(String),
}

/// Consuming end of the frame channel.
///
/// The event loop thread forwards every payload published on the subscribed
/// topic; `poll` hands them to the session one at a time so the caller can
/// check its shutdown flag between messages.
pub struct FrameReceiver {
    client: Client,
    rx: Receiver<ReceiverEvent>,
    reader: Option<JoinHandle<()>>,
}

impl FrameReceiver {
    pub fn connect(config: &ChannelConfig) -> Result<Self> {
        let options = mqtt_options(config)?;
        let (client, connection) = Client::new(options, EVENT_LOOP_CAPACITY);
        client
            .subscribe(&config.topic, QoS::AtLeastOnce)
            .with_context(|| format!("subscribe to {}", config.topic))?;

        let (tx, rx) = mpsc::channel();
        let reader = std::thread::spawn(move || forward_payloads(connection, tx));
        log::info!(
            "frame receiver subscribed to {} on {}",
            config.topic,
            config.broker_addr
        );
        Ok(Self {
            client,
            rx,
            reader: Some(reader),
        })
    }

    /// Wait up to `timeout` for the next payload.
    ///
    /// `Ok(None)` on timeout lets the caller check for shutdown;
    /// `Err(Channel)` means the broker connection is gone and the session
    /// must terminate.
    pub fn poll(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, PipelineError> {
        match self.rx.recv_timeout(timeout) {
            Ok(ReceiverEvent::Payload(payload)) => Ok(Some(payload)),
            Ok(ReceiverEvent::Error(e)) => Err(PipelineError::Channel(e)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(PipelineError::Channel("mqtt event loop terminated".into()))
            }
        }
    }

    /// Disconnect and join the event loop thread.
    pub fn close(mut self) -> Result<()> {
        self.client.disconnect().context("mqtt disconnect")?;
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
        Ok(())
    }
}

fn forward_payloads(mut connection: Connection, tx: Sender<ReceiverEvent>) {
    for event in connection.iter() {
        match event {
            Ok(Event::Incoming(Incoming::Publish(publish))) => {
                if tx.send(ReceiverEvent::Payload(publish.payload.to_vec())).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                let _ = tx.send(ReceiverEvent::Error(e.to_string()));
                break;
            }
        }
    }
}
