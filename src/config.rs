//! violationd configuration.
//!
//! Loaded from an optional JSON file addressed by `SCOOPER_CONFIG`, then
//! overridden by individual environment variables, then validated. The ROI is
//! required: the consumer refuses to start without a monitored rectangle.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::artifact::DEFAULT_ARTIFACT_DIR;
use crate::channel::{parse_broker_addr, ChannelConfig, DEFAULT_BROKER_ADDR, DEFAULT_TOPIC};
use crate::roi::Roi;

const DEFAULT_CLIENT_ID: &str = "violationd";
const DEFAULT_MIN_CONFIDENCE: f32 = 0.75;

#[derive(Debug, Deserialize, Default)]
struct ViolationdConfigFile {
    broker_addr: Option<String>,
    topic: Option<String>,
    client_id: Option<String>,
    roi: Option<RoiFile>,
    artifacts: Option<ArtifactConfigFile>,
    detector: Option<DetectorConfigFile>,
}

#[derive(Debug, Deserialize)]
struct RoiFile {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
}

#[derive(Debug, Deserialize, Default)]
struct ArtifactConfigFile {
    dir: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    min_confidence: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct ViolationdConfig {
    pub broker_addr: String,
    pub topic: String,
    pub client_id: String,
    pub roi: Option<Roi>,
    pub artifact_dir: String,
    pub min_confidence: f32,
}

impl ViolationdConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SCOOPER_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ViolationdConfigFile) -> Result<Self> {
        let roi = match file.roi {
            Some(r) => Some(Roi::new(r.x1, r.y1, r.x2, r.y2)?),
            None => None,
        };
        Ok(Self {
            broker_addr: file
                .broker_addr
                .unwrap_or_else(|| DEFAULT_BROKER_ADDR.to_string()),
            topic: file.topic.unwrap_or_else(|| DEFAULT_TOPIC.to_string()),
            client_id: file
                .client_id
                .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
            roi,
            artifact_dir: file
                .artifacts
                .and_then(|a| a.dir)
                .unwrap_or_else(|| DEFAULT_ARTIFACT_DIR.to_string()),
            min_confidence: file
                .detector
                .and_then(|d| d.min_confidence)
                .unwrap_or(DEFAULT_MIN_CONFIDENCE),
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var("SCOOPER_BROKER_ADDR") {
            if !addr.trim().is_empty() {
                self.broker_addr = addr;
            }
        }
        if let Ok(topic) = std::env::var("SCOOPER_TOPIC") {
            if !topic.trim().is_empty() {
                self.topic = topic;
            }
        }
        if let Ok(roi) = std::env::var("SCOOPER_ROI") {
            if !roi.trim().is_empty() {
                self.roi = Some(parse_roi(&roi)?);
            }
        }
        if let Ok(dir) = std::env::var("SCOOPER_VIOLATIONS_DIR") {
            if !dir.trim().is_empty() {
                self.artifact_dir = dir;
            }
        }
        if let Ok(conf) = std::env::var("SCOOPER_MIN_CONFIDENCE") {
            self.min_confidence = conf
                .parse()
                .map_err(|_| anyhow!("SCOOPER_MIN_CONFIDENCE must be a number in [0, 1]"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        parse_broker_addr(&self.broker_addr)?;
        if self.topic.trim().is_empty() {
            return Err(anyhow!("topic must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(anyhow!(
                "min_confidence must be in [0, 1], got {}",
                self.min_confidence
            ));
        }
        if self.roi.is_none() {
            return Err(anyhow!(
                "no roi configured: set SCOOPER_ROI=x1,y1,x2,y2 or a roi section in the config file"
            ));
        }
        Ok(())
    }

    pub fn channel(&self) -> ChannelConfig {
        ChannelConfig {
            broker_addr: self.broker_addr.clone(),
            topic: self.topic.clone(),
            client_id: self.client_id.clone(),
        }
    }
}

/// Parse `x1,y1,x2,y2`.
pub fn parse_roi(value: &str) -> Result<Roi> {
    let parts: Vec<&str> = value.split(',').map(|p| p.trim()).collect();
    if parts.len() != 4 {
        return Err(anyhow!("roi must be x1,y1,x2,y2, got {:?}", value));
    }
    let coords: Vec<u32> = parts
        .iter()
        .map(|p| p.parse().with_context(|| format!("invalid roi coordinate {:?}", p)))
        .collect::<Result<_>>()?;
    Roi::new(coords[0], coords[1], coords[2], coords[3])
}

fn read_config_file(path: &Path) -> Result<ViolationdConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
