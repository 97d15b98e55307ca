//! Sequential video frame sources.
//!
//! A source yields frames until exhausted; exhaustion is a clean termination
//! signal for the producer, not an error. Two sources ship:
//!
//! - `stub://<name>?frames=N` - deterministic synthetic frames for tests and
//!   demos, no capture hardware needed.
//! - a directory of still images consumed in lexicographic order (a camera
//!   frame dump), decoded in-memory.
//!
//! Hardware decoders (RTSP, V4L2) would implement the same trait.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use image::RgbImage;

const STUB_SCHEME: &str = "stub://";
const STUB_DEFAULT_FRAMES: u64 = 100;
const STUB_WIDTH: u32 = 640;
const STUB_HEIGHT: u32 = 480;

/// A sequential frame source. `Ok(None)` means the source is exhausted.
pub trait VideoSource: Send {
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// Open a source from a path or `stub://` URL.
pub fn open_source(spec: &str) -> Result<Box<dyn VideoSource>> {
    if spec.starts_with(STUB_SCHEME) {
        Ok(Box::new(StubSource::parse(spec)?))
    } else {
        Ok(Box::new(ImageDirSource::new(spec)?))
    }
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://) for tests and demos
// ----------------------------------------------------------------------------

/// Deterministic synthetic frames; the pattern shifts each frame so consumers
/// see distinct content.
pub struct StubSource {
    name: String,
    remaining: u64,
    frame_index: u64,
}

impl StubSource {
    pub fn new(name: impl Into<String>, frames: u64) -> Self {
        Self {
            name: name.into(),
            remaining: frames,
            frame_index: 0,
        }
    }

    /// Parse `stub://<name>?frames=N` (frames defaults to 100).
    pub fn parse(spec: &str) -> Result<Self> {
        let rest = spec
            .strip_prefix(STUB_SCHEME)
            .ok_or_else(|| anyhow!("not a stub source: {}", spec))?;
        let (name, query) = match rest.split_once('?') {
            Some((name, query)) => (name, Some(query)),
            None => (rest, None),
        };
        if name.is_empty() {
            return Err(anyhow!("stub source needs a name: {}", spec));
        }

        let mut frames = STUB_DEFAULT_FRAMES;
        if let Some(query) = query {
            for pair in query.split('&') {
                match pair.split_once('=') {
                    Some(("frames", value)) => {
                        frames = value
                            .parse()
                            .with_context(|| format!("invalid frames count in {}", spec))?;
                    }
                    _ => return Err(anyhow!("unknown stub parameter: {}", pair)),
                }
            }
        }
        Ok(Self::new(name, frames))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl VideoSource for StubSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        let shift = self.frame_index;
        self.frame_index += 1;

        let frame = RgbImage::from_fn(STUB_WIDTH, STUB_HEIGHT, |x, y| {
            let v = (x as u64 + y as u64 + shift) % 256;
            image::Rgb([v as u8, (v / 2) as u8, (255 - v) as u8])
        });
        Ok(Some(frame))
    }
}

// ----------------------------------------------------------------------------
// Image-sequence directory source
// ----------------------------------------------------------------------------

pub struct ImageDirSource {
    files: Vec<PathBuf>,
    next: usize,
}

impl ImageDirSource {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("open frame directory {}", dir.display()))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("jpg") | Some("jpeg") | Some("png")
                )
            })
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(anyhow!("no frames found in {}", dir.display()));
        }
        log::info!("frame directory {}: {} frames", dir.display(), files.len());
        Ok(Self { files, next: 0 })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl VideoSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        // Skip unreadable entries rather than ending the stream early.
        while self.next < self.files.len() {
            let path = &self.files[self.next];
            self.next += 1;
            match image::open(path) {
                Ok(img) => return Ok(Some(img.to_rgb8())),
                Err(e) => {
                    log::warn!("skipping unreadable frame {}: {}", path.display(), e);
                }
            }
        }
        Ok(None)
    }
}
