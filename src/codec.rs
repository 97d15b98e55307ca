//! Frame wire codec.
//!
//! A frame crosses the queue boundary as a JSON envelope with a single field
//! `frame` holding a base64-encoded JPEG. Encoding is lossy by design; the
//! round trip preserves dimensions, not exact pixels. The codec is stateless.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Serialize, Deserialize)]
struct FrameEnvelope {
    frame: String,
}

/// Compress a frame to JPEG and wrap it in the transport envelope.
pub fn encode_frame(frame: &RgbImage) -> Result<Vec<u8>> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode_image(frame)
        .context("jpeg-encode frame")?;

    let envelope = FrameEnvelope {
        frame: BASE64.encode(&jpeg),
    };
    serde_json::to_vec(&envelope).context("serialize frame envelope")
}

/// Inverse of [`encode_frame`].
///
/// Any malformed payload (bad JSON, bad base64, corrupt or truncated JPEG)
/// yields [`PipelineError::Decode`]; the caller drops the frame and continues,
/// it must not abort the session.
pub fn decode_frame(payload: &[u8]) -> Result<RgbImage, PipelineError> {
    let envelope: FrameEnvelope = serde_json::from_slice(payload)
        .map_err(|e| PipelineError::Decode(format!("invalid envelope: {}", e)))?;

    let jpeg = BASE64
        .decode(envelope.frame.as_bytes())
        .map_err(|e| PipelineError::Decode(format!("invalid base64: {}", e)))?;

    let image = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)
        .map_err(|e| PipelineError::Decode(format!("invalid jpeg: {}", e)))?;
    Ok(image.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn round_trip_preserves_dimensions() {
        for (w, h) in [(64, 48), (640, 480), (1, 1), (31, 97)] {
            let frame = gradient_frame(w, h);
            let payload = encode_frame(&frame).unwrap();
            let decoded = decode_frame(&payload).unwrap();
            assert_eq!(decoded.dimensions(), (w, h));
        }
    }

    #[test]
    fn rejects_non_json_payload() {
        let err = decode_frame(b"not json at all").unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn rejects_bad_base64() {
        let err = decode_frame(br#"{"frame": "!!not-base64!!"}"#).unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn rejects_truncated_jpeg() {
        let frame = gradient_frame(64, 64);
        let payload = encode_frame(&frame).unwrap();
        let envelope: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        let b64 = envelope["frame"].as_str().unwrap();

        // Chop the compressed stream in half; base64 still decodes but the
        // JPEG is incomplete.
        let truncated = format!(r#"{{"frame": "{}"}}"#, &b64[..(b64.len() / 2 / 4) * 4]);
        let err = decode_frame(truncated.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn rejects_missing_frame_field() {
        let err = decode_frame(br#"{"other": 1}"#).unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }
}
