// Capture - save published frames to disk
//
// Writes frames as PNG with a JSON metadata sidecar, grouped per sensor
// under the capture directory.

use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::hub::ImageFrame;

/// Errors that can occur while saving a capture
#[derive(Debug)]
pub enum CaptureError {
    /// IO error during directory or file operations
    Io(std::io::Error),
    /// PNG encoding error
    PngEncoding(png::EncodingError),
    /// Metadata serialization error
    Metadata(serde_json::Error),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::Io(err) => write!(f, "IO error: {}", err),
            CaptureError::PngEncoding(err) => write!(f, "PNG encoding error: {}", err),
            CaptureError::Metadata(err) => write!(f, "metadata error: {}", err),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Io(err) => Some(err),
            CaptureError::PngEncoding(err) => Some(err),
            CaptureError::Metadata(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Io(err)
    }
}

impl From<png::EncodingError> for CaptureError {
    fn from(err: png::EncodingError) -> Self {
        CaptureError::PngEncoding(err)
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(err: serde_json::Error) -> Self {
        CaptureError::Metadata(err)
    }
}

/// Metadata written alongside each captured image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    /// Sensor that produced the frame
    pub sensor: String,
    /// Per-sensor frame counter
    pub frame_id: u64,
    /// Simulation time of capture in seconds
    pub sim_time: f64,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Wall-clock time the capture was written
    pub captured_at: String,
}

/// Save a frame as PNG with a JSON sidecar
///
/// Files land in `<base_dir>/<sensor>/`, named by frame id and wall-clock
/// timestamp. The alpha channel is stripped since captures are opaque.
///
/// # Arguments
/// * `frame` - The published frame to save
/// * `base_dir` - Root capture directory, created if missing
///
/// # Returns
/// The path of the written PNG file
pub fn save_frame(frame: &ImageFrame, base_dir: &Path) -> Result<PathBuf, CaptureError> {
    let sensor_dir = base_dir.join(&frame.sensor);
    fs::create_dir_all(&sensor_dir)?;

    let now = Local::now();
    let stem = format!(
        "frame_{:06}_{}",
        frame.frame_id,
        now.format("%Y%m%d_%H%M%S_%3f")
    );
    let png_path = sensor_dir.join(format!("{}.png", stem));
    let json_path = sensor_dir.join(format!("{}.json", stem));

    write_png(frame, &png_path)?;

    let metadata = CaptureMetadata {
        sensor: frame.sensor.clone(),
        frame_id: frame.frame_id,
        sim_time: frame.sim_time,
        width: frame.width,
        height: frame.height,
        captured_at: now.to_rfc3339(),
    };
    let json = serde_json::to_string_pretty(&metadata)?;
    fs::write(&json_path, json)?;

    Ok(png_path)
}

fn write_png(frame: &ImageFrame, path: &Path) -> Result<(), CaptureError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, frame.width, frame.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    // RGBA -> RGB
    let mut rgb = Vec::with_capacity(frame.width as usize * frame.height as usize * 3);
    for pixel in frame.pixels.chunks_exact(4) {
        rgb.push(pixel[0]);
        rgb.push(pixel[1]);
        rgb.push(pixel[2]);
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&rgb)?;

    Ok(())
}
