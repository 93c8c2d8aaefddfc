// Hub - frame distribution to main view and client consumers
//
// Sensors publish rendered frames to the hub; the hub fans them out to
// registered consumers according to each sensor's distribution type.

use std::sync::Arc;

use crate::render::FrameBuffer;
use crate::sensor::SensorDistributionType;

/// Callback invoked for each frame delivered to a consumer
pub type FrameCallback = Arc<dyn Fn(&ImageFrame) + Send + Sync>;

/// Kind of consumer attached to the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerKind {
    /// The local simulation view
    MainView,
    /// A connected remote client
    Client,
}

/// One published sensor frame
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFrame {
    /// Name of the sensor that produced the frame
    pub sensor: String,
    /// Monotonic per-sensor frame counter
    pub frame_id: u64,
    /// Simulation time of capture in seconds
    pub sim_time: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Tightly packed RGBA8 pixel data
    pub pixels: Vec<u8>,
}

impl ImageFrame {
    /// Snapshot a frame buffer into a publishable frame
    pub fn from_buffer(
        sensor: impl Into<String>,
        frame_id: u64,
        sim_time: f64,
        buffer: &FrameBuffer,
    ) -> Self {
        Self {
            sensor: sensor.into(),
            frame_id,
            sim_time,
            width: buffer.width(),
            height: buffer.height(),
            pixels: buffer.as_slice().to_vec(),
        }
    }
}

/// Frame distribution hub
#[derive(Default)]
pub struct FrameHub {
    consumers: Vec<(ConsumerKind, FrameCallback)>,
    published: u64,
    delivered: u64,
}

impl FrameHub {
    /// Create a hub with no consumers
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a consumer
    pub fn subscribe(&mut self, kind: ConsumerKind, callback: FrameCallback) {
        self.consumers.push((kind, callback));
    }

    /// Number of attached consumers
    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }

    /// Frames published through the hub
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Total frame deliveries across all consumers
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Publish a frame, fanning it out per the sensor's distribution
    ///
    /// `MainOnly` reaches main view consumers, `ClientOnly` reaches client
    /// consumers, and `MainOrClient` reaches everyone.
    pub fn publish(&mut self, frame: &ImageFrame, distribution: SensorDistributionType) {
        self.published += 1;

        for (kind, callback) in &self.consumers {
            let wanted = match distribution {
                SensorDistributionType::MainOnly => *kind == ConsumerKind::MainView,
                SensorDistributionType::ClientOnly => *kind == ConsumerKind::Client,
                SensorDistributionType::MainOrClient => true,
            };
            if wanted {
                callback(frame);
                self.delivered += 1;
            }
        }
    }
}

impl std::fmt::Debug for FrameHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameHub")
            .field("consumers", &self.consumers.len())
            .field("published", &self.published)
            .field("delivered", &self.delivered)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn counting_hub() -> (FrameHub, Arc<AtomicU64>, Arc<AtomicU64>) {
        let mut hub = FrameHub::new();
        let main_count = Arc::new(AtomicU64::new(0));
        let client_count = Arc::new(AtomicU64::new(0));

        let main_clone = Arc::clone(&main_count);
        hub.subscribe(
            ConsumerKind::MainView,
            Arc::new(move |_| {
                main_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let client_clone = Arc::clone(&client_count);
        hub.subscribe(
            ConsumerKind::Client,
            Arc::new(move |_| {
                client_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        (hub, main_count, client_count)
    }

    fn test_frame() -> ImageFrame {
        ImageFrame::from_buffer("cam", 1, 0.5, &FrameBuffer::new(4, 4))
    }

    #[test]
    fn test_client_only_skips_main_view() {
        let (mut hub, main_count, client_count) = counting_hub();
        hub.publish(&test_frame(), SensorDistributionType::ClientOnly);
        assert_eq!(main_count.load(Ordering::SeqCst), 0);
        assert_eq!(client_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_main_only_skips_clients() {
        let (mut hub, main_count, client_count) = counting_hub();
        hub.publish(&test_frame(), SensorDistributionType::MainOnly);
        assert_eq!(main_count.load(Ordering::SeqCst), 1);
        assert_eq!(client_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_main_or_client_reaches_everyone() {
        let (mut hub, main_count, client_count) = counting_hub();
        hub.publish(&test_frame(), SensorDistributionType::MainOrClient);
        assert_eq!(main_count.load(Ordering::SeqCst), 1);
        assert_eq!(client_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_publish_and_delivery_counters() {
        let (mut hub, _, _) = counting_hub();
        hub.publish(&test_frame(), SensorDistributionType::MainOrClient);
        hub.publish(&test_frame(), SensorDistributionType::ClientOnly);
        assert_eq!(hub.published(), 2);
        assert_eq!(hub.delivered(), 3);
    }

    #[test]
    fn test_frame_snapshot_copies_pixels() {
        let mut buffer = FrameBuffer::new(2, 2);
        buffer.set_pixel(1, 1, [9, 8, 7, 0xFF]);
        let frame = ImageFrame::from_buffer("cam", 3, 1.25, &buffer);
        assert_eq!(frame.width, 2);
        assert_eq!(frame.frame_id, 3);
        assert_eq!(&frame.pixels[12..16], &[9, 8, 7, 0xFF]);
    }
}
