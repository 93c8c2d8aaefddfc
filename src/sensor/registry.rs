// Registry - sensor kind registration and construction
//
// Sensor kinds are registered as a descriptor plus a builder function. The
// registry constructs sensors from configuration entries and rejects kinds
// it has never heard of.

use crate::config::SensorEntry;
use crate::sensor::camera::ColorCamera;
use crate::sensor::postprocess::PostProcessKind;
use crate::sensor::{Sensor, SensorError};

/// Kind of data a sensor produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// RGBA image frames
    Image,
}

/// Static description of a sensor kind
#[derive(Debug)]
pub struct SensorDescriptor {
    /// Kind name used in configuration
    pub kind: &'static str,
    /// Data kinds instances of this sensor produce
    pub data_kinds: &'static [DataKind],
    /// Post-processing applied when the config does not override it
    pub default_postprocessing: &'static [PostProcessKind],
    /// Relative simulation cost of one instance
    pub performance_load: f32,
}

/// Descriptor for the color camera sensor
pub static COLOR_CAMERA: SensorDescriptor = SensorDescriptor {
    kind: "color-camera",
    data_kinds: &[DataKind::Image],
    default_postprocessing: &[PostProcessKind::Rain, PostProcessKind::SunFlare],
    performance_load: 1.0,
};

/// Builder constructing a sensor from its configuration entry
pub type SensorBuilder = fn(&SensorEntry) -> Result<Box<dyn Sensor>, SensorError>;

/// Registry of available sensor kinds
pub struct SensorRegistry {
    entries: Vec<(&'static SensorDescriptor, SensorBuilder)>,
}

impl SensorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create a registry with all built-in sensor kinds
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(&COLOR_CAMERA, |entry| {
            Ok(Box::new(ColorCamera::from_entry(entry)))
        });
        registry
    }

    /// Register a sensor kind
    pub fn register(&mut self, descriptor: &'static SensorDescriptor, builder: SensorBuilder) {
        self.entries.push((descriptor, builder));
    }

    /// Look up the descriptor for a kind name
    pub fn descriptor(&self, kind: &str) -> Option<&'static SensorDescriptor> {
        self.entries
            .iter()
            .find(|(descriptor, _)| descriptor.kind == kind)
            .map(|(descriptor, _)| *descriptor)
    }

    /// Names of all registered kinds
    pub fn kinds(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .map(|(descriptor, _)| descriptor.kind)
            .collect()
    }

    /// Construct a sensor from a configuration entry
    ///
    /// # Returns
    /// The constructed sensor, or `SensorError::UnknownKind` if no
    /// registered kind matches the entry
    pub fn build(&self, entry: &SensorEntry) -> Result<Box<dyn Sensor>, SensorError> {
        match self
            .entries
            .iter()
            .find(|(descriptor, _)| descriptor.kind == entry.kind)
        {
            Some((_, builder)) => builder(entry),
            None => Err(SensorError::UnknownKind(entry.kind.clone())),
        }
    }
}

impl Default for SensorRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}
