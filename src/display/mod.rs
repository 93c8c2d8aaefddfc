// Display - connected display enumeration and activation
//
// Sensors that drive a display directly go through the `DisplayHost`
// trait. The windowed host backs it with real monitors; headless runs and
// tests use `SimulatedDisplays`.

pub mod window;

pub use window::{run_window, WindowConfig, WindowHost};

/// Refresh rate used when a sensor activates a display directly
pub const DIRECT_DISPLAY_REFRESH_HZ: u32 = 60;

/// One connected display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayInfo {
    /// Native horizontal resolution in pixels
    pub system_width: u32,
    /// Native vertical resolution in pixels
    pub system_height: u32,
    /// Reported refresh rate in millihertz, if known
    pub refresh_millihertz: Option<u32>,
    /// Display name, if the platform reports one
    pub name: Option<String>,
}

/// Record of a display being activated for direct sensor output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayActivation {
    /// Index into the enumerated display list
    pub index: usize,
    /// Activated horizontal resolution
    pub width: u32,
    /// Activated vertical resolution
    pub height: u32,
    /// Activated refresh rate in Hz
    pub refresh_hz: u32,
}

/// Access to the host's displays
///
/// `activate` is a request, not a query: hosts record activations and the
/// presentation layer acts on them when it is ready.
pub trait DisplayHost {
    /// Enumerated displays, in platform order
    fn displays(&self) -> &[DisplayInfo];

    /// Activate a display for direct sensor output
    fn activate(&mut self, activation: DisplayActivation);

    /// Activations requested so far, in order
    fn activations(&self) -> &[DisplayActivation];
}

/// Display host backed by a fixed display list
///
/// Used headless and in tests, and by the windowed host to record
/// activations before the window exists.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDisplays {
    displays: Vec<DisplayInfo>,
    activations: Vec<DisplayActivation>,
}

impl SimulatedDisplays {
    /// Create a host with the given displays
    pub fn new(displays: Vec<DisplayInfo>) -> Self {
        Self {
            displays,
            activations: Vec::new(),
        }
    }

    /// Create a host with no displays connected
    pub fn none() -> Self {
        Self::default()
    }

    /// Create a host with a single display of the given geometry
    pub fn single(width: u32, height: u32, refresh_hz: u32) -> Self {
        Self::new(vec![DisplayInfo {
            system_width: width,
            system_height: height,
            refresh_millihertz: Some(refresh_hz * 1000),
            name: None,
        }])
    }
}

impl DisplayHost for SimulatedDisplays {
    fn displays(&self) -> &[DisplayInfo] {
        &self.displays
    }

    fn activate(&mut self, activation: DisplayActivation) {
        self.activations.push(activation);
    }

    fn activations(&self) -> &[DisplayActivation] {
        &self.activations
    }
}
