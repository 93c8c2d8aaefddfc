// Camera - render camera rig
//
// Owns the render target a sensor draws into. In direct display mode the
// target is released and the rig is bound straight to a display instead,
// so the buffer never exists on the simulation side.

use crate::environment::EnvironmentManager;
use crate::render::{FrameBuffer, SceneRenderer};

/// Camera rig with an optional offscreen render target
#[derive(Debug)]
pub struct CameraRig {
    width: u32,
    height: u32,
    fov_deg: f32,
    target: Option<FrameBuffer>,
    bound_display: Option<usize>,
    releases: u32,
    renders: u64,
}

impl CameraRig {
    /// Create a rig with no target allocated
    pub fn new(width: u32, height: u32, fov_deg: f32) -> Self {
        Self {
            width,
            height,
            fov_deg,
            target: None,
            bound_display: None,
            releases: 0,
            renders: 0,
        }
    }

    /// Width of the rendered image in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rendered image in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Vertical field of view in degrees
    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    /// Allocate the offscreen render target
    pub fn allocate_target(&mut self) {
        self.target = Some(FrameBuffer::new(self.width, self.height));
    }

    /// Release the render target if one is allocated
    ///
    /// Releasing without a target is a no-op, so the release counter only
    /// moves when a buffer was actually freed.
    pub fn release_target(&mut self) {
        if self.target.take().is_some() {
            self.releases += 1;
        }
    }

    /// Bind the rig's output to a display instead of an offscreen target
    pub fn bind_display(&mut self, display_index: usize) {
        self.bound_display = Some(display_index);
    }

    /// Display the rig is bound to, if any
    pub fn bound_display(&self) -> Option<usize> {
        self.bound_display
    }

    /// Whether an offscreen target is currently allocated
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// The rendered target, if allocated
    pub fn target(&self) -> Option<&FrameBuffer> {
        self.target.as_ref()
    }

    /// Mutable access to the rendered target, if allocated
    pub fn target_mut(&mut self) -> Option<&mut FrameBuffer> {
        self.target.as_mut()
    }

    /// Times the render target has been released
    pub fn releases(&self) -> u32 {
        self.releases
    }

    /// Renders performed through this rig
    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// Render the scene into the offscreen target
    ///
    /// Does nothing when no target is allocated; a rig bound to a display
    /// renders through the presentation path instead.
    pub fn render(&mut self, renderer: &mut SceneRenderer, env: &EnvironmentManager) {
        if let Some(target) = self.target.as_mut() {
            renderer.render(env, self.fov_deg, target);
            self.renders += 1;
        }
    }
}
