// Frame buffer - RGBA pixel storage for rendered sensor output
//
// Sensors render at arbitrary resolutions, so the buffer is heap-allocated
// and sized at creation. Pixels are stored as tightly packed RGBA8.

/// Number of bytes per RGBA pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Frame buffer holding one rendered image
///
/// Stores RGBA8 pixel data in row-major order. The buffer size is fixed at
/// creation; rendering into a buffer of the wrong size is a caller bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    /// Create a new frame buffer initialized to opaque black
    ///
    /// # Arguments
    /// * `width` - Width in pixels (must be non-zero)
    /// * `height` - Height in pixels (must be non-zero)
    ///
    /// # Panics
    /// Panics if either dimension is zero
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0, "frame buffer width must be non-zero");
        assert!(height > 0, "frame buffer height must be non-zero");

        let mut pixels = vec![0u8; width as usize * height as usize * BYTES_PER_PIXEL];
        for alpha in pixels.iter_mut().skip(3).step_by(BYTES_PER_PIXEL) {
            *alpha = 0xFF;
        }

        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        assert!(x < self.width, "x coordinate {} out of bounds", x);
        assert!(y < self.height, "y coordinate {} out of bounds", y);

        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        self.pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgba);
    }

    /// Get a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width, "x coordinate {} out of bounds", x);
        assert!(y < self.height, "y coordinate {} out of bounds", y);

        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        ]
    }

    /// Additively blend an RGB color into a pixel
    ///
    /// Used by post-processing effects. `alpha` is the blend weight of the
    /// incoming color in `0.0..=1.0`; the stored alpha channel stays opaque.
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    pub fn blend_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3], alpha: f32) {
        let current = self.pixel(x, y);
        let weight = alpha.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            (a as f32 * (1.0 - weight) + b as f32 * weight).round() as u8
        };

        self.set_pixel(
            x,
            y,
            [
                mix(current[0], rgb[0]),
                mix(current[1], rgb[1]),
                mix(current[2], rgb[2]),
                0xFF,
            ],
        );
    }

    /// Clear the entire buffer to a single color
    pub fn clear(&mut self, rgba: [u8; 4]) {
        for chunk in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&rgba);
        }
    }

    /// Get the raw RGBA data
    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    /// Get mutable access to the raw RGBA data
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Mutable access to one row of RGBA data
    ///
    /// # Panics
    /// Panics if `y` is out of bounds
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(y < self.height, "row {} out of bounds", y);

        let stride = self.width as usize * BYTES_PER_PIXEL;
        let start = y as usize * stride;
        &mut self.pixels[start..start + stride]
    }

    /// Copy pixel data from another frame buffer
    ///
    /// # Panics
    /// Panics if the buffers have different dimensions
    pub fn copy_from(&mut self, other: &FrameBuffer) {
        assert!(
            self.width == other.width && self.height == other.height,
            "frame buffer dimensions do not match ({}x{} vs {}x{})",
            self.width,
            self.height,
            other.width,
            other.height
        );
        self.pixels.copy_from_slice(&other.pixels);
    }

    /// Fill the buffer with a diagnostic gradient
    ///
    /// Horizontal red ramp, vertical green ramp. Handy for verifying that a
    /// presentation path displays anything at all.
    pub fn test_pattern(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                let r = (x * 255 / self.width.max(1)) as u8;
                let g = (y * 255 / self.height.max(1)) as u8;
                self.set_pixel(x, y, [r, g, 0x40, 0xFF]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framebuffer_creation() {
        let fb = FrameBuffer::new(320, 240);
        assert_eq!(fb.width(), 320);
        assert_eq!(fb.height(), 240);
        assert_eq!(fb.as_slice().len(), 320 * 240 * BYTES_PER_PIXEL);
    }

    #[test]
    fn test_new_buffer_is_opaque_black() {
        let fb = FrameBuffer::new(4, 4);
        assert_eq!(fb.pixel(0, 0), [0, 0, 0, 0xFF]);
        assert_eq!(fb.pixel(3, 3), [0, 0, 0, 0xFF]);
    }

    #[test]
    fn test_set_get_pixel() {
        let mut fb = FrameBuffer::new(64, 64);
        fb.set_pixel(10, 20, [1, 2, 3, 0xFF]);
        assert_eq!(fb.pixel(10, 20), [1, 2, 3, 0xFF]);
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new(8, 8);
        fb.set_pixel(0, 0, [9, 9, 9, 0xFF]);
        fb.clear([5, 6, 7, 0xFF]);
        assert_eq!(fb.pixel(0, 0), [5, 6, 7, 0xFF]);
        assert_eq!(fb.pixel(7, 7), [5, 6, 7, 0xFF]);
    }

    #[test]
    fn test_blend_pixel_full_weight_replaces_color() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.blend_pixel(0, 0, [200, 100, 50], 1.0);
        assert_eq!(fb.pixel(0, 0), [200, 100, 50, 0xFF]);
    }

    #[test]
    fn test_blend_pixel_zero_weight_keeps_color() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.set_pixel(1, 1, [10, 20, 30, 0xFF]);
        fb.blend_pixel(1, 1, [200, 200, 200], 0.0);
        assert_eq!(fb.pixel(1, 1), [10, 20, 30, 0xFF]);
    }

    #[test]
    fn test_row_mut_stride() {
        let mut fb = FrameBuffer::new(3, 2);
        assert_eq!(fb.row_mut(1).len(), 3 * BYTES_PER_PIXEL);
        fb.row_mut(1)[0] = 0xAB;
        assert_eq!(fb.pixel(0, 1)[0], 0xAB);
    }

    #[test]
    fn test_copy_from() {
        let mut a = FrameBuffer::new(4, 4);
        let mut b = FrameBuffer::new(4, 4);
        b.set_pixel(2, 2, [7, 8, 9, 0xFF]);
        a.copy_from(&b);
        assert_eq!(a.pixel(2, 2), [7, 8, 9, 0xFF]);
    }

    #[test]
    #[should_panic]
    fn test_copy_from_mismatched_dimensions() {
        let mut a = FrameBuffer::new(4, 4);
        let b = FrameBuffer::new(8, 8);
        a.copy_from(&b);
    }

    #[test]
    #[should_panic]
    fn test_set_pixel_out_of_bounds_x() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.set_pixel(4, 0, [0, 0, 0, 0xFF]);
    }

    #[test]
    #[should_panic]
    fn test_set_pixel_out_of_bounds_y() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.set_pixel(0, 4, [0, 0, 0, 0xFF]);
    }
}
