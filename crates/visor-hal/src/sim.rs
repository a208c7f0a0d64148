//! In-process simulation drivers for headless operation.
//!
//! Stub implementations of every hardware capability, so the full stack —
//! scheduler, pipeline, console — runs in tests and CI without a sensor or
//! a display attached.  [`SimCapture`] serves caller-supplied frames,
//! [`FrameBuffer`] is an inspectable in-memory raster, and
//! [`SimCameraControl`] records the most recent value of every tuning write.
//!
//! # Example
//!
//! ```rust
//! use visor_hal::capture::CaptureSource;
//! use visor_hal::sim::SimCapture;
//!
//! let mut cap = SimCapture::new(vec![vec![0u8; 16]]);
//! cap.reset_ready();
//! cap.begin_capture();
//! assert!(cap.capture_complete());
//! assert_eq!(cap.frame_len(), 16);
//! ```

use tracing::trace;
use visor_types::{
    BrightnessLevel, ContrastLevel, FRAME_HEIGHT, FRAME_WIDTH, LightMode, Orientation,
    TestPattern, VisorError,
};

use crate::camera_control::CameraControl;
use crate::capture::CaptureSource;
use crate::render::RenderTarget;

// ────────────────────────────────────────────────────────────────────────────
// SimCapture
// ────────────────────────────────────────────────────────────────────────────

/// A simulated capture source cycling through a fixed list of frames.
///
/// Both power-on self tests always pass and a capture is complete
/// immediately after [`begin_capture`][CaptureSource::begin_capture].
/// Reading past the reported frame length yields zeros, mirroring a drained
/// hardware FIFO.
pub struct SimCapture {
    frames: Vec<Vec<u8>>,
    next_frame: usize,
    current: Vec<u8>,
    cursor: usize,
    complete: bool,
}

impl SimCapture {
    /// Create a source that serves `frames` in a round-robin cycle.
    ///
    /// # Panics
    ///
    /// Panics if `frames` is empty.
    pub fn new(frames: Vec<Vec<u8>>) -> Self {
        assert!(!frames.is_empty(), "SimCapture needs at least one frame");
        Self {
            frames,
            next_frame: 0,
            current: Vec::new(),
            cursor: 0,
            complete: false,
        }
    }

    /// Create a source that serves one full frame of a single repeated
    /// sample value.
    pub fn uniform(sample: u8) -> Self {
        Self::new(vec![vec![sample; visor_types::FRAME_PIXELS]])
    }
}

impl CaptureSource for SimCapture {
    fn bus_self_test(&mut self) -> Result<(), VisorError> {
        Ok(())
    }

    fn probe_identity(&mut self) -> Result<(), VisorError> {
        Ok(())
    }

    fn reset_ready(&mut self) {
        self.cursor = 0;
        self.complete = false;
    }

    fn begin_capture(&mut self) {
        self.current = self.frames[self.next_frame].clone();
        self.next_frame = (self.next_frame + 1) % self.frames.len();
        self.complete = true;
        trace!(len = self.current.len(), "sim capture armed");
    }

    fn capture_complete(&self) -> bool {
        self.complete
    }

    fn frame_len(&self) -> usize {
        self.current.len()
    }

    fn read_byte(&mut self) -> u8 {
        let byte = self.current.get(self.cursor).copied().unwrap_or(0);
        self.cursor += 1;
        byte
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FrameBuffer
// ────────────────────────────────────────────────────────────────────────────

/// An in-memory 640×480 raster implementing [`RenderTarget`].
///
/// Starts all-BLACK.  Out-of-range draws are silently clipped, as the
/// render contract requires.
pub struct FrameBuffer {
    pixels: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![visor_types::BLACK; FRAME_WIDTH * FRAME_HEIGHT],
        }
    }

    /// Packed color at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if (x as usize) < FRAME_WIDTH && (y as usize) < FRAME_HEIGHT {
            Some(self.pixels[y as usize * FRAME_WIDTH + x as usize])
        } else {
            None
        }
    }

    /// Number of pixels currently holding the given packed color.
    pub fn count_matching(&self, color: u8) -> usize {
        self.pixels.iter().filter(|&&p| p == color).count()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTarget for FrameBuffer {
    fn draw(&mut self, x: u32, y: u32, color: u8) {
        if (x as usize) < FRAME_WIDTH && (y as usize) < FRAME_HEIGHT {
            self.pixels[y as usize * FRAME_WIDTH + x as usize] = color;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimCameraControl
// ────────────────────────────────────────────────────────────────────────────

/// A simulated tuning interface that records the most recent value of every
/// write, so tests can assert on command forwarding.
#[derive(Debug, Default)]
pub struct SimCameraControl {
    contrast: Option<ContrastLevel>,
    brightness: Option<BrightnessLevel>,
    orientation: Option<Orientation>,
    light_mode: Option<LightMode>,
    test_pattern: Option<TestPattern>,
}

impl SimCameraControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contrast(&self) -> Option<ContrastLevel> {
        self.contrast
    }

    pub fn brightness(&self) -> Option<BrightnessLevel> {
        self.brightness
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.orientation
    }

    pub fn light_mode(&self) -> Option<LightMode> {
        self.light_mode
    }

    pub fn test_pattern(&self) -> Option<TestPattern> {
        self.test_pattern
    }
}

impl CameraControl for SimCameraControl {
    fn set_contrast(&mut self, level: ContrastLevel) {
        trace!(?level, "sim camera contrast");
        self.contrast = Some(level);
    }

    fn set_brightness(&mut self, level: BrightnessLevel) {
        trace!(?level, "sim camera brightness");
        self.brightness = Some(level);
    }

    fn set_orientation(&mut self, orientation: Orientation) {
        trace!(?orientation, "sim camera orientation");
        self.orientation = Some(orientation);
    }

    fn set_light_mode(&mut self, mode: LightMode) {
        trace!(?mode, "sim camera light mode");
        self.light_mode = Some(mode);
    }

    fn set_test_pattern(&mut self, pattern: TestPattern) {
        trace!(?pattern, "sim camera test pattern");
        self.test_pattern = Some(pattern);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
