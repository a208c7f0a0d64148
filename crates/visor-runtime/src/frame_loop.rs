//! [`FramePipeline`] – the per-frame capture → stream → flush orchestrator.
//!
//! Each scheduler turn drives one full frame through the state machine
//! Idle → Capturing → Streaming → Flushing → Idle:
//!
//! 1. **Capturing** – the strict capture protocol: reset, begin, then a
//!    busy-wait on the completion flag.  The wait does not yield; the
//!    console cannot run until the frame finishes.
//! 2. **Streaming** – every sample is read exactly once in raster order,
//!    unpacked, mapped to its mirrored display coordinate, and dispatched
//!    on the mode *re-read per pixel* — a console mode change lands
//!    mid-frame and the remaining pixels are processed under the new mode.
//! 3. **Flushing** – edge modes only: the display is cleared to BLACK, the
//!    accumulated edge coordinates are drawn WHITE, and the edge buffer and
//!    row window are reset.  Color and RawThreshold drew incrementally and
//!    skip this phase.
//!
//! The first turn additionally runs sensor bring-up: the capture-bus
//! self-test and the identity probe, each retried forever with a fixed
//! delay.  A sensor that never answers blocks the pipeline — and with it
//! the whole device — indefinitely; there is no escalation path.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use visor_hal::sim::{FrameBuffer, SimCapture};
//! use visor_runtime::frame_loop::{FramePipeline, FramePipelineConfig};
//! use visor_types::{Mode, SharedConfig};
//!
//! let config = Arc::new(SharedConfig::new(Mode::RawThreshold, 4, 3));
//! let mut pipeline = FramePipeline::new(
//!     SimCapture::uniform(0x00),
//!     FrameBuffer::new(),
//!     config,
//!     FramePipelineConfig::for_tests(),
//! );
//! pipeline.run_frame();
//! assert_eq!(pipeline.frames_completed(), 1);
//! ```

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use visor_hal::capture::CaptureSource;
use visor_hal::render::RenderTarget;
use visor_kernel::Task;
use visor_perception::edge_list::{EDGE_CAPACITY, EdgeList};
use visor_perception::lookback::LookbackEdgeDetector;
use visor_perception::simple::SimpleEdgeDetector;
use visor_perception::unpack::unpack;
use visor_types::{BLACK, FRAME_HEIGHT, FRAME_WIDTH, Mode, SharedConfig, WHITE, mirrored};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration bundle for [`FramePipeline`].
#[derive(Debug, Clone)]
pub struct FramePipelineConfig {
    /// Bounded pause after each completed frame, before the task yields.
    pub frame_pause: Duration,
    /// Fixed delay between sensor bring-up retries.
    pub retry_delay: Duration,
    /// Capacity of the edge coordinate buffer.
    pub edge_capacity: usize,
}

impl Default for FramePipelineConfig {
    fn default() -> Self {
        Self {
            frame_pause: Duration::from_millis(5),
            retry_delay: Duration::from_secs(1),
            edge_capacity: EDGE_CAPACITY,
        }
    }
}

impl FramePipelineConfig {
    /// Zero-delay variant so tests run at full speed.
    pub fn for_tests() -> Self {
        Self {
            frame_pause: Duration::ZERO,
            retry_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame phases
// ─────────────────────────────────────────────────────────────────────────────

/// Phase of the per-frame state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Idle,
    Capturing,
    Streaming,
    Flushing,
}

// ─────────────────────────────────────────────────────────────────────────────
// FramePipeline
// ─────────────────────────────────────────────────────────────────────────────

/// The frame orchestrator task.
///
/// Owns the injected capture and render capabilities, both edge detectors,
/// and the shared edge buffer.  Implements [`Task`]; one step is one frame.
pub struct FramePipeline<C: CaptureSource, R: RenderTarget> {
    capture: C,
    display: R,
    config: Arc<SharedConfig>,
    simple: SimpleEdgeDetector,
    lookback: LookbackEdgeDetector,
    edges: EdgeList,
    phase: FramePhase,
    sensor_ready: bool,
    frame_pause: Duration,
    retry_delay: Duration,
    frames_completed: u64,
}

impl<C: CaptureSource, R: RenderTarget> FramePipeline<C, R> {
    pub fn new(
        capture: C,
        display: R,
        config: Arc<SharedConfig>,
        pipeline_config: FramePipelineConfig,
    ) -> Self {
        Self {
            capture,
            display,
            config,
            simple: SimpleEdgeDetector::new(),
            lookback: LookbackEdgeDetector::new(),
            edges: EdgeList::new(pipeline_config.edge_capacity),
            phase: FramePhase::Idle,
            sensor_ready: false,
            frame_pause: pipeline_config.frame_pause,
            retry_delay: pipeline_config.retry_delay,
            frames_completed: 0,
        }
    }

    /// Current phase of the state machine.
    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Number of frames fully processed since construction.
    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    /// The injected render target, for inspection.
    pub fn display(&self) -> &R {
        &self.display
    }

    // -------------------------------------------------------------------------
    // One frame
    // -------------------------------------------------------------------------

    /// Drive one full frame through capture, streaming, and flush.
    pub fn run_frame(&mut self) {
        if !self.sensor_ready {
            self.bring_up();
        }

        // ── Capturing ─────────────────────────────────────────────────────────
        self.phase = FramePhase::Capturing;
        self.capture.reset_ready();
        self.capture.begin_capture();
        // Blocking poll with no timeout: a dead sensor parks the device here.
        while !self.capture.capture_complete() {}
        let length = self.capture.frame_len();

        // ── Streaming ─────────────────────────────────────────────────────────
        self.phase = FramePhase::Streaming;
        let mode_at_start = self.config.mode();
        if mode_at_start == Mode::LookbackEdge {
            self.lookback.reset();
        }
        if mode_at_start.is_edge() {
            self.edges.clear();
        }

        for index in 0..length {
            let color = unpack(self.capture.read_byte());
            match self.config.mode() {
                Mode::Color => {
                    let (x, y) = mirrored(index);
                    self.display.draw(x, y, color.packed());
                }
                Mode::RawThreshold => {
                    let (x, y) = mirrored(index);
                    let packed = if color.is_dark() { WHITE } else { BLACK };
                    self.display.draw(x, y, packed);
                }
                Mode::SimpleEdge => {
                    self.simple.observe(
                        index,
                        color.is_dark(),
                        self.config.consecutive_threshold(),
                        &mut self.edges,
                    );
                }
                Mode::LookbackEdge => {
                    self.lookback.observe(
                        index,
                        color.is_dark(),
                        self.config.consecutive_threshold(),
                        self.config.dithering_gap(),
                        &mut self.edges,
                    );
                }
            }
        }

        // ── Flushing ──────────────────────────────────────────────────────────
        self.phase = FramePhase::Flushing;
        let mode_at_end = self.config.mode();
        if mode_at_end.is_edge() {
            self.flush(mode_at_end);
        }

        self.phase = FramePhase::Idle;
        self.frames_completed += 1;
        debug!(
            frame = self.frames_completed,
            samples = length,
            mode = ?mode_at_end,
            "frame complete"
        );
    }

    /// Clear the display to BLACK, draw every buffered edge WHITE, then
    /// reset the edge buffer (and the row window in lookback mode).
    fn flush(&mut self, mode: Mode) {
        for x in 0..FRAME_WIDTH as u32 {
            for y in 0..FRAME_HEIGHT as u32 {
                self.display.draw(x, y, BLACK);
            }
        }
        for (x, y) in self.edges.iter() {
            self.display.draw(x as u32, y as u32, WHITE);
        }
        debug!(edges = self.edges.len(), "edge flush");
        self.edges.clear();
        if mode == Mode::LookbackEdge {
            self.lookback.reset();
        }
    }

    // -------------------------------------------------------------------------
    // Sensor bring-up
    // -------------------------------------------------------------------------

    /// Run the capture-bus self-test and the sensor identity probe, each
    /// retried forever with the fixed delay.  Never escalates.
    fn bring_up(&mut self) {
        loop {
            match self.capture.bus_self_test() {
                Ok(()) => {
                    info!("capture bus self-test OK");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "capture bus self-test failed, retrying");
                    thread::sleep(self.retry_delay);
                }
            }
        }
        loop {
            match self.capture.probe_identity() {
                Ok(()) => {
                    info!("image sensor detected");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "sensor probe failed, retrying");
                    thread::sleep(self.retry_delay);
                }
            }
        }
        self.sensor_ready = true;
    }
}

impl<C: CaptureSource, R: RenderTarget> Task for FramePipeline<C, R> {
    fn name(&self) -> &str {
        "frame_pipeline"
    }

    fn step(&mut self) {
        self.run_frame();
        // The one yield point: a short bounded pause per completed frame.
        if !self.frame_pause.is_zero() {
            thread::sleep(self.frame_pause);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
