use std::sync::atomic::{AtomicI32, AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Frame geometry
// ────────────────────────────────────────────────────────────────────────────

/// Fixed raster width in pixels. No other resolution is supported.
pub const FRAME_WIDTH: usize = 640;

/// Fixed raster height in pixels.
pub const FRAME_HEIGHT: usize = 480;

/// Samples per frame (one packed byte per pixel).
pub const FRAME_PIXELS: usize = FRAME_WIDTH * FRAME_HEIGHT;

/// All-set 3-bit packed color.
pub const WHITE: u8 = 0b111;

/// All-clear 3-bit packed color.
pub const BLACK: u8 = 0b000;

/// Map a linear scan index to its mirrored display coordinate.
///
/// The sensor streams raster order top-left first while the display is
/// driven bottom-right first, so every index is flipped both horizontally
/// and vertically: `x = 640 − (i mod 640)`, `y = 480 − ⌊i / 640⌋`.
///
/// The result lands in `[1, 640] × [1, 480]`; render targets clip the
/// out-of-range column 640 and row 480.
pub fn mirrored(index: usize) -> (u32, u32) {
    (
        (FRAME_WIDTH - index % FRAME_WIDTH) as u32,
        (FRAME_HEIGHT - index / FRAME_WIDTH) as u32,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Mode
// ────────────────────────────────────────────────────────────────────────────

/// Operator-selectable processing mode for the frame pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Draw every pixel's reduced color directly, no buffering.
    Color,
    /// Draw dark pixels WHITE and everything else BLACK, no buffering.
    RawThreshold,
    /// Run-length edge detection along the scan direction.
    SimpleEdge,
    /// 3×3 neighborhood edge detection over a 3-row sliding window.
    LookbackEdge,
}

impl Mode {
    /// `true` for the modes that accumulate coordinates into the edge buffer
    /// and flush at frame end instead of drawing per pixel.
    pub fn is_edge(self) -> bool {
        matches!(self, Mode::SimpleEdge | Mode::LookbackEdge)
    }

    fn to_bits(self) -> u8 {
        match self {
            Mode::Color => 0,
            Mode::RawThreshold => 1,
            Mode::SimpleEdge => 2,
            Mode::LookbackEdge => 3,
        }
    }

    fn from_bits(bits: u8) -> Mode {
        match bits {
            0 => Mode::Color,
            1 => Mode::RawThreshold,
            2 => Mode::SimpleEdge,
            _ => Mode::LookbackEdge,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Camera tuning values
// ────────────────────────────────────────────────────────────────────────────

/// Sensor contrast setting: nine discrete steps from +4 down to −4.
///
/// Console digit 0 selects the strongest positive step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContrastLevel(pub i8);

impl ContrastLevel {
    /// Map a console digit 0–8 onto the +4…−4 scale.
    pub fn from_digit(digit: u8) -> Option<Self> {
        (digit <= 8).then(|| Self(4 - digit as i8))
    }
}

/// Sensor brightness setting: nine discrete steps from +4 down to −4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightnessLevel(pub i8);

impl BrightnessLevel {
    /// Map a console digit 0–8 onto the +4…−4 scale.
    pub fn from_digit(digit: u8) -> Option<Self> {
        (digit <= 8).then(|| Self(4 - digit as i8))
    }
}

/// Sensor readout orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Mirror,
    Flip,
    MirrorFlip,
    Normal,
}

impl Orientation {
    /// Map a console digit 0–3 onto an orientation.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(Orientation::Mirror),
            1 => Some(Orientation::Flip),
            2 => Some(Orientation::MirrorFlip),
            3 => Some(Orientation::Normal),
            _ => None,
        }
    }
}

/// Sensor white-balance / light mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightMode {
    AdvancedAwb,
    SimpleAwb,
    ManualDay,
    ManualA,
    ManualCwf,
    ManualCloudy,
}

impl LightMode {
    /// Map a console digit 0–5 onto a light mode.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(LightMode::AdvancedAwb),
            1 => Some(LightMode::SimpleAwb),
            2 => Some(LightMode::ManualDay),
            3 => Some(LightMode::ManualA),
            4 => Some(LightMode::ManualCwf),
            5 => Some(LightMode::ManualCloudy),
            _ => None,
        }
    }
}

/// Sensor-generated test pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestPattern {
    ColorBar,
    ColorSquare,
    BwSquare,
    Dli,
}

impl TestPattern {
    /// Map a console digit 0–3 onto a test pattern.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(TestPattern::ColorBar),
            1 => Some(TestPattern::ColorSquare),
            2 => Some(TestPattern::BwSquare),
            3 => Some(TestPattern::Dli),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Global error type spanning capture-bus faults and sensor bring-up
/// failures.
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum VisorError {
    #[error("Capture bus self-test failed on {component}: {details}")]
    BusSelfTest { component: String, details: String },

    #[error("Sensor identity mismatch: expected {expected}, found {found}")]
    SensorIdentity { expected: String, found: String },

    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },
}

// ────────────────────────────────────────────────────────────────────────────
// SharedConfig
// ────────────────────────────────────────────────────────────────────────────

/// Runtime configuration shared between the console task and the frame
/// pipeline.
///
/// Each field is an independent relaxed atomic: a reader sees an update to a
/// field the next time it happens to load that field, and there is no
/// consistent snapshot across fields.  A frame that straddles a console
/// update may observe the old mode together with the new threshold; that
/// tearing is accepted contract, and callers must not assume cross-field
/// coherence.  The pipeline re-reads the mode once per pixel, so a mode
/// change lands mid-frame.
#[derive(Debug)]
pub struct SharedConfig {
    mode: AtomicU8,
    consecutive_threshold: AtomicI32,
    dithering_gap: AtomicI32,
}

impl SharedConfig {
    pub fn new(mode: Mode, consecutive_threshold: i32, dithering_gap: i32) -> Self {
        Self {
            mode: AtomicU8::new(mode.to_bits()),
            consecutive_threshold: AtomicI32::new(consecutive_threshold),
            dithering_gap: AtomicI32::new(dithering_gap),
        }
    }

    pub fn mode(&self) -> Mode {
        Mode::from_bits(self.mode.load(Ordering::Relaxed))
    }

    pub fn set_mode(&self, mode: Mode) {
        self.mode.store(mode.to_bits(), Ordering::Relaxed);
    }

    /// Detector sensitivity: run length for the simple detector, neighborhood
    /// sum for the lookback detector.  Stored unvalidated.
    pub fn consecutive_threshold(&self) -> i32 {
        self.consecutive_threshold.load(Ordering::Relaxed)
    }

    pub fn set_consecutive_threshold(&self, value: i32) {
        self.consecutive_threshold.store(value, Ordering::Relaxed);
    }

    /// Minimum candidate spacing enforced within one row-scan of the
    /// lookback detector.  Stored unvalidated.
    pub fn dithering_gap(&self) -> i32 {
        self.dithering_gap.load(Ordering::Relaxed)
    }

    pub fn set_dithering_gap(&self, value: i32) {
        self.dithering_gap.store(value, Ordering::Relaxed);
    }
}

impl Default for SharedConfig {
    /// Power-on defaults: color pass-through, threshold 7, gap 3.
    fn default() -> Self {
        Self::new(Mode::Color, 7, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_serialization_roundtrip() {
        for mode in [
            Mode::Color,
            Mode::RawThreshold,
            Mode::SimpleEdge,
            Mode::LookbackEdge,
        ] {
            let json = serde_json::to_string(&mode).unwrap();
            let back: Mode = serde_json::from_str(&json).unwrap();
            assert_eq!(mode, back);
        }
    }

    #[test]
    fn mode_serializes_snake_case() {
        let json = serde_json::to_string(&Mode::LookbackEdge).unwrap();
        assert_eq!(json, "\"lookback_edge\"");
    }

    #[test]
    fn edge_modes_are_flagged() {
        assert!(Mode::SimpleEdge.is_edge());
        assert!(Mode::LookbackEdge.is_edge());
        assert!(!Mode::Color.is_edge());
        assert!(!Mode::RawThreshold.is_edge());
    }

    #[test]
    fn mirrored_is_injective_over_one_frame() {
        let mut seen = vec![false; (FRAME_WIDTH + 1) * (FRAME_HEIGHT + 1)];
        for index in 0..FRAME_PIXELS {
            let (x, y) = mirrored(index);
            let slot = y as usize * (FRAME_WIDTH + 1) + x as usize;
            assert!(!seen[slot], "index {index} collides at ({x}, {y})");
            seen[slot] = true;
        }
    }

    #[test]
    fn mirrored_covers_the_flipped_range() {
        // First sample lands at the far corner, last at (1, 1).
        assert_eq!(mirrored(0), (640, 480));
        assert_eq!(mirrored(FRAME_PIXELS - 1), (1, 1));
        for index in 0..FRAME_PIXELS {
            let (x, y) = mirrored(index);
            assert!((1..=640).contains(&x));
            assert!((1..=480).contains(&y));
        }
    }

    #[test]
    fn contrast_digit_mapping_spans_plus4_to_minus4() {
        assert_eq!(ContrastLevel::from_digit(0), Some(ContrastLevel(4)));
        assert_eq!(ContrastLevel::from_digit(4), Some(ContrastLevel(0)));
        assert_eq!(ContrastLevel::from_digit(8), Some(ContrastLevel(-4)));
        assert_eq!(ContrastLevel::from_digit(9), None);
    }

    #[test]
    fn brightness_digit_mapping_spans_plus4_to_minus4() {
        assert_eq!(BrightnessLevel::from_digit(0), Some(BrightnessLevel(4)));
        assert_eq!(BrightnessLevel::from_digit(8), Some(BrightnessLevel(-4)));
        assert_eq!(BrightnessLevel::from_digit(255), None);
    }

    #[test]
    fn orientation_digits() {
        assert_eq!(Orientation::from_digit(0), Some(Orientation::Mirror));
        assert_eq!(Orientation::from_digit(3), Some(Orientation::Normal));
        assert_eq!(Orientation::from_digit(4), None);
    }

    #[test]
    fn light_mode_digits() {
        assert_eq!(LightMode::from_digit(0), Some(LightMode::AdvancedAwb));
        assert_eq!(LightMode::from_digit(5), Some(LightMode::ManualCloudy));
        assert_eq!(LightMode::from_digit(6), None);
    }

    #[test]
    fn test_pattern_digits() {
        assert_eq!(TestPattern::from_digit(0), Some(TestPattern::ColorBar));
        assert_eq!(TestPattern::from_digit(3), Some(TestPattern::Dli));
        assert_eq!(TestPattern::from_digit(4), None);
    }

    #[test]
    fn shared_config_defaults_match_power_on_state() {
        let cfg = SharedConfig::default();
        assert_eq!(cfg.mode(), Mode::Color);
        assert_eq!(cfg.consecutive_threshold(), 7);
        assert_eq!(cfg.dithering_gap(), 3);
    }

    #[test]
    fn shared_config_fields_update_independently() {
        let cfg = SharedConfig::default();
        cfg.set_consecutive_threshold(42);
        assert_eq!(cfg.mode(), Mode::Color);
        assert_eq!(cfg.consecutive_threshold(), 42);
        assert_eq!(cfg.dithering_gap(), 3);

        cfg.set_mode(Mode::SimpleEdge);
        assert_eq!(cfg.mode(), Mode::SimpleEdge);
        assert_eq!(cfg.consecutive_threshold(), 42);
    }

    #[test]
    fn shared_config_accepts_unvalidated_values() {
        // Garbage tuning values are stored as-is; the detectors simply stop
        // matching rather than rejecting the write.
        let cfg = SharedConfig::default();
        cfg.set_consecutive_threshold(-17);
        cfg.set_dithering_gap(0);
        assert_eq!(cfg.consecutive_threshold(), -17);
        assert_eq!(cfg.dithering_gap(), 0);
    }

    #[test]
    fn visor_error_display() {
        let err = VisorError::BusSelfTest {
            component: "capture_bus".to_string(),
            details: "test register read back 0x00".to_string(),
        };
        assert!(err.to_string().contains("self-test failed"));

        let err2 = VisorError::SensorIdentity {
            expected: "0x5642".to_string(),
            found: "0x0000".to_string(),
        };
        assert!(err2.to_string().contains("0x5642"));
    }
}
