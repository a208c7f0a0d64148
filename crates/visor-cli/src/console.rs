//! Console command interpreter task.
//!
//! Single-character command codes, case-sensitive (first character of the
//! input line):
//!   m – toggle color pass-through on/off
//!   e – lookback edge detection (threshold reset to 7)
//!   s – simple edge detection (threshold reset to 4)
//!   r – raw threshold view (edge detection off)
//!   n – set the consecutive threshold
//!   d – set the dithering gap
//!   c – contrast 0-8          (forwarded to the sensor)
//!   b – brightness 0-8        (forwarded to the sensor)
//!   f – mirror / flip 0-3     (forwarded to the sensor)
//!   l – light mode 0-5        (forwarded to the sensor)
//!   t – test pattern 0-3      (forwarded to the sensor)
//!
//! Anything else is a no-op.  Commands that take an argument print their
//! prompt and consume the next line; the task handles at most one line per
//! scheduler step, so it yields between prompt and answer.

use std::io::{self, Write};
use std::sync::Arc;

use colored::Colorize;

use visor_hal::camera_control::CameraControl;
use visor_kernel::Task;
use visor_types::{
    BrightnessLevel, ContrastLevel, LightMode, Mode, Orientation, SharedConfig, TestPattern,
};

use crate::input::CommandStream;

/// Argument-consuming state of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Threshold,
    Gap,
    Contrast,
    Brightness,
    Orientation,
    LightMode,
    TestPattern,
}

/// The command interpreter: owns the shared runtime configuration and the
/// sensor tuning interface, polls the input shell, and yields whenever no
/// line is waiting.
pub struct ConsoleTask<S: CommandStream, C: CameraControl> {
    config: Arc<SharedConfig>,
    camera: C,
    input: S,
    pending: Option<Pending>,
    prompted: bool,
}

impl<S: CommandStream, C: CameraControl> ConsoleTask<S, C> {
    pub fn new(config: Arc<SharedConfig>, camera: C, input: S) -> Self {
        Self {
            config,
            camera,
            input,
            pending: None,
            prompted: false,
        }
    }

    /// The tuning interface, for inspection.
    pub fn camera(&self) -> &C {
        &self.camera
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Prompts
    // ─────────────────────────────────────────────────────────────────────────

    fn print_prompt(&self) {
        match self.pending {
            None => print!("{} ", "Input command code:".bold()),
            Some(Pending::Threshold) => print!("Input new consecutive threshold: "),
            Some(Pending::Gap) => print!("Input new number between 2 solids: "),
            Some(Pending::Contrast) => print!("Input new contrast value 0-8: "),
            Some(Pending::Brightness) => print!("Input new brightness value 0-8: "),
            Some(Pending::Orientation) => {
                print!("Input 0 for mirror, 1 for flip, 2 for mirror flip, or 3 for normal: ")
            }
            Some(Pending::LightMode) => {
                println!("Input new light setting value 0-5:");
                print!(
                    "0 = advanced AWB, 1 = simple AWB, 2 = manual day, 3 = manual A, \
                     4 = manual CWF, 5 = manual cloudy: "
                );
            }
            Some(Pending::TestPattern) => {
                print!("Input test pattern 0=color_bar, 1=color_square, 2=BW_square, 3=DLI: ")
            }
        }
        io::stdout().flush().ok();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_command(&mut self, code: char) {
        match code {
            'm' => {
                // Toggling color off lands on the raw view: selecting color
                // always disables edge detection, so there is no previous
                // edge mode to return to.
                let next = if self.config.mode() == Mode::Color {
                    Mode::RawThreshold
                } else {
                    Mode::Color
                };
                self.config.set_mode(next);
                self.announce_mode(next);
            }
            'e' => {
                self.config.set_mode(Mode::LookbackEdge);
                self.config.set_consecutive_threshold(7);
                self.announce_mode(Mode::LookbackEdge);
            }
            's' => {
                self.config.set_mode(Mode::SimpleEdge);
                self.config.set_consecutive_threshold(4);
                self.announce_mode(Mode::SimpleEdge);
            }
            'r' => {
                self.config.set_mode(Mode::RawThreshold);
                self.announce_mode(Mode::RawThreshold);
            }
            'n' => self.pending = Some(Pending::Threshold),
            'd' => self.pending = Some(Pending::Gap),
            'c' => self.pending = Some(Pending::Contrast),
            'b' => self.pending = Some(Pending::Brightness),
            'f' => self.pending = Some(Pending::Orientation),
            'l' => self.pending = Some(Pending::LightMode),
            't' => self.pending = Some(Pending::TestPattern),
            _ => {} // unrecognized codes are a no-op
        }
    }

    fn handle_value(&mut self, pending: Pending, line: &str) {
        match pending {
            // Numeric values are stored exactly as parsed, sign and all; a
            // line that does not parse keeps the previous value.
            Pending::Threshold => {
                if let Ok(value) = line.trim().parse::<i32>() {
                    self.config.set_consecutive_threshold(value);
                    println!("  {} {}", "threshold set to".green(), value);
                }
            }
            Pending::Gap => {
                if let Ok(value) = line.trim().parse::<i32>() {
                    self.config.set_dithering_gap(value);
                    println!("  {} {}", "dithering gap set to".green(), value);
                }
            }
            Pending::Contrast => {
                if let Some(level) = first_digit(line).and_then(ContrastLevel::from_digit) {
                    self.camera.set_contrast(level);
                }
            }
            Pending::Brightness => {
                if let Some(level) = first_digit(line).and_then(BrightnessLevel::from_digit) {
                    self.camera.set_brightness(level);
                }
            }
            Pending::Orientation => {
                if let Some(orientation) = first_digit(line).and_then(Orientation::from_digit) {
                    self.camera.set_orientation(orientation);
                }
            }
            Pending::LightMode => {
                if let Some(mode) = first_digit(line).and_then(LightMode::from_digit) {
                    self.camera.set_light_mode(mode);
                }
            }
            Pending::TestPattern => {
                if let Some(pattern) = first_digit(line).and_then(TestPattern::from_digit) {
                    self.camera.set_test_pattern(pattern);
                }
            }
        }
    }

    fn announce_mode(&self, mode: Mode) {
        let label = match mode {
            Mode::Color => "color pass-through",
            Mode::RawThreshold => "raw threshold view",
            Mode::SimpleEdge => "simple edge detection (threshold 4)",
            Mode::LookbackEdge => "lookback edge detection (threshold 7)",
        };
        println!("  {} {}", "mode:".green(), label);
    }
}

/// First character of the line as a decimal digit, if it is one.
fn first_digit(line: &str) -> Option<u8> {
    line.trim()
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as u8)
}

impl<S: CommandStream, C: CameraControl> Task for ConsoleTask<S, C> {
    fn name(&self) -> &str {
        "console"
    }

    fn step(&mut self) {
        if !self.prompted {
            self.print_prompt();
            self.prompted = true;
        }
        // Yield whenever the operator has not typed anything yet.
        let Some(line) = self.input.poll_line() else {
            return;
        };
        self.prompted = false;
        match self.pending.take() {
            None => {
                if let Some(code) = line.chars().next() {
                    self.handle_command(code);
                }
            }
            Some(pending) => self.handle_value(pending, &line),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
