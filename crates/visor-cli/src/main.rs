//! `visor` – camera edge-view console.
//!
//! The binary wires the full stack together and starts the cooperative
//! scheduler:
//!
//! 1. Initialises structured logging from `RUST_LOG` (set
//!    `VISOR_LOG_FORMAT=json` for newline-delimited JSON logs).
//! 2. Loads boot defaults from `~/.visor/config.toml`, writing the file on
//!    first run.
//! 3. Builds the simulated device stack — capture source, framebuffer,
//!    sensor tuning stub — and the two long-lived tasks: the frame pipeline
//!    and the console command interpreter.
//! 4. Intercepts **Ctrl-C** to stop the scheduler after the current frame.

mod config;
mod console;
mod input;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use tracing::warn;

use visor_hal::sim::{FrameBuffer, SimCameraControl, SimCapture};
use visor_kernel::Scheduler;
use visor_runtime::{FramePipeline, FramePipelineConfig};
use visor_types::{FRAME_PIXELS, FRAME_WIDTH, SharedConfig};

use crate::console::ConsoleTask;
use crate::input::StdinCommandStream;

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // Operator-facing output stays on println! for UX consistency; the
    // pipeline and HAL log through tracing.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("VISOR_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Boot defaults ─────────────────────────────────────────────────────
    let boot = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let cfg = config::BootConfig::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} {}",
                    "✓ Default config written to".green(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Config error".red(), e),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {} – using defaults", "Config error".red(), e);
            config::BootConfig::default()
        }
    };

    let shared = Arc::new(SharedConfig::new(
        boot.mode,
        boot.consecutive_threshold,
        boot.dithering_gap,
    ));

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!(
            "{}",
            "⚠  Ctrl-C received – stopping after the current frame …"
                .yellow()
                .bold()
        );
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    // ── Device stack (simulated) ──────────────────────────────────────────
    let pipeline = FramePipeline::new(
        SimCapture::new(vec![demo_frame()]),
        FrameBuffer::new(),
        Arc::clone(&shared),
        FramePipelineConfig::default(),
    );
    let console = ConsoleTask::new(
        Arc::clone(&shared),
        SimCameraControl::new(),
        StdinCommandStream::spawn(),
    );

    println!(
        "  Streaming 640×480 frames in {} mode.",
        format!("{:?}", shared.mode()).bold()
    );
    println!(
        "  Command codes: {}  (Ctrl-C to exit)\n",
        "m e s r n d c b f l t".bold().cyan()
    );

    // ── Cooperative scheduler ─────────────────────────────────────────────
    let mut scheduler = Scheduler::new();
    scheduler.add_task(Box::new(pipeline));
    scheduler.add_task(Box::new(console));
    scheduler.run(&shutdown);

    println!("{}", "Goodbye.".green());
}

// ─────────────────────────────────────────────────────────────────────────────
// Demo scene
// ─────────────────────────────────────────────────────────────────────────────

/// Synthetic scene served by the simulated sensor: a bright field with a
/// dark rectangular outline, so every mode has something to show.
fn demo_frame() -> Vec<u8> {
    let mut frame = vec![0xFFu8; FRAME_PIXELS];
    for row in 120..360 {
        for col in 160..480 {
            let on_border = row < 124 || row >= 356 || col < 164 || col >= 476;
            if on_border {
                frame[row * FRAME_WIDTH + col] = 0x00;
            }
        }
    }
    frame
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#" _    ______________  ____ "#.bold().cyan());
    println!("{}", r#"| |  / /  _/ ___/ __ \/ __ \"#.bold().cyan());
    println!("{}", r#"| | / // / \__ \ / / / /_/ /"#.bold().cyan());
    println!("{}", r#"| |/ // / ___/ / /_/ / _, _/ "#.bold().cyan());
    println!("{}", r#"|___/___/____/\____/_/ |_|  "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "VISOR".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Camera edge-view console");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_frame_is_a_full_frame() {
        assert_eq!(demo_frame().len(), FRAME_PIXELS);
    }

    #[test]
    fn demo_frame_outline_is_dark_and_field_is_bright() {
        let frame = demo_frame();
        // Top border of the rectangle.
        assert_eq!(frame[121 * FRAME_WIDTH + 200], 0x00);
        // Interior of the rectangle.
        assert_eq!(frame[240 * FRAME_WIDTH + 320], 0xFF);
        // Outside the rectangle.
        assert_eq!(frame[10 * FRAME_WIDTH + 10], 0xFF);
    }
}
