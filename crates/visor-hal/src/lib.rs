//! `visor-hal` – injected hardware capability interfaces.
//!
//! The pipeline and console never touch hardware directly; they hold these
//! traits, so the full stack runs hardware-free in tests and CI.
//!
//! # Modules
//!
//! - [`capture`] – [`CaptureSource`][capture::CaptureSource]: the strict
//!   per-frame byte-stream protocol for obtaining samples from the image
//!   sensor, plus the power-on self tests.
//! - [`render`] – [`RenderTarget`][render::RenderTarget]: the fixed-geometry
//!   `draw(x, y, color)` raster contract.
//! - [`camera_control`] – [`CameraControl`][camera_control::CameraControl]:
//!   fire-and-forget sensor tuning writes (contrast, brightness,
//!   orientation, light mode, test pattern).
//! - [`sim`] – in-process simulation drivers for headless operation.

pub mod camera_control;
pub mod capture;
pub mod render;
pub mod sim;

pub use camera_control::CameraControl;
pub use capture::CaptureSource;
pub use render::RenderTarget;
