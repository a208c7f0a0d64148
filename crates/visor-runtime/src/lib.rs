//! `visor-runtime` – the frame orchestrator.
//!
//! Hosts [`FramePipeline`][frame_loop::FramePipeline], the cooperative task
//! that drives one full frame — capture, per-pixel dispatch, edge flush —
//! per scheduler turn.

pub mod frame_loop;

pub use frame_loop::{FramePhase, FramePipeline, FramePipelineConfig};
