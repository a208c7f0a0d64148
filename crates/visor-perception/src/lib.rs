//! `visor-perception` – pixel-stream algorithms.
//!
//! Turns the raw sample stream into drawable colors and edge coordinates.
//! Everything here is hardware-free: pure functions and small stateful
//! detectors fed one pixel at a time by the frame pipeline.
//!
//! # Modules
//!
//! - [`unpack`] – [`unpack`][unpack::unpack]: decode one packed sample into
//!   its reduced per-channel bits.
//! - [`edge_list`] – [`EdgeList`][edge_list::EdgeList]: bounded coordinate
//!   buffer with overwrite-at-capacity semantics.
//! - [`simple`] – [`SimpleEdgeDetector`][simple::SimpleEdgeDetector]:
//!   run-length detection along the scan direction.
//! - [`lookback`] – [`LookbackEdgeDetector`][lookback::LookbackEdgeDetector]:
//!   3×3 neighborhood detection over a sliding window of the last three
//!   completed rows.

pub mod edge_list;
pub mod lookback;
pub mod simple;
pub mod unpack;
