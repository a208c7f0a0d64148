//! [`LookbackEdgeDetector`] – 3×3 neighborhood edge detection.
//!
//! Keeps a sliding window of the three most recently completed rows of
//! dark flags.  Each time a row completes (past the initial fill), the
//! interior columns of the middle row are scanned: a column whose eight
//! surrounding flags sum above the threshold is an edge candidate, and
//! candidates are thinned by a minimum-gap counter so a thick contour does
//! not flood the edge buffer.

use tracing::trace;
use visor_types::{FRAME_HEIGHT, FRAME_WIDTH};

use crate::edge_list::EdgeList;

// TODO: both boundary constants below use a 639-sample stride, so the
// first-pass cutoff and the row-completion check fire one pixel short of a
// true 640-sample row and drift by one column per row; revisit the two
// together, since the flushed output shifts if either moves alone.

/// Stream index at which the window holds three rows and scanning begins.
const FIRST_PASS_END: usize = 3 * (FRAME_WIDTH - 1);

/// Row-completion stride.
const ROW_STRIDE: usize = FRAME_WIDTH - 1;

/// Sliding-window edge detector over the last three completed rows.
///
/// Owns the row window exclusively; the window must be [`reset`][Self::reset]
/// at the start of every frame the detector is active for.
pub struct LookbackEdgeDetector {
    rows: [[bool; FRAME_WIDTH]; 3],
}

impl LookbackEdgeDetector {
    pub fn new() -> Self {
        Self {
            rows: [[false; FRAME_WIDTH]; 3],
        }
    }

    /// Clear the whole window to "not dark".
    pub fn reset(&mut self) {
        self.rows = [[false; FRAME_WIDTH]; 3];
    }

    /// Feed one pixel at stream `index`.
    ///
    /// During the first pass the flag lands in its own row of the window;
    /// afterwards every flag lands in the bottom row.  Completing a row past
    /// the first pass scans the window and shifts it up one row.
    pub fn observe(
        &mut self,
        index: usize,
        dark: bool,
        threshold: i32,
        gap: i32,
        edges: &mut EdgeList,
    ) {
        let first_pass = index < FIRST_PASS_END;
        let column = index % FRAME_WIDTH;
        if first_pass {
            self.rows[index / FRAME_WIDTH][column] = dark;
        } else {
            self.rows[2][column] = dark;
        }

        if !first_pass && index % ROW_STRIDE == 0 {
            self.scan_row(index, threshold, gap, edges);
            self.shift_up();
        }
    }

    /// Scan the interior columns of the window's middle row for edges.
    ///
    /// The gap counter records a candidate only at zero, counts every
    /// further candidate, and rearms either after `gap` candidates or on the
    /// first non-candidate column — so the spacing guarantee only holds
    /// inside an unbroken candidate run.  The counter does not persist
    /// beyond this scan.
    fn scan_row(&self, index: usize, threshold: i32, gap: i32, edges: &mut EdgeList) {
        let y = (FRAME_HEIGHT - index / FRAME_WIDTH) as u16;
        let mut since_recorded: i32 = 0;
        for column in 1..=FRAME_WIDTH - 2 {
            if self.neighbor_sum(column) > threshold {
                if since_recorded == 0 {
                    edges.push(column as u16, y);
                    since_recorded += 1;
                } else {
                    since_recorded += 1;
                    if since_recorded >= gap {
                        since_recorded = 0;
                    }
                }
            } else {
                since_recorded = 0;
            }
        }
        trace!(row_end = index, edges = edges.len(), "row scan complete");
    }

    /// Sum of the eight flags surrounding (middle row, `column`).
    fn neighbor_sum(&self, column: usize) -> i32 {
        let mut sum = 0;
        for row in 0..3 {
            for c in [column - 1, column, column + 1] {
                if row == 1 && c == column {
                    continue; // center pixel is not its own neighbor
                }
                sum += self.rows[row][c] as i32;
            }
        }
        sum
    }

    fn shift_up(&mut self) {
        self.rows[0] = self.rows[1];
        self.rows[1] = self.rows[2];
    }
}

impl Default for LookbackEdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}
