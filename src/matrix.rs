//! Dynamic-programming tables for affine-gap alignment (Gotoh, 1982).
//!
//! Three tables are filled in lockstep, one per state of the last column:
//!
//! - **H**: substitution (diagonal move, consumes one symbol of each sequence)
//! - **E**: gap in the row sequence (horizontal move, consumes a column symbol)
//! - **F**: gap in the column sequence (vertical move, consumes a row symbol)
//!
//! Cell `(i, j)` of each table holds the best score for the first `i` row
//! symbols against the first `j` column symbols ending in that state.

use log::debug;

use crate::scoring::ScoringScheme;
use crate::AlignerError;

/// Score of an unreachable state. Far enough from `i32::MIN` that one
/// penalty can be added without overflow.
pub const NEG_INF: i32 = i32::MIN / 4;

/// Largest score magnitude a reachable cell may take. Kept below half of
/// `|NEG_INF|` so that a real score, even after one more penalty, always
/// outranks every unreachable cell.
pub const MAX_SCORE_MAGNITUDE: u64 = (i32::MAX / 8) as u64;

/// Dense row-major score table.
#[derive(Debug, Clone)]
pub struct ScoreMatrix {
    data: Vec<i32>,
    rows: usize,
    cols: usize,
}

impl ScoreMatrix {
    pub fn new(rows: usize, cols: usize, fill: i32) -> Self {
        Self {
            data: vec![fill; rows * cols],
            rows,
            cols,
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: i32) {
        self.data[row * self.cols + col] = value;
    }

    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.data[row * self.cols + col]
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

/// Which table a cell value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Substitution,
    GapInRow,
    GapInCol,
}

/// The H/E/F tables for one alignment call.
#[derive(Debug, Clone)]
pub struct AffineMatrices {
    pub h: ScoreMatrix,
    pub e: ScoreMatrix,
    pub f: ScoreMatrix,
}

impl AffineMatrices {
    fn new(rows: usize, cols: usize) -> Self {
        let mut h = ScoreMatrix::new(rows, cols, NEG_INF);
        h.set(0, 0, 0);
        Self {
            h,
            e: ScoreMatrix::new(rows, cols, NEG_INF),
            f: ScoreMatrix::new(rows, cols, NEG_INF),
        }
    }

    pub fn rows(&self) -> usize {
        self.h.rows()
    }

    pub fn cols(&self) -> usize {
        self.h.cols()
    }

    pub fn value(&self, state: State, row: usize, col: usize) -> i32 {
        match state {
            State::Substitution => self.h.get(row, col),
            State::GapInRow => self.e.get(row, col),
            State::GapInCol => self.f.get(row, col),
        }
    }

    /// Best state at `(row, col)`. Ties go to substitution, then the
    /// vertical gap, then the horizontal gap.
    pub fn best(&self, row: usize, col: usize) -> (State, i32) {
        let mut best = (State::Substitution, self.h.get(row, col));
        for state in [State::GapInCol, State::GapInRow] {
            let value = self.value(state, row, col);
            if value > best.1 {
                best = (state, value);
            }
        }
        best
    }

    /// Fill the tables for a global alignment of `rows_seq` against `cols_seq`.
    pub fn fill_global(rows_seq: &[u8], cols_seq: &[u8], scoring: &ScoringScheme) -> Self {
        let rows = rows_seq.len() + 1;
        let cols = cols_seq.len() + 1;
        debug!("filling global affine tables {}x{}", rows, cols);

        let mut m = Self::new(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                if i == 0 && j == 0 {
                    continue;
                }
                if i > 0 && j > 0 {
                    let (_, diag) = m.best(i - 1, j - 1);
                    let sub = scoring.score_pair(rows_seq[i - 1], cols_seq[j - 1]);
                    m.h.set(i, j, diag + sub);
                }
                if j > 0 {
                    m.e.set(i, j, m.horizontal(i, j, scoring));
                }
                if i > 0 {
                    let open = m.h.get(i - 1, j).max(m.e.get(i - 1, j)) + scoring.gap_cost(false);
                    let extend = m.f.get(i - 1, j) + scoring.gap_cost(true);
                    m.f.set(i, j, open.max(extend));
                }
            }
        }
        m
    }

    /// Fill the tables for fitting `rows_seq` into the frame of `cols_seq`.
    ///
    /// Vertical moves are never allowed, so only the band of cells with
    /// `0 <= col - row <= cols_seq.len() - rows_seq.len()` is reachable and
    /// filled; everything else stays [`NEG_INF`].
    pub fn fill_frame(
        rows_seq: &[u8],
        cols_seq: &[u8],
        scoring: &ScoringScheme,
    ) -> Result<Self, AlignerError> {
        let budget = cols_seq.len().checked_sub(rows_seq.len()).ok_or_else(|| {
            AlignerError::InvalidInput(format!(
                "cannot fit a sequence of length {} into a frame of length {}",
                rows_seq.len(),
                cols_seq.len()
            ))
        })?;
        let rows = rows_seq.len() + 1;
        let cols = cols_seq.len() + 1;
        debug!(
            "filling frame affine tables {}x{} with gap budget {}",
            rows, cols, budget
        );

        let mut m = Self::new(rows, cols);
        for i in 0..rows {
            for j in i..=i + budget {
                if j == 0 {
                    continue;
                }
                if i > 0 {
                    let (_, diag) = m.best(i - 1, j - 1);
                    let sub = scoring.score_pair(rows_seq[i - 1], cols_seq[j - 1]);
                    m.h.set(i, j, diag + sub);
                }
                m.e.set(i, j, m.horizontal(i, j, scoring));
            }
        }
        Ok(m)
    }

    fn horizontal(&self, i: usize, j: usize, scoring: &ScoringScheme) -> i32 {
        let open = self.h.get(i, j - 1).max(self.f.get(i, j - 1)) + scoring.gap_cost(false);
        let extend = self.e.get(i, j - 1) + scoring.gap_cost(true);
        open.max(extend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borders_are_single_gap_runs() {
        let s = ScoringScheme::default();
        let m = AffineMatrices::fill_global(b"ACG", b"ACGT", &s);
        assert_eq!(m.best(0, 0), (State::Substitution, 0));
        for j in 1..=4 {
            assert_eq!(m.best(0, j), (State::GapInRow, s.gap_run(j)));
        }
        for i in 1..=3 {
            assert_eq!(m.best(i, 0), (State::GapInCol, s.gap_run(i)));
        }
    }

    #[test]
    fn diagonal_of_identical_sequences() {
        let s = ScoringScheme::default();
        let m = AffineMatrices::fill_global(b"GATTACA", b"GATTACA", &s);
        for k in 0..=7 {
            assert_eq!(m.best(k, k).1, 2 * k as i32);
        }
    }

    #[test]
    fn frame_band_is_only_reachable_region() {
        let s = ScoringScheme::default();
        let m = AffineMatrices::fill_frame(b"AC", b"AGGC", &s).unwrap();
        // below the diagonal: would need a vertical move
        assert_eq!(m.best(2, 1).1, NEG_INF);
        // beyond the budget: would leave too few columns for the remaining row symbols
        assert_eq!(m.best(0, 3).1, NEG_INF);
        assert!(m.best(2, 4).1 > NEG_INF);
        for i in 0..m.rows() {
            for j in 0..m.cols() {
                assert_eq!(m.f.get(i, j), NEG_INF);
            }
        }
    }

    #[test]
    fn frame_rejects_short_frame() {
        let s = ScoringScheme::default();
        let err = AffineMatrices::fill_frame(b"ACGT", b"AC", &s).unwrap_err();
        assert!(matches!(err, AlignerError::InvalidInput(_)));
    }

    #[test]
    fn empty_inputs() {
        let s = ScoringScheme::default();
        let m = AffineMatrices::fill_global(b"", b"", &s);
        assert_eq!((m.rows(), m.cols()), (1, 1));
        assert_eq!(m.best(0, 0).1, 0);
    }
}
