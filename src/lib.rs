use std::time::Instant;

use log::{debug, warn};
use thiserror::Error;

pub mod alignment_mode;
pub mod config;
pub mod matrix;
pub mod scoring;
pub mod traceback;

pub use crate::alignment_mode::AlignmentMode;
pub use crate::config::{validate_gap_marker, AlignerConfig};
pub use crate::matrix::{AffineMatrices, ScoreMatrix, MAX_SCORE_MAGNITUDE};
pub use crate::scoring::{classify, AlignmentStats, NucleotideClass, ScoringScheme};
pub use crate::traceback::{Alignment, FrameAlignment, Traceback, TracebackOperation};

// DNA scoring parameters
pub const DNA_MATCH: i32 = 2;
pub const DNA_TRANSITION: i32 = -1;
pub const DNA_TRANSVERSION: i32 = -2;
pub const DNA_GAP_OPEN: i32 = -16;
pub const DNA_GAP_EXTEND: i32 = -1;

pub const DEFAULT_GAP_MARKER: u8 = b'-';
/// Cell limit per table: three `i32` tables of this size take 1.5 GiB.
pub const DEFAULT_MAX_CELLS: usize = 1 << 27;

#[derive(Debug, Error)]
pub enum AlignerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("alignment of {cells} cells exceeds the limit of {limit}")]
    SequenceTooLarge { cells: usize, limit: usize },
    #[error("traceback failed: {0}")]
    Traceback(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Pairwise nucleotide aligner.
///
/// Holds only immutable settings; every call allocates and owns its own
/// tables, so one `Aligner` can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct Aligner {
    scoring: ScoringScheme,
    gap_marker: u8,
    max_cells: usize,
}

impl Default for Aligner {
    fn default() -> Self {
        Self {
            scoring: ScoringScheme::default(),
            gap_marker: DEFAULT_GAP_MARKER,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

impl Aligner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AlignerConfig) -> Result<Self, AlignerError> {
        config.validate()?;
        Ok(Self {
            scoring: config.scoring,
            gap_marker: config.gap_marker as u8,
            max_cells: config.max_cells,
        })
    }

    pub fn with_scoring(mut self, scoring: ScoringScheme) -> Result<Self, AlignerError> {
        scoring.validate()?;
        self.scoring = scoring;
        Ok(self)
    }

    pub fn with_gap_marker(mut self, gap_marker: u8) -> Result<Self, AlignerError> {
        validate_gap_marker(gap_marker)?;
        self.gap_marker = gap_marker;
        Ok(self)
    }

    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }

    pub fn scoring(&self) -> &ScoringScheme {
        &self.scoring
    }

    pub fn gap_marker(&self) -> u8 {
        self.gap_marker
    }

    fn check_size(&self, seq1: &[u8], seq2: &[u8]) -> Result<(), AlignerError> {
        let cells = (seq1.len() + 1)
            .checked_mul(seq2.len() + 1)
            .unwrap_or(usize::MAX);
        if cells > self.max_cells {
            return Err(AlignerError::SequenceTooLarge {
                cells,
                limit: self.max_cells,
            });
        }
        let bound = self.scoring.score_bound(seq1.len(), seq2.len());
        if bound > MAX_SCORE_MAGNITUDE {
            return Err(AlignerError::InvalidInput(format!(
                "scores for lengths {} and {} may reach {} in magnitude under this scheme, above the limit of {}",
                seq1.len(),
                seq2.len(),
                bound,
                MAX_SCORE_MAGNITUDE
            )));
        }
        Ok(())
    }

    fn note_unclassified(seq1: &[u8], seq2: &[u8]) {
        let unknown = seq1
            .iter()
            .chain(seq2)
            .filter(|&&c| classify(c).is_none())
            .count();
        if unknown > 0 {
            warn!(
                "{} symbols outside ACGT; their mismatches score as transversions",
                unknown
            );
        }
    }

    /// Globally align `seq1` against `seq2` under the affine scheme.
    ///
    /// Either sequence may be empty.
    ///
    /// # Errors
    ///
    /// [`AlignerError::SequenceTooLarge`] if the tables would exceed the cell
    /// limit, [`AlignerError::InvalidInput`] if the scheme's penalties times
    /// the sequence lengths could leave the representable score range.
    pub fn align(&self, seq1: &[u8], seq2: &[u8]) -> Result<Alignment, AlignerError> {
        self.check_size(seq1, seq2)?;
        Self::note_unclassified(seq1, seq2);
        let start_time = Instant::now();

        let matrices = AffineMatrices::fill_global(seq1, seq2, &self.scoring);
        let alignment =
            Traceback::new(&matrices, seq1, seq2, &self.scoring, self.gap_marker)
                .reconstruct_global()?;

        debug!(
            "global alignment {}x{}: score {} over {} columns in {:?}",
            seq1.len(),
            seq2.len(),
            alignment.score,
            alignment.len(),
            start_time.elapsed()
        );
        Ok(alignment)
    }

    /// Fit `seq_x` into the frame of `seq_y`.
    ///
    /// The result has exactly `len(seq_y)` symbols, of which exactly
    /// `len(seq_y) - len(seq_x)` are gap markers placed to maximise the score.
    ///
    /// # Errors
    ///
    /// [`AlignerError::InvalidInput`] if `seq_y` is shorter than `seq_x` or the
    /// score range would be exceeded; [`AlignerError::SequenceTooLarge`] as for
    /// [`Aligner::align`].
    pub fn align_to_frame(
        &self,
        seq_x: &[u8],
        seq_y: &[u8],
    ) -> Result<FrameAlignment, AlignerError> {
        if seq_y.len() < seq_x.len() {
            return Err(AlignerError::InvalidInput(format!(
                "frame of length {} is shorter than the sequence of length {}",
                seq_y.len(),
                seq_x.len()
            )));
        }
        self.check_size(seq_x, seq_y)?;
        Self::note_unclassified(seq_x, seq_y);
        let start_time = Instant::now();

        let matrices = AffineMatrices::fill_frame(seq_x, seq_y, &self.scoring)?;
        let frame = Traceback::new(&matrices, seq_x, seq_y, &self.scoring, self.gap_marker)
            .reconstruct_frame()?;

        debug!(
            "frame alignment {} into {}: score {}, {} gaps in {:?}",
            seq_x.len(),
            seq_y.len(),
            frame.score,
            frame.gaps,
            start_time.elapsed()
        );
        Ok(frame)
    }
}

/// Global alignment with the default scheme.
pub fn align(seq1: impl AsRef<[u8]>, seq2: impl AsRef<[u8]>) -> Result<Alignment, AlignerError> {
    Aligner::default().align(seq1.as_ref(), seq2.as_ref())
}

/// Frame-fitting alignment with the default scheme.
pub fn align_to_frame(
    seq_x: impl AsRef<[u8]>,
    seq_y: impl AsRef<[u8]>,
) -> Result<FrameAlignment, AlignerError> {
    Aligner::default().align_to_frame(seq_x.as_ref(), seq_y.as_ref())
}
