use std::borrow::Cow;
use std::fmt;

use log::trace;

use crate::matrix::{AffineMatrices, State};
use crate::scoring::{classify, AlignmentStats, ScoringScheme};
use crate::AlignerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracebackOperation {
    Match,
    Mismatch,
    /// Gap in the first sequence; consumes a symbol of the second.
    Insertion,
    /// Gap in the second sequence; consumes a symbol of the first.
    Deletion,
}

impl TracebackOperation {
    fn cigar_char(self) -> char {
        match self {
            TracebackOperation::Match => '=',
            TracebackOperation::Mismatch => 'X',
            TracebackOperation::Insertion => 'I',
            TracebackOperation::Deletion => 'D',
        }
    }

    fn is_gap(self) -> bool {
        matches!(
            self,
            TracebackOperation::Insertion | TracebackOperation::Deletion
        )
    }
}

/// Result of a global alignment.
///
/// `alignment` is the single-row rendering: the second sequence's symbol on
/// every substitution column and the gap marker on every gap column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub score: i32,
    pub alignment: Vec<u8>,
    pub aligned_seq1: Vec<u8>,
    pub aligned_seq2: Vec<u8>,
    pub operations: Vec<TracebackOperation>,
}

impl Alignment {
    pub fn alignment_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.alignment)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn stats(&self) -> AlignmentStats {
        let mut stats = AlignmentStats {
            columns: self.operations.len() as u32,
            ..Default::default()
        };
        let mut prev: Option<TracebackOperation> = None;
        for (k, &op) in self.operations.iter().enumerate() {
            match op {
                TracebackOperation::Match => stats.matches += 1,
                TracebackOperation::Mismatch => {
                    match (
                        classify(self.aligned_seq1[k]),
                        classify(self.aligned_seq2[k]),
                    ) {
                        (Some(a), Some(b)) if a == b => stats.transitions += 1,
                        _ => stats.transversions += 1,
                    }
                }
                TracebackOperation::Insertion | TracebackOperation::Deletion => {
                    if prev == Some(op) {
                        stats.gap_extensions += 1;
                    } else {
                        stats.gap_opens += 1;
                    }
                }
            }
            prev = Some(op);
        }
        stats
    }

    /// Extended CIGAR string (`=`, `X`, `I`, `D`).
    pub fn cigar(&self) -> String {
        let mut out = String::new();
        let mut iter = self.operations.iter().peekable();
        while let Some(&op) = iter.next() {
            let mut run = 1;
            while iter.peek() == Some(&&op) {
                iter.next();
                run += 1;
            }
            out.push_str(&run.to_string());
            out.push(op.cigar_char());
        }
        out
    }

    pub fn gap_count(&self) -> usize {
        self.operations.iter().filter(|op| op.is_gap()).count()
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", String::from_utf8_lossy(&self.aligned_seq1))?;
        writeln!(f, "{}", String::from_utf8_lossy(&self.aligned_seq2))?;
        write!(f, "score: {}", self.score)
    }
}

/// Result of fitting one sequence into another's frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameAlignment {
    pub score: i32,
    pub aligned_x: Vec<u8>,
    pub gaps: usize,
}

impl FrameAlignment {
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.aligned_x)
    }

    pub fn len(&self) -> usize {
        self.aligned_x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aligned_x.is_empty()
    }
}

impl fmt::Display for FrameAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Walks filled [`AffineMatrices`] back from the bottom-right corner.
pub struct Traceback<'a> {
    matrices: &'a AffineMatrices,
    seq1: &'a [u8],
    seq2: &'a [u8],
    scoring: &'a ScoringScheme,
    gap_marker: u8,
}

impl<'a> Traceback<'a> {
    pub fn new(
        matrices: &'a AffineMatrices,
        seq1: &'a [u8],
        seq2: &'a [u8],
        scoring: &'a ScoringScheme,
        gap_marker: u8,
    ) -> Self {
        Self {
            matrices,
            seq1,
            seq2,
            scoring,
            gap_marker,
        }
    }

    /// State to resume in after leaving a horizontal gap at `(i, j)`.
    fn leave_row_gap(&self, i: usize, j: usize) -> State {
        let m = self.matrices;
        let (h, f) = (m.h.get(i, j - 1), m.f.get(i, j - 1));
        // opening wins ties with extension
        if m.e.get(i, j) == h.max(f) + self.scoring.gap_cost(false) {
            if h >= f {
                State::Substitution
            } else {
                State::GapInCol
            }
        } else {
            State::GapInRow
        }
    }

    fn leave_col_gap(&self, i: usize, j: usize) -> State {
        let m = self.matrices;
        let (h, e) = (m.h.get(i - 1, j), m.e.get(i - 1, j));
        if m.f.get(i, j) == h.max(e) + self.scoring.gap_cost(false) {
            if h >= e {
                State::Substitution
            } else {
                State::GapInRow
            }
        } else {
            State::GapInCol
        }
    }

    /// Reconstruct the global alignment ending at `(len(seq1), len(seq2))`.
    pub fn reconstruct_global(&self) -> Result<Alignment, AlignerError> {
        let (mut i, mut j) = (self.seq1.len(), self.seq2.len());
        let (mut state, score) = self.matrices.best(i, j);
        let mut operations = Vec::with_capacity(i + j);

        while i > 0 || j > 0 {
            trace!("traceback at ({}, {}) in {:?}", i, j, state);
            match state {
                State::Substitution => {
                    if i == 0 || j == 0 {
                        return Err(AlignerError::Traceback(format!(
                            "substitution state on border cell ({}, {})",
                            i, j
                        )));
                    }
                    operations.push(if self.seq1[i - 1] == self.seq2[j - 1] {
                        TracebackOperation::Match
                    } else {
                        TracebackOperation::Mismatch
                    });
                    i -= 1;
                    j -= 1;
                    state = self.matrices.best(i, j).0;
                }
                State::GapInRow => {
                    operations.push(TracebackOperation::Insertion);
                    state = self.leave_row_gap(i, j);
                    j -= 1;
                }
                State::GapInCol => {
                    operations.push(TracebackOperation::Deletion);
                    state = self.leave_col_gap(i, j);
                    i -= 1;
                }
            }
        }
        operations.reverse();

        let columns = operations.len();
        let mut alignment = Vec::with_capacity(columns);
        let mut aligned_seq1 = Vec::with_capacity(columns);
        let mut aligned_seq2 = Vec::with_capacity(columns);
        let (mut a, mut b) = (0, 0);
        for op in &operations {
            match op {
                TracebackOperation::Match | TracebackOperation::Mismatch => {
                    aligned_seq1.push(self.seq1[a]);
                    aligned_seq2.push(self.seq2[b]);
                    alignment.push(self.seq2[b]);
                    a += 1;
                    b += 1;
                }
                TracebackOperation::Insertion => {
                    aligned_seq1.push(self.gap_marker);
                    aligned_seq2.push(self.seq2[b]);
                    alignment.push(self.gap_marker);
                    b += 1;
                }
                TracebackOperation::Deletion => {
                    aligned_seq1.push(self.seq1[a]);
                    aligned_seq2.push(self.gap_marker);
                    alignment.push(self.gap_marker);
                    a += 1;
                }
            }
        }

        Ok(Alignment {
            score,
            alignment,
            aligned_seq1,
            aligned_seq2,
            operations,
        })
    }

    /// Reconstruct `seq1` padded into the frame of `seq2`.
    ///
    /// Exactly `len(seq2) - len(seq1)` gap markers are emitted; once that
    /// budget is spent every remaining step consumes a symbol of both.
    pub fn reconstruct_frame(&self) -> Result<FrameAlignment, AlignerError> {
        let budget = self
            .seq2
            .len()
            .checked_sub(self.seq1.len())
            .ok_or_else(|| {
                AlignerError::InvalidInput(format!(
                    "cannot fit a sequence of length {} into a frame of length {}",
                    self.seq1.len(),
                    self.seq2.len()
                ))
            })?;
        let (mut i, mut j) = (self.seq1.len(), self.seq2.len());
        let (mut state, score) = self.matrices.best(i, j);
        let mut gaps_left = budget;
        let mut aligned_x = Vec::with_capacity(j);

        while j > 0 {
            trace!(
                "frame traceback at ({}, {}) in {:?}, {} gaps left",
                i,
                j,
                state,
                gaps_left
            );
            match state {
                State::Substitution if i > 0 => {
                    aligned_x.push(self.seq1[i - 1]);
                    i -= 1;
                    j -= 1;
                    state = self.matrices.best(i, j).0;
                }
                State::GapInRow if gaps_left > 0 => {
                    aligned_x.push(self.gap_marker);
                    gaps_left -= 1;
                    state = self.leave_row_gap(i, j);
                    j -= 1;
                }
                other => {
                    return Err(AlignerError::Traceback(format!(
                        "no frame move from ({}, {}) in {:?} with {} gaps left",
                        i, j, other, gaps_left
                    )));
                }
            }
        }
        aligned_x.reverse();

        Ok(FrameAlignment {
            score,
            aligned_x,
            gaps: budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(a: &[u8], b: &[u8]) -> Alignment {
        let scoring = ScoringScheme::default();
        let m = AffineMatrices::fill_global(a, b, &scoring);
        Traceback::new(&m, a, b, &scoring, b'-')
            .reconstruct_global()
            .unwrap()
    }

    fn frame(x: &[u8], y: &[u8]) -> FrameAlignment {
        let scoring = ScoringScheme::default();
        let m = AffineMatrices::fill_frame(x, y, &scoring).unwrap();
        Traceback::new(&m, x, y, &scoring, b'-')
            .reconstruct_frame()
            .unwrap()
    }

    #[test]
    fn identical_sequences() {
        let aln = global(b"ACGT", b"ACGT");
        assert_eq!(aln.score, 8);
        assert_eq!(aln.alignment, b"ACGT");
        assert_eq!(aln.cigar(), "4=");
        assert_eq!(aln.stats().identity(), 1.0);
    }

    #[test]
    fn rows_carry_both_sequences() {
        let aln = global(b"AAAA", b"AAA");
        assert_eq!(aln.score, -10);
        assert_eq!(aln.len(), 4);
        assert_eq!(aln.gap_count(), 1);
        let row1: Vec<u8> = aln.aligned_seq1.iter().copied().filter(|&c| c != b'-').collect();
        let row2: Vec<u8> = aln.aligned_seq2.iter().copied().filter(|&c| c != b'-').collect();
        assert_eq!(row1, b"AAAA");
        assert_eq!(row2, b"AAA");
    }

    #[test]
    fn gap_run_is_one_open_plus_extensions() {
        // nine matches and one 3-column gap beat any layout with two gap runs
        let aln = global(b"ACGTTTTACGTA", b"ACGTACGTA");
        let stats = aln.stats();
        assert_eq!(stats.gap_opens, 1);
        assert_eq!(stats.gap_extensions, 2);
        assert_eq!(aln.score, stats.score(&ScoringScheme::default()));
    }

    #[test]
    fn cigar_runs() {
        let aln = global(b"AAAA", b"AAA");
        let cigar = aln.cigar();
        assert!(cigar.contains("1D"), "{}", cigar);
    }

    #[test]
    fn single_row_uses_second_sequence_symbols() {
        let aln = global(b"AG", b"CT");
        assert_eq!(aln.score, -4);
        assert_eq!(aln.alignment, b"CT");
        assert_eq!(aln.aligned_seq1, b"AG");
        assert_eq!(aln.stats().transversions, 2);
    }

    #[test]
    fn frame_without_budget_is_identity() {
        let fa = frame(b"ACGT", b"TTTT");
        assert_eq!(fa.aligned_x, b"ACGT");
        assert_eq!(fa.gaps, 0);
    }

    #[test]
    fn frame_places_gap_run_where_it_scores_best() {
        let fa = frame(b"ACGT", b"ACGGGT");
        assert_eq!(fa.len(), 6);
        assert_eq!(fa.aligned_x.iter().filter(|&&c| c == b'-').count(), 2);
        // four matches plus one gap run of two
        assert_eq!(fa.score, 4 * 2 + ScoringScheme::default().gap_run(2));
    }

    #[test]
    fn frame_ties_prefer_substitution_at_the_end() {
        // "A-" and "-A" both score 2 - 16; the walk back takes the diagonal first
        let fa = frame(b"A", b"AA");
        assert_eq!(fa.aligned_x, b"-A");
        assert_eq!(fa.score, -14);

        let fa = frame(b"AC", b"ACAC");
        assert_eq!(fa.aligned_x, b"--AC");
        assert_eq!(fa.score, 4 + ScoringScheme::default().gap_run(2));
    }

    #[test]
    fn frame_of_empty_x_is_all_gaps() {
        let fa = frame(b"", b"ACG");
        assert_eq!(fa.aligned_x, b"---");
        assert_eq!(fa.score, ScoringScheme::default().gap_run(3));
    }

    #[test]
    fn display_prints_rows() {
        let aln = global(b"AC", b"AC");
        assert_eq!(aln.to_string(), "AC\nAC\nscore: 4");
    }
}
