//! Substitution and gap scoring for nucleotide alignment.
//!
//! Mismatches are split by nucleotide class: a purine/purine or
//! pyrimidine/pyrimidine mismatch is a transition, anything else (including
//! symbols outside `ACGT`) is a transversion.

use serde::{Deserialize, Serialize};

use crate::{
    AlignerError, DNA_GAP_EXTEND, DNA_GAP_OPEN, DNA_MATCH, DNA_TRANSITION, DNA_TRANSVERSION,
};

/// Nucleotide class used to split mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NucleotideClass {
    Purine,
    Pyrimidine,
}

/// Classify a symbol. Case-sensitive; anything but `A`, `G`, `C`, `T` has no class.
pub fn classify(symbol: u8) -> Option<NucleotideClass> {
    match symbol {
        b'A' | b'G' => Some(NucleotideClass::Purine),
        b'C' | b'T' => Some(NucleotideClass::Pyrimidine),
        _ => None,
    }
}

/// Affine scoring scheme: `gap_open` is charged for the first column of a
/// gap run, `gap_extend` for every further column of the same run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringScheme {
    pub match_score: i32,
    pub transition: i32,
    pub transversion: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for ScoringScheme {
    fn default() -> Self {
        Self {
            match_score: DNA_MATCH,
            transition: DNA_TRANSITION,
            transversion: DNA_TRANSVERSION,
            gap_open: DNA_GAP_OPEN,
            gap_extend: DNA_GAP_EXTEND,
        }
    }
}

impl ScoringScheme {
    /// Build a validated scheme.
    ///
    /// # Errors
    ///
    /// Returns [`AlignerError::InvalidInput`] if `match_score` is not positive
    /// or any mismatch/gap value is not negative.
    pub fn new(
        match_score: i32,
        transition: i32,
        transversion: i32,
        gap_open: i32,
        gap_extend: i32,
    ) -> Result<Self, AlignerError> {
        let scheme = Self {
            match_score,
            transition,
            transversion,
            gap_open,
            gap_extend,
        };
        scheme.validate()?;
        Ok(scheme)
    }

    /// Check the sign constraints of every field.
    pub fn validate(&self) -> Result<(), AlignerError> {
        if self.match_score <= 0 {
            return Err(AlignerError::InvalidInput(
                "match_score must be positive".into(),
            ));
        }
        let penalties = [
            ("transition", self.transition),
            ("transversion", self.transversion),
            ("gap_open", self.gap_open),
            ("gap_extend", self.gap_extend),
        ];
        for (name, value) in penalties {
            if value >= 0 {
                return Err(AlignerError::InvalidInput(format!(
                    "{} must be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Score aligning `a` against `b`.
    ///
    /// Unclassified symbols never share a class with anything, so any
    /// mismatch involving one is charged as a transversion.
    pub fn score_pair(&self, a: u8, b: u8) -> i32 {
        if a == b {
            return self.match_score;
        }
        match (classify(a), classify(b)) {
            (Some(x), Some(y)) if x == y => self.transition,
            _ => self.transversion,
        }
    }

    /// Cost of one gap column; `continuation` is true when the previous
    /// column belongs to the same gap run.
    pub fn gap_cost(&self, continuation: bool) -> i32 {
        if continuation {
            self.gap_extend
        } else {
            self.gap_open
        }
    }

    /// Total cost of a single gap run of `len` columns, saturating at `i32::MIN`.
    pub fn gap_run(&self, len: usize) -> i32 {
        match len {
            0 => 0,
            n => {
                let extensions = i32::try_from(n - 1).unwrap_or(i32::MAX);
                self.gap_open
                    .saturating_add(extensions.saturating_mul(self.gap_extend))
            }
        }
    }

    /// Largest absolute value of any single score term.
    pub fn max_magnitude(&self) -> u64 {
        [
            self.match_score,
            self.transition,
            self.transversion,
            self.gap_open,
            self.gap_extend,
        ]
        .iter()
        .map(|v| v.unsigned_abs() as u64)
        .max()
        .unwrap_or(0)
    }

    /// Upper bound on the magnitude of any cell score when aligning
    /// sequences of lengths `len1` and `len2`: every path has at most
    /// `len1 + len2` columns.
    pub fn score_bound(&self, len1: usize, len2: usize) -> u64 {
        (len1 as u64)
            .saturating_add(len2 as u64)
            .saturating_add(1)
            .saturating_mul(self.max_magnitude())
    }
}

/// Column tallies of a finished alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    pub matches: u32,
    pub transitions: u32,
    pub transversions: u32,
    pub gap_opens: u32,
    pub gap_extensions: u32,
    pub columns: u32,
}

impl AlignmentStats {
    pub fn mismatches(&self) -> u32 {
        self.transitions + self.transversions
    }

    pub fn gaps(&self) -> u32 {
        self.gap_opens + self.gap_extensions
    }

    /// Fraction of columns that are exact matches.
    pub fn identity(&self) -> f64 {
        if self.columns == 0 {
            return 0.0;
        }
        self.matches as f64 / self.columns as f64
    }

    /// Re-score the tallies under `scheme`.
    pub fn score(&self, scheme: &ScoringScheme) -> i32 {
        self.matches as i32 * scheme.match_score
            + self.transitions as i32 * scheme.transition
            + self.transversions as i32 * scheme.transversion
            + self.gap_opens as i32 * scheme.gap_open
            + self.gap_extensions as i32 * scheme.gap_extend
    }
}
