use std::fmt;
use std::str::FromStr;

use crate::AlignerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignmentMode {
    /// End-to-end alignment, gaps allowed in either sequence.
    #[default]
    Global,
    /// Pad the first sequence to the length of the second; no gaps in the second.
    FrameFit,
}

impl AlignmentMode {
    pub fn name(self) -> &'static str {
        match self {
            AlignmentMode::Global => "global",
            AlignmentMode::FrameFit => "frame",
        }
    }
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlignmentMode {
    type Err = AlignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(AlignmentMode::Global),
            "frame" | "frame-fit" | "framefit" => Ok(AlignmentMode::FrameFit),
            other => Err(AlignerError::InvalidInput(format!(
                "unknown alignment mode '{}', expected 'global' or 'frame'",
                other
            ))),
        }
    }
}
