use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

const FORMAT_11: &str = "Microsoft Visual Studio Solution File, Format Version 11.00";
const FORMAT_12: &str = "Microsoft Visual Studio Solution File, Format Version 12.00";
/// Some older tooling stamped VS2013 solutions with 13.00; read, never written.
const FORMAT_13: &str = "Microsoft Visual Studio Solution File, Format Version 13.00";

/// Solution file format, identified by the two-line preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolutionVersion {
    #[serde(rename = "VS2010")]
    Vs2010,
    #[serde(rename = "VS2012")]
    Vs2012,
    #[serde(rename = "VS2013")]
    Vs2013,
}

impl SolutionVersion {
    pub const ALL: [SolutionVersion; 3] = [Self::Vs2010, Self::Vs2012, Self::Vs2013];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vs2010 => "VS2010",
            Self::Vs2012 => "VS2012",
            Self::Vs2013 => "VS2013",
        }
    }

    pub const fn preamble(&self) -> [&'static str; 2] {
        match self {
            Self::Vs2010 => [FORMAT_11, "# Visual Studio 2010"],
            Self::Vs2012 => [FORMAT_12, "# Visual Studio 2012"],
            Self::Vs2013 => [FORMAT_12, "# Visual Studio 2013"],
        }
    }

    /// Version announced by a trimmed first preamble line. VS2012 and VS2013
    /// share a format line, so this yields the earlier of the two.
    pub fn from_format_line(line: &str) -> Option<Self> {
        if line == FORMAT_13 {
            return Some(Self::Vs2013);
        }
        Self::ALL
            .into_iter()
            .find(|version| version.preamble()[0] == line)
    }

    /// Refine a version using the trimmed comment line that follows it.
    pub fn refine(self, comment: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|version| version.preamble() == [self.preamble()[0], comment])
            .unwrap_or(self)
    }
}

impl fmt::Display for SolutionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolutionVersion {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vs2010" | "2010" => Ok(Self::Vs2010),
            "vs2012" | "2012" => Ok(Self::Vs2012),
            "vs2013" | "2013" => Ok(Self::Vs2013),
            other => Err(DomainError::UnknownSolutionVersion {
                value: other.to_owned(),
            }),
        }
    }
}
