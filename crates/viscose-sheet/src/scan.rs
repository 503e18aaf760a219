use std::fmt;
use std::str::FromStr;
use viscose_types::{column_index, column_name};

use crate::Error;

/// Inclusive column range searched for scenario names (`"A"` or `"A:C"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanColumns {
    first: u32,
    last: u32,
}

impl ScanColumns {
    pub fn single(col: u32) -> Self {
        Self {
            first: col,
            last: col,
        }
    }

    pub fn range(a: u32, b: u32) -> Self {
        Self {
            first: a.min(b),
            last: a.max(b),
        }
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn last(&self) -> u32 {
        self.last
    }
}

impl Default for ScanColumns {
    fn default() -> Self {
        Self::single(0)
    }
}

impl FromStr for ScanColumns {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |letters: &str| {
            column_index(letters.trim())
                .map_err(|e| Error::Config(format!("invalid scan column '{}': {}", s, e)))
        };

        match s.split_once(':') {
            Some((a, b)) => Ok(Self::range(parse(a)?, parse(b)?)),
            None => Ok(Self::single(parse(s)?)),
        }
    }
}

impl fmt::Display for ScanColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            f.write_str(&column_name(self.first))
        } else {
            write!(f, "{}:{}", column_name(self.first), column_name(self.last))
        }
    }
}
