//! Dialect selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// The `OpenQASM` dialect a circuit file is written in.
///
/// The canonical spelling is the bare major version (`2` or `3`); `2.0` and
/// `3.0` are accepted as synonyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QasmVersion {
    /// `OpenQASM` 2.0 (`qreg`/`creg`, `measure q -> c`).
    #[default]
    V2,
    /// `OpenQASM` 3 (`qubit`/`bit`, `c = measure q`).
    V3,
}

impl QasmVersion {
    /// The major version number.
    pub fn major(self) -> u32 {
        match self {
            QasmVersion::V2 => 2,
            QasmVersion::V3 => 3,
        }
    }

    /// Whether an `OPENQASM` header version string belongs to this dialect.
    pub fn matches_header(self, header: &str) -> bool {
        let major = header.split('.').next().unwrap_or(header);
        major.parse::<u32>().is_ok_and(|m| m == self.major())
    }
}

impl FromStr for QasmVersion {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2" | "2.0" => Ok(QasmVersion::V2),
            "3" | "3.0" => Ok(QasmVersion::V3),
            other => Err(ParseError::UnsupportedDialect(other.to_string())),
        }
    }
}

impl fmt::Display for QasmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major())
    }
}
