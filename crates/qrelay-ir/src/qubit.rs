//! Qubit, classical bit and register types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Unique identifier for a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// A named, contiguous block of bits.
///
/// Register `name[k]` addresses the flat bit `start + k`. The same type is
/// used for quantum and classical registers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Register {
    /// Declared name.
    pub name: String,
    /// Flat index of element 0.
    pub start: u32,
    /// Number of bits.
    pub size: u32,
}

impl Register {
    /// Create a register.
    pub fn new(name: impl Into<String>, start: u32, size: u32) -> Self {
        Self {
            name: name.into(),
            start,
            size,
        }
    }

    /// Flat index of element `index`, if it is inside the register.
    pub fn flat(&self, index: u32) -> Option<u32> {
        (index < self.size).then_some(self.start + index)
    }

    /// Whether the flat index belongs to this register.
    pub fn contains(&self, flat: u32) -> bool {
        flat >= self.start && flat < self.start + self.size
    }

    /// All flat indices, element 0 first.
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.start..self.start + self.size
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.size)
    }
}
