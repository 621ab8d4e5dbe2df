//! Leaf and merged payloads of the Huffman tree.

use std::ascii;
use std::fmt;

use crate::error::{Error, Result};

/// Occurrence count of a symbol.
pub type Frequency = u64;

/// A character and how often it occurs.
///
/// Symbols produced by merging two subtrees carry no character; their
/// frequency is the sum of the merged frequencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Symbol {
    character: Option<u8>,
    frequency: Frequency,
}

impl Symbol {
    /// A leaf symbol for `character`.
    pub const fn new(character: u8, frequency: Frequency) -> Self {
        Self {
            character: Some(character),
            frequency,
        }
    }

    /// A symbol standing for a merged subtree.
    pub const fn merged(frequency: Frequency) -> Self {
        Self {
            character: None,
            frequency,
        }
    }

    /// The character, or `None` for merged symbols.
    pub fn character(&self) -> Option<u8> {
        self.character
    }

    /// The occurrence count.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Returns true if this symbol stands for a merged subtree.
    pub fn is_merged(&self) -> bool {
        self.character.is_none()
    }

    /// The merged symbol for `self` and `other`.
    ///
    /// # Errors
    /// Returns `Error::FrequencyOverflow` if the summed frequency does not fit.
    pub fn merge(&self, other: &Symbol) -> Result<Symbol> {
        self.frequency
            .checked_add(other.frequency)
            .map(Symbol::merged)
            .ok_or(Error::FrequencyOverflow {
                left: self.frequency,
                right: other.frequency,
            })
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.character {
            Some(c) => write!(f, "{}:{}", ascii::escape_default(c), self.frequency),
            None => write!(f, "*:{}", self.frequency),
        }
    }
}

/// Byte frequencies of a buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [Frequency; 256],
}

impl FrequencyTable {
    /// Count every byte of `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0; 256];
        for &b in data {
            counts[b as usize] += 1;
        }
        Self { counts }
    }

    /// Count of `byte`.
    pub fn get(&self, byte: u8) -> Frequency {
        self.counts[byte as usize]
    }

    /// Bytes that occur at least once, in byte order, with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Frequency)> + '_ {
        (0..=u8::MAX)
            .map(|b| (b, self.counts[b as usize]))
            .filter(|&(_, n)| n > 0)
    }

    /// Number of distinct bytes seen.
    pub fn distinct(&self) -> usize {
        self.iter().count()
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> Frequency {
        self.counts.iter().sum()
    }

    /// Parallel symbol and frequency lists, ready for a priority queue.
    pub fn to_parts(&self) -> (Vec<u8>, Vec<Frequency>) {
        self.iter().unzip()
    }
}
