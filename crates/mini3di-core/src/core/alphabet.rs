//! The 3Di structural alphabet.
//!
//! States `0..20` map to the twenty letters of the alphabet. A 21st letter,
//! `X`, is part of the table but is never produced by the reference encoder.
//!
//! # Invalid state
//!
//! Residues that cannot be encoded (missing backbone atoms, chain termini,
//! or neighbors of either) receive [`INVALID_STATE`], which is `2`. That code
//! is also a regular codebook slot, so invalid residues print as `D`, the
//! same letter as genuine state 2, and not as the trailing `X`. Published
//! 3Di strings depend on this: keep the sentinel at `2`.

use phf::phf_map;
use thiserror::Error;

/// Letters of the 3Di alphabet, indexed by state.
pub const ALPHABET: [char; 21] = [
    'A', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W',
    'Y', 'X',
];

/// State assigned to residues that could not be encoded.
pub const INVALID_STATE: u8 = 2;

static STATE_BY_SYMBOL: phf::Map<char, u8> = phf_map! {
    'A' => 0, 'C' => 1, 'D' => 2, 'E' => 3, 'F' => 4,
    'G' => 5, 'H' => 6, 'I' => 7, 'K' => 8, 'L' => 9,
    'M' => 10, 'N' => 11, 'P' => 12, 'Q' => 13, 'R' => 14,
    'S' => 15, 'T' => 16, 'V' => 17, 'W' => 18, 'Y' => 19,
    'X' => 20,
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AlphabetError {
    #[error("State {state} at position {position} is outside of the 3Di alphabet")]
    UnknownState { position: usize, state: u8 },
    #[error("Symbol '{symbol}' at position {position} is not a 3Di letter")]
    UnknownSymbol { position: usize, symbol: char },
}

/// Returns the letter of a single state, if it belongs to the alphabet.
#[inline]
pub fn state_to_symbol(state: u8) -> Option<char> {
    ALPHABET.get(state as usize).copied()
}

/// Converts a sequence of states into its 3Di string.
///
/// # Errors
///
/// Returns [`AlphabetError::UnknownState`] for a state outside of the table.
pub fn states_to_sequence(states: &[u8]) -> Result<String, AlphabetError> {
    states
        .iter()
        .enumerate()
        .map(|(position, &state)| {
            state_to_symbol(state).ok_or(AlphabetError::UnknownState { position, state })
        })
        .collect()
}

/// Parses a 3Di string back into states.
///
/// # Errors
///
/// Returns [`AlphabetError::UnknownSymbol`] for a character outside of the table.
pub fn sequence_to_states(sequence: &str) -> Result<Vec<u8>, AlphabetError> {
    sequence
        .chars()
        .enumerate()
        .map(|(position, symbol)| {
            STATE_BY_SYMBOL
                .get(&symbol)
                .copied()
                .ok_or(AlphabetError::UnknownSymbol { position, symbol })
        })
        .collect()
}
