use std::error::Error;
use std::fmt;

use crate::config::{MAX_BOMBS, MIN_BOMBS};

/// A rejected player action. Every variant is a recoverable no-op: the
/// engine state is left exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMove {
    /// No round has been started yet.
    NoRound,
    /// The round already ended in a win or loss.
    RoundOver,
    /// Cell index outside the grid.
    OutOfBounds { index: usize },
    /// The target cell is not hidden.
    NotHidden { index: usize },
    /// Cash-out requires at least one revealed cell.
    NothingRevealed,
    /// Bomb count outside the accepted range.
    BombCountOutOfRange { bombs: usize },
    /// Bets must be positive.
    InvalidBet,
    /// Explicit bomb layout with duplicate, out-of-range or miscounted indices.
    BadLayout,
}

impl fmt::Display for InvalidMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRound => write!(f, "no active round"),
            Self::RoundOver => write!(f, "round is already over"),
            Self::OutOfBounds { index } => write!(f, "cell index {index} is out of bounds"),
            Self::NotHidden { index } => write!(f, "cell {index} is not hidden"),
            Self::NothingRevealed => write!(f, "cannot cash out before revealing a cell"),
            Self::BombCountOutOfRange { bombs } => {
                write!(f, "bomb count {bombs} outside {MIN_BOMBS}..={MAX_BOMBS}")
            }
            Self::InvalidBet => write!(f, "bet must be at least 1"),
            Self::BadLayout => write!(f, "invalid bomb layout"),
        }
    }
}

impl Error for InvalidMove {}
