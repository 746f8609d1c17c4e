use serde::{Deserialize, Serialize};

use crate::*;

/// Whether the player has opened a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Discovery {
    #[default]
    Hidden,
    Revealed,
}

impl Discovery {
    /// Integer code used by the save format.
    pub const fn code(self) -> u8 {
        match self {
            Self::Hidden => 0,
            Self::Revealed => 1,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Hidden),
            1 => Some(Self::Revealed),
            _ => None,
        }
    }
}

/// Player annotation on a hidden cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    #[default]
    None,
    Flagged,
    Questioned,
}

impl Mark {
    /// Next value in the `None -> Flagged -> Questioned -> None` cycle.
    pub const fn cycled(self) -> Self {
        match self {
            Self::None => Self::Flagged,
            Self::Flagged => Self::Questioned,
            Self::Questioned => Self::None,
        }
    }

    /// Integer code used by the save format.
    pub const fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Flagged => 1,
            Self::Questioned => 2,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Flagged),
            2 => Some(Self::Questioned),
            _ => None,
        }
    }
}

/// One grid position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub mine: bool,
    pub discovery: Discovery,
    pub mark: Mark,
    /// Mines among the Moore neighbors, zero until the grid is populated.
    pub neighbors: u8,
    /// Chord-preview tint, no gameplay effect.
    pub highlighted: bool,
}

impl Cell {
    pub const fn is_revealed(&self) -> bool {
        matches!(self.discovery, Discovery::Revealed)
    }

    pub const fn is_flagged(&self) -> bool {
        matches!(self.mark, Mark::Flagged)
    }

    /// Hidden and not carrying any mark.
    pub const fn is_untouched(&self) -> bool {
        matches!(self.discovery, Discovery::Hidden) && matches!(self.mark, Mark::None)
    }

    /// Two cells hold the same game state, ignoring the preview tint.
    pub fn same_state(&self, other: &Cell) -> bool {
        self.mine == other.mine
            && self.discovery == other.discovery
            && self.mark == other.mark
            && self.neighbors == other.neighbors
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.neighbors > 8 {
            return Err(GameError::InvalidCell);
        }
        if self.is_revealed() && self.is_flagged() {
            return Err(GameError::InvalidCell);
        }
        Ok(())
    }
}
