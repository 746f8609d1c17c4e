use core::ops::BitOr;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use clock::*;
pub use error::*;
pub use generator::*;
pub use grid::*;
pub use save::*;
pub use session::*;
pub use types::*;

mod cell;
mod clock;
mod error;
mod generator;
mod grid;
mod save;
mod session;
mod types;

/// Lowest share of cells a preference may request as mines, in percent.
pub const MIN_DENSITY_PERCENT: CellCount = 5;
/// Highest share of cells a preference may request as mines, in percent.
pub const MAX_DENSITY_PERCENT: CellCount = 95;

/// Board dimensions and mine count requested for the next game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
}

impl Preferences {
    pub const DEFAULT_WIDTH: Coord = 10;
    pub const DEFAULT_HEIGHT: Coord = 10;
    pub const DEFAULT_MINES: CellCount = 10;

    pub const fn new_unchecked((width, height): Coord2, mines: CellCount) -> Self {
        Self {
            width,
            height,
            mines,
        }
    }

    /// Clamps the size to at least one cell per axis and the mine count into the density window.
    pub fn new((width, height): Coord2, mines: CellCount) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let (low, high) = Self::mine_range(mult(width, height));
        Self::new_unchecked((width, height), mines.clamp(low, high))
    }

    /// Mine counts accepted for a board of `total_cells`.
    pub fn mine_range(total_cells: CellCount) -> (CellCount, CellCount) {
        let scaled = |percent: CellCount| {
            (u32::from(total_cells) * u32::from(percent) / 100) as CellCount
        };
        let high = scaled(MAX_DENSITY_PERCENT)
            .max(1)
            .min(total_cells.saturating_sub(1));
        let low = scaled(MIN_DENSITY_PERCENT).max(1).min(high);
        (low, high)
    }

    pub fn clamped(self) -> Self {
        Self::new(self.size(), self.mines)
    }

    pub const fn size(&self) -> Coord2 {
        (self.width, self.height)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.width, self.height)
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new_unchecked(
            (Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT),
            Self::DEFAULT_MINES,
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

/// Used to merge outcomes when revealing several cells at once
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preferences_match_classic_board() {
        let prefs = Preferences::default();
        assert_eq!(prefs.size(), (10, 10));
        assert_eq!(prefs.mines, 10);
    }

    #[test]
    fn preferences_clamp_into_density_window() {
        assert_eq!(Preferences::new((10, 10), 1).mines, 5);
        assert_eq!(Preferences::new((10, 10), 99).mines, 95);
        assert_eq!(Preferences::new((10, 10), 40).mines, 40);
    }

    #[test]
    fn preferences_clamp_degenerate_sizes() {
        let prefs = Preferences::new((0, 0), 3);
        assert_eq!(prefs.size(), (1, 1));
        assert_eq!(prefs.mines, 0);

        let prefs = Preferences::new((2, 1), 9);
        assert_eq!(prefs.mines, 1);
    }

    #[test]
    fn hit_mine_dominates_merged_outcomes() {
        use RevealOutcome::*;
        assert_eq!(Revealed | HitMine, HitMine);
        assert_eq!(Won | Revealed, Won);
        assert_eq!(NoChange | NoChange, NoChange);
        assert!(!NoChange.has_update());
    }
}
