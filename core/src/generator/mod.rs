use ndarray::Array2;

use crate::*;
pub use preset::*;
pub use random::*;

mod preset;
mod random;

/// Source of mine layouts for [`MineGrid::populate_with`].
///
/// The returned mask is indexed `[y, x]` and must have the shape of `config`.
pub trait MineGenerator {
    fn generate(&mut self, config: Preferences, safe: Coord2) -> Array2<bool>;
}
