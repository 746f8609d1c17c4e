use super::*;

/// Fixed mine positions, for replays and tests. Ignores the safe cell.
#[derive(Clone, Debug, PartialEq)]
pub struct PresetMineGenerator {
    mine_coords: Vec<Coord2>,
}

impl PresetMineGenerator {
    pub fn new(mine_coords: &[Coord2]) -> Self {
        Self {
            mine_coords: mine_coords.to_vec(),
        }
    }
}

impl MineGenerator for PresetMineGenerator {
    fn generate(&mut self, config: Preferences, _safe: Coord2) -> Array2<bool> {
        let (width, height) = config.size();
        let mut mines: Array2<bool> = Array2::default((usize::from(height), usize::from(width)));

        for &coords in &self.mine_coords {
            if coords.0 >= width || coords.1 >= height {
                log::warn!("Preset mine {:?} is outside the {}x{} grid", coords, width, height);
                continue;
            }
            mines[coords.to_nd_index()] = true;
        }

        mines
    }
}
