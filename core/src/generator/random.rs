use rand::prelude::*;

use super::*;

/// Uniform placement by rejection sampling, only the safe cell is guaranteed mine-free.
#[derive(Clone, Debug)]
pub struct RandomMineGenerator {
    rng: SmallRng,
}

impl RandomMineGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(&mut self, config: Preferences, safe: Coord2) -> Array2<bool> {
        let (width, height) = config.size();
        let mut mines: Array2<bool> = Array2::default((usize::from(height), usize::from(width)));
        let total_cells = usize::from(config.total_cells());
        let wanted = usize::from(config.mines);

        if wanted >= total_cells {
            log::warn!(
                "Total mine number {} does not fit in {} cells, grid left empty",
                wanted,
                total_cells
            );
            return mines;
        }

        // a safe cell outside the grid excludes nothing
        let safe_index = (safe.0 < width && safe.1 < height)
            .then(|| usize::from(safe.1) * usize::from(width) + usize::from(safe.0));

        let Some(cells) = mines.as_slice_mut() else {
            log::warn!("Mine mask is not contiguous, grid left empty");
            return mines;
        };

        let mut placed = 0;
        while placed < wanted {
            let index = self.rng.random_range(0..total_cells);
            if !cells[index] && Some(index) != safe_index {
                cells[index] = true;
                placed += 1;
            }
        }
        log::debug!("Placed {} mines, skipping {:?}", placed, safe);

        mines
    }
}
