use ndarray::Array2;

use crate::*;

/// Rectangular minefield with per-cell discovery and mark state.
///
/// Every query and mutator tolerates coordinates outside the grid: mutators do
/// nothing and queries answer with a safe default, so neighbor probing needs no
/// bounds checks at the call site.
#[derive(Clone, Debug)]
pub struct MineGrid {
    width: Coord,
    height: Coord,
    cells: Array2<Cell>,
    total_mines: CellCount,
    revealed_count: CellCount,
    generator: RandomMineGenerator,
}

impl MineGrid {
    /// Empty `0x0` grid whose population draws from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            width: 0,
            height: 0,
            cells: Array2::default((0, 0)),
            total_mines: 0,
            revealed_count: 0,
            generator: RandomMineGenerator::new(seed),
        }
    }

    pub fn width(&self) -> Coord {
        self.width
    }

    pub fn height(&self) -> Coord {
        self.height
    }

    pub fn dimensions(&self) -> Coord2 {
        (self.width, self.height)
    }

    pub fn size(&self) -> CellCount {
        mult(self.width, self.height)
    }

    pub fn total_mines(&self) -> CellCount {
        self.total_mines
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::new_unchecked(self.dimensions(), self.total_mines)
    }

    /// Discards all cells and prepares an unpopulated `width x height` grid.
    pub fn reset(&mut self, width: Coord, height: Coord, mines: CellCount) {
        self.width = width;
        self.height = height;
        self.total_mines = mines;
        self.revealed_count = 0;
        self.cells = Array2::default((usize::from(height), usize::from(width)));
    }

    /// Places mines with the owned random generator, never on `safe`.
    pub fn populate(&mut self, safe: Coord2) {
        let mut generator = self.generator.clone();
        self.populate_with(&mut generator, safe);
        self.generator = generator;
    }

    /// Places mines from `generator`, then computes every neighbor count once.
    pub fn populate_with(&mut self, generator: &mut impl MineGenerator, safe: Coord2) {
        let mask = generator.generate(self.preferences(), safe);
        if mask.dim() != self.cells.dim() {
            log::warn!(
                "Generated mine mask {:?} does not match grid {:?}, grid left empty",
                mask.dim(),
                self.cells.dim()
            );
            return;
        }

        for (cell, &mine) in self.cells.iter_mut().zip(mask.iter()) {
            cell.mine = mine;
        }
        self.compute_neighbors();
    }

    fn compute_neighbors(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                let count = self
                    .iter_neighbors((x, y))
                    .filter(|&pos| self.mine_at(pos))
                    .count();
                self.cells[(x, y).to_nd_index()].neighbors = count as u8;
            }
        }
    }

    /// Reveals a single cell. Flagged, revealed and out-of-range cells are left alone.
    pub fn discover(&mut self, coords: Coord2) -> RevealOutcome {
        let Some(cell) = self.cell_mut(coords) else {
            return RevealOutcome::NoChange;
        };
        if cell.is_revealed() || cell.is_flagged() {
            return RevealOutcome::NoChange;
        }

        cell.discovery = Discovery::Revealed;
        cell.mark = Mark::None;
        let (mine, neighbors) = (cell.mine, cell.neighbors);
        self.revealed_count += 1;
        log::debug!("Open cell at {:?}, mine count: {}", coords, neighbors);

        if mine {
            RevealOutcome::HitMine
        } else if self.check_win_condition() {
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    /// Reveals a cell and cascades through every zero-count region it touches.
    pub fn discover_flood(&mut self, coords: Coord2) -> RevealOutcome {
        let mut outcome = self.discover(coords);
        if !outcome.has_update() || !self.opens_area(coords) {
            return outcome;
        }

        let mut to_visit: Vec<Coord2> = self
            .iter_neighbors(coords)
            .filter(|&pos| !self.is_revealed_at(pos))
            .collect();
        log::trace!(
            "Starting flood-fill from {:?}, initial neighbors: {:?}",
            coords,
            to_visit
        );

        while let Some(visit_coords) = to_visit.pop() {
            let step = self.discover(visit_coords);
            if !step.has_update() {
                continue;
            }
            outcome = outcome | step;

            if self.opens_area(visit_coords) {
                to_visit.extend(
                    self.iter_neighbors(visit_coords)
                        .filter(|&pos| !self.is_revealed_at(pos)),
                );
            }
        }

        outcome
    }

    /// A revealed-safe cell with no mine around it exposes its neighbors.
    fn opens_area(&self, coords: Coord2) -> bool {
        !self.mine_at(coords) && self.neighbor_count_at(coords) == 0
    }

    /// Cycles the mark of a hidden cell through none, flagged and questioned.
    pub fn toggle_mark(&mut self, coords: Coord2) -> MarkOutcome {
        match self.cell_mut(coords) {
            Some(cell) if !cell.is_revealed() => {
                cell.mark = cell.mark.cycled();
                MarkOutcome::Changed
            }
            _ => MarkOutcome::NoChange,
        }
    }

    pub fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| self.is_flagged_at(pos))
            .count() as u8
    }

    /// Every non-mine cell has been revealed. Flags on mines are not required.
    pub fn check_win_condition(&self) -> bool {
        let remaining = i64::from(self.size())
            - i64::from(self.revealed_count)
            - i64::from(self.total_mines);
        remaining == 0
    }

    /// A mine has been revealed.
    pub fn has_revealed_mine(&self) -> bool {
        self.cells.iter().any(|cell| cell.mine && cell.is_revealed())
    }

    pub fn contains(&self, (x, y): Coord2) -> bool {
        x < self.width && y < self.height
    }

    pub fn cell(&self, coords: Coord2) -> Option<&Cell> {
        if self.contains(coords) {
            Some(&self.cells[coords.to_nd_index()])
        } else {
            None
        }
    }

    fn cell_mut(&mut self, coords: Coord2) -> Option<&mut Cell> {
        if self.contains(coords) {
            Some(&mut self.cells[coords.to_nd_index()])
        } else {
            None
        }
    }

    /// Cells in row-major order with their coordinates.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Coord2, &Cell)> {
        self.cells
            .indexed_iter()
            .map(|((y, x), cell)| ((x as Coord, y as Coord), cell))
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.dimensions())
    }

    pub fn mine_at(&self, coords: Coord2) -> bool {
        self.cell(coords).is_some_and(|cell| cell.mine)
    }

    pub fn neighbor_count_at(&self, coords: Coord2) -> u8 {
        self.cell(coords).map_or(0, |cell| cell.neighbors)
    }

    /// Out-of-range cells count as already revealed.
    pub fn is_revealed_at(&self, coords: Coord2) -> bool {
        self.cell(coords).is_none_or(|cell| cell.is_revealed())
    }

    pub fn is_flagged_at(&self, coords: Coord2) -> bool {
        self.cell(coords).is_some_and(|cell| cell.is_flagged())
    }

    pub fn mark_at(&self, coords: Coord2) -> Mark {
        self.cell(coords).map_or(Mark::None, |cell| cell.mark)
    }

    pub fn mark_temporary(&mut self, coords: Coord2) {
        if let Some(cell) = self.cell_mut(coords) {
            cell.highlighted = true;
        }
    }

    pub fn clear_highlights(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.highlighted = false;
        }
    }

    /// Replaces the whole grid with trusted cell data in row-major order.
    ///
    /// The cells are checked before anything is touched, so a rejected restore
    /// leaves the grid as it was. The revealed count is derived from the cells.
    pub fn restore(&mut self, preferences: Preferences, cells: Vec<Cell>) -> Result<()> {
        let (width, height) = preferences.size();
        let shape = (usize::from(height), usize::from(width));
        let cells = Array2::from_shape_vec(shape, cells).map_err(|_| GameError::InvalidBoardShape)?;
        for cell in cells.iter() {
            cell.validate()?;
        }

        let revealed_count = cells.iter().filter(|cell| cell.is_revealed()).count();

        self.reset(width, height, preferences.mines);
        self.cells = cells;
        self.revealed_count = revealed_count as CellCount;
        Ok(())
    }
}

impl PartialEq for MineGrid {
    /// Grids are equal when they hold the same game state; the random source is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.dimensions() == other.dimensions()
            && self.total_mines == other.total_mines
            && self.revealed_count == other.revealed_count
            && self
                .cells
                .iter()
                .zip(other.cells.iter())
                .all(|(a, b)| a.same_state(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(size: Coord2, mines: &[Coord2]) -> MineGrid {
        let mut grid = MineGrid::new(0);
        grid.reset(size.0, size.1, mines.len() as CellCount);
        grid.populate_with(&mut PresetMineGenerator::new(mines), (0, 0));
        grid
    }

    fn mined_cells(grid: &MineGrid) -> usize {
        grid.iter_cells().filter(|(_, cell)| cell.mine).count()
    }

    #[test]
    fn reset_clears_previous_state() {
        let mut grid = MineGrid::new(1);
        grid.reset(5, 5, 3);
        grid.populate((0, 0));
        grid.discover((1, 1));
        grid.toggle_mark((2, 2));

        grid.reset(5, 5, 3);

        assert_eq!(grid.revealed_count(), 0);
        for (_, cell) in grid.iter_cells() {
            assert_eq!(*cell, Cell::default());
        }
    }

    #[test]
    fn reset_accepts_new_dimensions() {
        let mut grid = MineGrid::new(1);
        grid.reset(5, 5, 3);
        grid.reset(4, 3, 2);
        assert_eq!(grid.dimensions(), (4, 3));
        assert_eq!(grid.total_mines(), 2);
        assert_eq!(grid.size(), 12);
    }

    #[test]
    fn zero_size_grid_is_empty() {
        let mut grid = MineGrid::new(1);
        grid.reset(0, 0, 0);
        assert_eq!(grid.size(), 0);
        grid.populate((0, 0));
        assert_eq!(mined_cells(&grid), 0);
        assert!(grid.check_win_condition());
    }

    #[test]
    fn populate_places_exact_mine_count_outside_safe_cell() {
        let mut grid = MineGrid::new(99);
        grid.reset(5, 5, 3);
        grid.populate((0, 0));

        assert_eq!(mined_cells(&grid), 3);
        assert!(!grid.mine_at((0, 0)));
    }

    #[test]
    fn populate_fills_everything_but_safe_cell() {
        let mut grid = MineGrid::new(5);
        grid.reset(3, 3, 8);
        grid.populate((1, 1));

        assert!(!grid.mine_at((1, 1)));
        assert_eq!(mined_cells(&grid), 8);
        assert_eq!(grid.neighbor_count_at((1, 1)), 8);
    }

    #[test]
    fn populate_with_too_many_mines_leaves_grid_empty() {
        let mut grid = MineGrid::new(5);
        grid.reset(2, 2, 5);
        grid.populate((0, 0));
        assert_eq!(mined_cells(&grid), 0);
    }

    #[test]
    fn neighbor_counts_exclude_the_cell_itself() {
        let grid = grid((3, 3), &[(1, 1)]);
        assert_eq!(grid.neighbor_count_at((1, 1)), 0);
        assert_eq!(grid.neighbor_count_at((0, 0)), 1);
        assert_eq!(grid.neighbor_count_at((2, 2)), 1);
    }

    #[test]
    fn neighbor_counts_on_corners_ignore_outside() {
        let grid = grid((3, 2), &[(0, 0), (2, 1)]);
        assert_eq!(grid.neighbor_count_at((1, 0)), 2);
        assert_eq!(grid.neighbor_count_at((0, 1)), 1);
        assert_eq!(grid.neighbor_count_at((2, 0)), 1);
    }

    #[test]
    fn queries_outside_grid_return_safe_defaults() {
        let grid = grid((2, 2), &[(1, 1)]);
        assert!(!grid.mine_at((2, 0)));
        assert!(!grid.mine_at((100, 100)));
        assert_eq!(grid.neighbor_count_at((5, 5)), 0);
        assert!(grid.is_revealed_at((2, 2)));
        assert!(!grid.is_flagged_at((9, 0)));
        assert!(grid.cell((0, 2)).is_none());
    }

    #[test]
    fn mutators_outside_grid_do_nothing() {
        let mut grid = grid((2, 2), &[(1, 1)]);
        assert_eq!(grid.discover((2, 2)), RevealOutcome::NoChange);
        assert_eq!(grid.toggle_mark((0, 9)), MarkOutcome::NoChange);
        grid.mark_temporary((7, 7));
        assert_eq!(grid.revealed_count(), 0);
        assert!(grid.iter_cells().all(|(_, cell)| cell.is_untouched()));
    }

    #[test]
    fn discover_counts_each_cell_once() {
        let mut grid = grid((3, 3), &[(2, 2)]);
        assert_eq!(grid.discover((1, 1)), RevealOutcome::Revealed);
        assert_eq!(grid.discover((1, 1)), RevealOutcome::NoChange);
        assert_eq!(grid.discover((1, 1)), RevealOutcome::NoChange);
        assert_eq!(grid.revealed_count(), 1);
    }

    #[test]
    fn discover_skips_flagged_cells() {
        let mut grid = grid((3, 3), &[(2, 2)]);
        grid.toggle_mark((1, 1));
        assert_eq!(grid.discover((1, 1)), RevealOutcome::NoChange);
        assert!(!grid.is_revealed_at((1, 1)));
    }

    #[test]
    fn discover_reveals_questioned_cells_and_clears_mark() {
        let mut grid = grid((3, 3), &[(2, 2)]);
        grid.toggle_mark((1, 1));
        grid.toggle_mark((1, 1));
        assert_eq!(grid.mark_at((1, 1)), Mark::Questioned);

        assert_eq!(grid.discover((1, 1)), RevealOutcome::Revealed);
        assert_eq!(grid.mark_at((1, 1)), Mark::None);
    }

    #[test]
    fn toggle_mark_cycles_through_three_states() {
        let mut grid = grid((3, 3), &[]);
        let mut seen = Vec::new();
        for _ in 0..4 {
            grid.toggle_mark((2, 2));
            seen.push(grid.mark_at((2, 2)));
        }
        assert_eq!(
            seen,
            vec![Mark::Flagged, Mark::Questioned, Mark::None, Mark::Flagged]
        );
    }

    #[test]
    fn toggle_mark_ignores_revealed_cells() {
        let mut grid = grid((3, 3), &[(2, 2)]);
        grid.discover((0, 0));
        assert_eq!(grid.toggle_mark((0, 0)), MarkOutcome::NoChange);
        assert_eq!(grid.mark_at((0, 0)), Mark::None);
    }

    #[test]
    fn count_flagged_neighbors_ignores_questions_and_self() {
        let mut grid = grid((3, 3), &[]);
        grid.toggle_mark((0, 0));
        grid.toggle_mark((1, 0));
        grid.toggle_mark((2, 2));
        grid.toggle_mark((2, 2));
        grid.toggle_mark((1, 1));

        assert_eq!(grid.count_flagged_neighbors((1, 1)), 2);
        assert_eq!(grid.count_flagged_neighbors((0, 1)), 3);
    }

    #[test]
    fn win_after_all_safe_cells_of_small_board() {
        let mut grid = MineGrid::new(17);
        grid.reset(2, 2, 1);
        grid.populate((0, 0));
        assert!(!grid.check_win_condition());

        let mut mine = None;
        for y in 0..2 {
            for x in 0..2 {
                if grid.mine_at((x, y)) {
                    mine = Some((x, y));
                } else {
                    grid.discover((x, y));
                }
            }
        }
        assert!(grid.check_win_condition());

        let mine = mine.unwrap();
        assert_eq!(grid.discover(mine), RevealOutcome::HitMine);
        assert!(grid.is_revealed_at(mine));
        assert!(!grid.check_win_condition());
    }

    #[test]
    fn win_does_not_need_flags() {
        let mut grid = grid((2, 1), &[(0, 0)]);
        assert_eq!(grid.discover((1, 0)), RevealOutcome::Won);
        assert!(grid.check_win_condition());
        assert!(!grid.is_flagged_at((0, 0)));
    }

    #[test]
    fn flood_opens_mine_free_board() {
        let mut grid = MineGrid::new(3);
        grid.reset(3, 3, 0);
        grid.populate((0, 0));

        assert_eq!(grid.discover_flood((0, 0)), RevealOutcome::Won);
        assert_eq!(grid.revealed_count(), 9);
        assert!(grid.iter_cells().all(|(_, cell)| cell.is_revealed()));
    }

    #[test]
    fn flood_stops_at_numbered_border() {
        let mut grid = grid((4, 4), &[(3, 3)]);
        assert_eq!(grid.discover_flood((0, 0)), RevealOutcome::Won);
        assert!(!grid.is_revealed_at((3, 3)));
        assert_eq!(grid.revealed_count(), 15);
    }

    #[test]
    fn flood_respects_flags() {
        let mut grid = grid((5, 1), &[(4, 0)]);
        grid.toggle_mark((2, 0));
        assert_eq!(grid.discover_flood((0, 0)), RevealOutcome::Revealed);

        assert!(grid.is_revealed_at((1, 0)));
        assert!(!grid.is_revealed_at((2, 0)));
        assert!(!grid.is_revealed_at((3, 0)));
    }

    #[test]
    fn flood_from_numbered_cell_opens_only_it() {
        let mut grid = grid((3, 3), &[(2, 2)]);
        assert_eq!(grid.discover_flood((1, 1)), RevealOutcome::Revealed);
        assert_eq!(grid.revealed_count(), 1);
    }

    #[test]
    fn highlights_are_set_individually_and_cleared_in_bulk() {
        let mut grid = grid((3, 3), &[]);
        grid.mark_temporary((0, 0));
        grid.mark_temporary((2, 1));
        assert!(grid.cell((2, 1)).unwrap().highlighted);

        grid.clear_highlights();
        assert!(grid.iter_cells().all(|(_, cell)| !cell.highlighted));
    }

    #[test]
    fn restore_rejects_wrong_shape_without_touching_grid() {
        let mut grid = grid((2, 2), &[(1, 1)]);
        grid.discover((0, 0));
        let before = grid.clone();

        let result = grid.restore(Preferences::new_unchecked((3, 3), 1), vec![Cell::default(); 4]);

        assert_eq!(result, Err(GameError::InvalidBoardShape));
        assert_eq!(grid, before);
    }

    #[test]
    fn restore_recomputes_revealed_count() {
        let mut grid = MineGrid::new(0);
        let mut cells = vec![Cell::default(); 4];
        cells[1].discovery = Discovery::Revealed;
        cells[2].discovery = Discovery::Revealed;
        cells[3].mine = true;

        grid.restore(Preferences::new_unchecked((2, 2), 1), cells).unwrap();

        assert_eq!(grid.revealed_count(), 2);
        assert!(grid.is_revealed_at((1, 0)));
        assert!(grid.is_revealed_at((0, 1)));
        assert!(grid.mine_at((1, 1)));
    }
}
