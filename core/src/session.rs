use core::mem;

use crate::*;

/// Notifications for the display layer, drained after each action.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// First reveal placed the mines.
    Started,
    Won,
    Lost,
    /// Mine counter display, total mines minus flags.
    MinesLeft(isize),
    /// Inclusive rectangle of cells to repaint.
    CellsChanged { from: Coord2, to: Coord2 },
    /// The whole board needs repainting.
    LayoutChanged,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Ready,
    Active,
    Won,
    Lost,
}

impl SessionState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// One game from first click to win or loss, wrapping a [`MineGrid`].
#[derive(Clone, Debug)]
pub struct GameSession {
    grid: MineGrid,
    layout: Option<PresetMineGenerator>,
    populated: bool,
    events: Vec<GameEvent>,
}

impl GameSession {
    pub fn new(seed: u64, preferences: Preferences) -> Self {
        let mut session = Self {
            grid: MineGrid::new(seed),
            layout: None,
            populated: false,
            events: Vec::new(),
        };
        session.new_game(preferences);
        session
    }

    /// Session whose mines sit at `mine_coords` instead of random positions.
    pub fn with_layout(preferences: Preferences, mine_coords: &[Coord2]) -> Self {
        let mut session = Self::new(0, preferences);
        session.layout = Some(PresetMineGenerator::new(mine_coords));
        session
    }

    pub fn grid(&self) -> &MineGrid {
        &self.grid
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }

    pub fn new_game(&mut self, preferences: Preferences) {
        self.grid
            .reset(preferences.width, preferences.height, preferences.mines);
        self.populated = false;
        self.events.push(GameEvent::MinesLeft(self.mines_left()));
        self.events.push(GameEvent::LayoutChanged);
    }

    pub fn mines_left(&self) -> isize {
        let flagged = self
            .grid
            .iter_cells()
            .filter(|(_, cell)| cell.is_flagged())
            .count();
        self.grid.total_mines() as isize - flagged as isize
    }

    pub fn state(&self) -> SessionState {
        if !self.populated {
            SessionState::Ready
        } else if self.grid.has_revealed_mine() {
            SessionState::Lost
        } else if self.grid.check_win_condition() {
            SessionState::Won
        } else {
            SessionState::Active
        }
    }

    pub fn has_lost(&self) -> bool {
        self.state() == SessionState::Lost
    }

    pub fn is_in_progress(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Opens an unmarked cell, placing the mines first if this is the opening move.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.check_not_finished()?;

        match self.grid.cell(coords) {
            Some(cell) if cell.is_untouched() => {}
            _ => return Ok(RevealOutcome::NoChange),
        }

        if !self.populated {
            self.populate(coords);
        }

        Ok(self.reveal_cells(core::iter::once(coords)))
    }

    /// Opens every unrevealed neighbor of a revealed cell once enough flags surround it.
    pub fn chord(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.check_not_finished()?;

        if !self.can_chord_at(coords) {
            return Ok(RevealOutcome::NoChange);
        }

        let neighbors: Vec<_> = self
            .grid
            .iter_neighbors(coords)
            .filter(|&pos| !self.grid.is_revealed_at(pos))
            .collect();
        Ok(self.reveal_cells(neighbors))
    }

    /// Chords when the flags add up, otherwise highlights the hidden neighbors
    /// until [`GameSession::clear_preview`] is called.
    pub fn preview_chord(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.check_not_finished()?;

        if !self.grid.contains(coords) || !self.grid.is_revealed_at(coords) {
            return Ok(RevealOutcome::NoChange);
        }

        self.grid.clear_highlights();

        if self.can_chord_at(coords) {
            return self.chord(coords);
        }

        let (mut from, mut to) = (coords, coords);
        let hidden: Vec<_> = self
            .grid
            .iter_neighbors(coords)
            .filter(|&pos| !self.grid.is_revealed_at(pos) && !self.grid.is_flagged_at(pos))
            .collect();
        for pos in hidden {
            self.grid.mark_temporary(pos);
            from = (from.0.min(pos.0), from.1.min(pos.1));
            to = (to.0.max(pos.0), to.1.max(pos.1));
        }
        self.events.push(GameEvent::CellsChanged { from, to });

        Ok(RevealOutcome::NoChange)
    }

    pub fn clear_preview(&mut self) {
        self.grid.clear_highlights();
        self.events.push(GameEvent::LayoutChanged);
    }

    /// Cycles the mark of a hidden cell and updates the mine counter.
    pub fn toggle_mark(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        self.check_not_finished()?;

        let outcome = self.grid.toggle_mark(coords);
        if outcome.has_update() {
            self.events.push(GameEvent::MinesLeft(self.mines_left()));
            self.events.push(GameEvent::CellsChanged {
                from: coords,
                to: coords,
            });
        }
        Ok(outcome)
    }

    /// Replaces the current game with a decoded save.
    pub fn restore(&mut self, save: &SaveFile) -> SaveResult<LoadedGame> {
        let loaded = save.restore(&mut self.grid)?;
        self.populated = save
            .cells()
            .iter()
            .any(|cell| cell.mine || cell.is_revealed());
        self.events.push(GameEvent::MinesLeft(self.mines_left()));
        self.events.push(GameEvent::LayoutChanged);
        Ok(loaded)
    }

    fn populate(&mut self, safe: Coord2) {
        match self.layout.as_mut() {
            Some(layout) => self.grid.populate_with(layout, safe),
            None => self.grid.populate(safe),
        }
        self.populated = true;
        log::debug!("Game started at {:?}", safe);
        self.events.push(GameEvent::Started);
    }

    fn reveal_cells(&mut self, cells: impl IntoIterator<Item = Coord2>) -> RevealOutcome {
        let revealed_before = self.grid.revealed_count();

        let mut outcome = RevealOutcome::NoChange;
        let mut direct: CellCount = 0;
        let mut changed: Option<(Coord2, Coord2)> = None;
        for coords in cells {
            let step = self.grid.discover_flood(coords);
            if step.has_update() {
                direct += 1;
                changed = Some(match changed {
                    None => (coords, coords),
                    Some((from, to)) => (
                        (from.0.min(coords.0), from.1.min(coords.1)),
                        (to.0.max(coords.0), to.1.max(coords.1)),
                    ),
                });
            }
            outcome = outcome | step;
        }

        // a flood opened cells outside the requested ones
        let opened = self.grid.revealed_count() - revealed_before;
        match changed {
            Some((from, to)) if opened == direct => {
                self.events.push(GameEvent::CellsChanged { from, to })
            }
            Some(_) => self.events.push(GameEvent::LayoutChanged),
            None => {}
        }

        match outcome {
            RevealOutcome::HitMine => {
                log::debug!("Mine hit, game lost");
                self.events.push(GameEvent::Lost);
            }
            RevealOutcome::Won => {
                log::debug!("All safe cells open, game won");
                self.events.push(GameEvent::Won);
            }
            _ => {}
        }
        outcome
    }

    fn can_chord_at(&self, coords: Coord2) -> bool {
        self.grid.contains(coords)
            && self.grid.is_revealed_at(coords)
            && self.grid.neighbor_count_at(coords) == self.grid.count_flagged_neighbors(coords)
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state().is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}
