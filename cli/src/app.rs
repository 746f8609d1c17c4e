use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doomsweeper_core::*;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::render::{render_board, render_status};
use crate::settings::Settings;

/// One line of player input.
#[derive(Debug, Parser)]
#[command(multicall = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open a cell, the first one never holds a mine
    #[command(visible_alias = "r")]
    Reveal { x: Coord, y: Coord },
    /// Cycle flag, question mark and nothing on a hidden cell
    #[command(visible_alias = "m")]
    Mark { x: Coord, y: Coord },
    /// Open the neighbors of a numbered cell whose flags are all placed
    #[command(visible_alias = "c")]
    Chord { x: Coord, y: Coord },
    /// Highlight the hidden neighbors of a numbered cell
    #[command(visible_alias = "p")]
    Peek { x: Coord, y: Coord },
    /// Start over, optionally with a new board that becomes the default
    New {
        width: Option<Coord>,
        height: Option<Coord>,
        mines: Option<CellCount>,
    },
    Save { path: PathBuf },
    Load { path: PathBuf },
    #[command(name = "qs")]
    QuickSave,
    #[command(name = "ql")]
    QuickLoad,
    /// Toggle showing mines on hidden cells
    Debug,
    #[command(visible_alias = "q")]
    Quit,
}

enum Flow {
    Continue,
    Quit,
}

/// Terminal game loop wiring a session, its clock and persistence together.
pub struct App {
    session: GameSession,
    clock: GameClock,
    settings: Settings,
    data_dir: PathBuf,
}

impl App {
    pub fn new(seed: u64, settings: Settings, data_dir: PathBuf) -> Self {
        Self {
            session: GameSession::new(seed, settings.preferences),
            clock: GameClock::new(),
            settings,
            data_dir,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Offers the quick save left by an interrupted game. A declined resume deletes it.
    pub fn resume(&mut self, accept: bool, out: &mut impl Write) -> Result<bool> {
        if !has_quick_save(&self.data_dir) {
            return Ok(false);
        }
        if accept {
            match SaveFile::read(quick_save_path(&self.data_dir)) {
                Ok(save) => {
                    self.restore(&save)?;
                    writeln!(out, "Game resumed from auto-save")?;
                    return Ok(true);
                }
                Err(err) => log::warn!("Auto-save unusable: {err}"),
            }
        }
        discard_quick_save(&self.data_dir).context("removing auto-save")?;
        Ok(false)
    }

    pub fn run(&mut self, input: impl BufRead, mut out: impl Write) -> Result<()> {
        self.show(&mut out)?;
        for line in input.lines() {
            let line = line.context("reading input")?;
            if line.trim().is_empty() {
                continue;
            }

            let command = match Line::try_parse_from(line.split_whitespace()) {
                Ok(parsed) => parsed.command,
                Err(err) => {
                    write!(out, "{}", err.render())?;
                    continue;
                }
            };

            match self.execute(command, &mut out) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(err) => writeln!(out, "error: {err:#}")?,
            }
            self.show(&mut out)?;
        }
        self.shutdown()
    }

    /// Quick-saves an unfinished game and stores settings.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.session.is_in_progress() {
            quick_save(&self.data_dir, self.session.grid(), self.clock.snapshot())
                .context("writing auto-save")?;
        }
        self.settings.store(&self.data_dir)
    }

    fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<Flow> {
        match command {
            Command::Reveal { x, y } => report(self.session.reveal((x, y)), out)?,
            Command::Chord { x, y } => report(self.session.chord((x, y)), out)?,
            Command::Peek { x, y } => {
                report(self.session.preview_chord((x, y)), out)?;
                self.show(out)?;
                self.session.clear_preview();
            }
            Command::Mark { x, y } => {
                if let Err(err) = self.session.toggle_mark((x, y)) {
                    writeln!(out, "{err}")?;
                }
            }
            Command::New {
                width,
                height,
                mines,
            } => {
                let current = self.settings.preferences;
                let preferences = Preferences::new(
                    (width.unwrap_or(current.width), height.unwrap_or(current.height)),
                    mines.unwrap_or(current.mines),
                );
                self.settings.preferences = preferences;
                self.new_game();
            }
            Command::Save { path } => {
                save_game(&path, self.session.grid(), self.clock.snapshot())
                    .with_context(|| format!("saving to {}", path.display()))?;
                writeln!(out, "Saved to {}", path.display())?;
            }
            Command::Load { path } => {
                let save = SaveFile::read(&path)
                    .with_context(|| format!("loading {}", path.display()))?;
                self.restore(&save)?;
            }
            Command::QuickSave => {
                quick_save(&self.data_dir, self.session.grid(), self.clock.snapshot())
                    .context("quick save")?;
                writeln!(out, "Saved to {}", quick_save_path(&self.data_dir).display())?;
            }
            Command::QuickLoad => {
                let save = SaveFile::read(quick_save_path(&self.data_dir)).context("quick load")?;
                self.restore(&save)?;
            }
            Command::Debug => self.settings.debug_mode = !self.settings.debug_mode,
            Command::Quit => return Ok(Flow::Quit),
        }
        self.handle_events(out)?;
        Ok(Flow::Continue)
    }

    fn new_game(&mut self) {
        self.clock.reset();
        self.session.new_game(self.settings.preferences);
    }

    fn restore(&mut self, save: &SaveFile) -> Result<()> {
        let loaded = self.session.restore(save)?;
        self.settings.preferences = loaded.preferences;
        self.clock.restore(loaded.timer);
        if !self.session.is_in_progress() {
            self.clock.pause();
        }
        Ok(())
    }

    fn handle_events(&mut self, out: &mut impl Write) -> Result<()> {
        for event in self.session.drain_events() {
            match event {
                GameEvent::Started => self.clock.start(),
                GameEvent::Won => {
                    self.clock.pause();
                    writeln!(out, "You win in {} seconds!", self.clock.elapsed_secs())?;
                }
                GameEvent::Lost => {
                    self.clock.pause();
                    writeln!(out, "Boom. Game over.")?;
                }
                GameEvent::MinesLeft(_)
                | GameEvent::CellsChanged { .. }
                | GameEvent::LayoutChanged => {}
            }
        }
        Ok(())
    }

    fn show(&self, out: &mut impl Write) -> Result<()> {
        let show_mines = self.settings.debug_mode || self.session.has_lost();
        write!(out, "{}", render_board(self.session.grid(), show_mines))?;
        writeln!(out, "{}", render_status(&self.session, self.clock.elapsed_secs()))?;
        Ok(())
    }
}

fn report(result: doomsweeper_core::Result<RevealOutcome>, out: &mut impl Write) -> Result<()> {
    match result {
        Ok(outcome) => log::trace!("Reveal outcome {:?}", outcome),
        Err(err) => writeln!(out, "{err}")?,
    }
    Ok(())
}
