use core::str::FromStr;
use ini::Ini;
use std::fs;
use std::path::{Path, PathBuf};

use crate::*;

/// File name of the resume-last-session save inside the data directory.
pub const QUICKSAVE_FILE: &str = "quicksave.ini";

pub type SaveResult<T> = core::result::Result<T, SaveError>;

pub fn quick_save_path(data_dir: impl AsRef<Path>) -> PathBuf {
    data_dir.as_ref().join(QUICKSAVE_FILE)
}

/// Everything a save file holds, decoupled from the live grid and clock.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveFile {
    pub preferences: Preferences,
    pub timer: TimerSnapshot,
    cells: Vec<Cell>,
}

/// What a successful load hands back besides the restored grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LoadedGame {
    pub preferences: Preferences,
    pub timer: TimerSnapshot,
}

impl SaveFile {
    pub fn capture(grid: &MineGrid, timer: TimerSnapshot) -> Self {
        Self {
            preferences: grid.preferences(),
            timer,
            cells: grid.iter_cells().map(|(_, cell)| *cell).collect(),
        }
    }

    /// Row-major cell states.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Resets `grid` to the saved dimensions and copies every cell in verbatim.
    pub fn restore(&self, grid: &mut MineGrid) -> SaveResult<LoadedGame> {
        grid.restore(self.preferences, self.cells.clone())?;
        Ok(LoadedGame {
            preferences: self.preferences,
            timer: self.timer,
        })
    }

    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some("Game"))
            .set("width", self.preferences.width.to_string())
            .set("height", self.preferences.height.to_string())
            .set("mine", self.preferences.mines.to_string());
        ini.with_section(Some("Timer"))
            .set("elapsed", self.timer.elapsed_secs.to_string())
            .set("running", self.timer.running.to_string());

        let width = usize::from(self.preferences.width).max(1);
        for (index, cell) in self.cells.iter().enumerate() {
            let (x, y) = (index % width, index / width);
            ini.with_section(Some(cell_section(x, y)))
                .set("mine", u8::from(cell.mine).to_string())
                .set("discovered", cell.discovery.code().to_string())
                .set("disarmed", cell.mark.code().to_string())
                .set("neighbours", cell.neighbors.to_string());
        }
        ini
    }

    /// Decodes a whole save, rejecting it on the first missing or malformed key.
    pub fn from_ini(ini: &Ini) -> SaveResult<Self> {
        if ini.get_from(Some("Game"), "width").is_none() {
            return Err(SaveError::NotASave);
        }

        let width: u64 = required(ini, "Game", "width")?;
        let height: u64 = required(ini, "Game", "height")?;
        let (width, height) = match (Coord::try_from(width), Coord::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(SaveError::InvalidDimensions { width, height }),
        };
        let mines: CellCount = required(ini, "Game", "mine")?;

        let timer = TimerSnapshot {
            elapsed_secs: optional(ini, "Timer", "elapsed")?.unwrap_or_default(),
            running: optional(ini, "Timer", "running")?.unwrap_or_default(),
        };

        let mut cells = Vec::with_capacity(usize::from(mult(width, height)));
        for y in 0..height {
            for x in 0..width {
                cells.push(read_cell(ini, x, y)?);
            }
        }
        log::debug!("Decoded {}x{} save with {} mines", width, height, mines);

        Ok(Self {
            preferences: Preferences::new_unchecked((width, height), mines),
            timer,
            cells,
        })
    }

    pub fn parse(text: &str) -> SaveResult<Self> {
        Self::from_ini(&Ini::load_from_str(text)?)
    }

    pub fn to_ini_string(&self) -> SaveResult<String> {
        let mut buffer = Vec::new();
        self.to_ini().write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    pub fn read(path: impl AsRef<Path>) -> SaveResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// A failed write may leave a truncated file behind.
    pub fn write(&self, path: impl AsRef<Path>) -> SaveResult<()> {
        self.to_ini().write_to_file(path)?;
        Ok(())
    }
}

/// Writes `grid` and the timer state to `path`.
pub fn save_game(path: impl AsRef<Path>, grid: &MineGrid, timer: TimerSnapshot) -> SaveResult<()> {
    let path = path.as_ref();
    SaveFile::capture(grid, timer).write(path)?;
    log::info!("Saved game to {}", path.display());
    Ok(())
}

/// Loads `path` into `grid`. The grid is untouched unless the whole file decodes.
pub fn load_game(path: impl AsRef<Path>, grid: &mut MineGrid) -> SaveResult<LoadedGame> {
    let path = path.as_ref();
    let loaded = SaveFile::read(path)?.restore(grid)?;
    log::info!("Loaded game from {}", path.display());
    Ok(loaded)
}

pub fn quick_save(data_dir: impl AsRef<Path>, grid: &MineGrid, timer: TimerSnapshot) -> SaveResult<()> {
    save_game(quick_save_path(data_dir), grid, timer)
}

pub fn quick_load(data_dir: impl AsRef<Path>, grid: &mut MineGrid) -> SaveResult<LoadedGame> {
    load_game(quick_save_path(data_dir), grid)
}

pub fn has_quick_save(data_dir: impl AsRef<Path>) -> bool {
    quick_save_path(data_dir).is_file()
}

pub fn discard_quick_save(data_dir: impl AsRef<Path>) -> SaveResult<()> {
    let path = quick_save_path(data_dir);
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Elapsed seconds stored in a save, without decoding the board.
pub fn read_elapsed(path: impl AsRef<Path>) -> SaveResult<u32> {
    let ini = Ini::load_from_str(&fs::read_to_string(path)?)?;
    Ok(optional(&ini, "Timer", "elapsed")?.unwrap_or_default())
}

fn cell_section(x: impl core::fmt::Display, y: impl core::fmt::Display) -> String {
    format!("Board/Cell_{x}_{y}")
}

fn read_cell(ini: &Ini, x: Coord, y: Coord) -> SaveResult<Cell> {
    let section = cell_section(x, y);
    let invalid = || SaveError::InvalidCell { x, y };

    let mine = match required::<u8>(ini, &section, "mine")? {
        0 => false,
        1 => true,
        _ => return Err(invalid()),
    };
    let discovery = Discovery::from_code(required(ini, &section, "discovered")?).ok_or_else(invalid)?;
    let mark = Mark::from_code(required(ini, &section, "disarmed")?).ok_or_else(invalid)?;
    let neighbors = required(ini, &section, "neighbours")?;

    let cell = Cell {
        mine,
        discovery,
        mark,
        neighbors,
        highlighted: false,
    };
    cell.validate().map_err(|_| invalid())?;
    Ok(cell)
}

fn required<T: FromStr>(ini: &Ini, section: &str, key: &str) -> SaveResult<T> {
    optional(ini, section, key)?.ok_or_else(|| SaveError::MissingKey(format!("{section}/{key}")))
}

fn optional<T: FromStr>(ini: &Ini, section: &str, key: &str) -> SaveResult<Option<T>> {
    let Some(raw) = ini.get_from(Some(section), key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| SaveError::InvalidValue {
            key: format!("{section}/{key}"),
            value: raw.to_owned(),
        })
}
