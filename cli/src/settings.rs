use anyhow::{Context, Result};
use doomsweeper_core::Preferences;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Player settings kept between runs, stored next to the quick save.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Show mines on hidden cells
    pub debug_mode: bool,
    /// Board used by the next new game
    pub preferences: Preferences,
}

impl Settings {
    pub const FILE: &'static str = "settings.toml";

    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::FILE)
    }

    /// Missing file means first run, so defaults are returned.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = Self::path(data_dir);
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut settings: Self =
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        settings.preferences = settings.preferences.clamped();
        Ok(settings)
    }

    pub fn store(&self, data_dir: &Path) -> Result<()> {
        let path = Self::path(data_dir);
        let text = toml::to_string_pretty(self).context("encoding settings")?;
        fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load(dir.path()).unwrap(), Settings::default());
    }

    #[test]
    fn store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            preferences: Preferences::new((16, 16), 40),
            debug_mode: true,
        };

        settings.store(dir.path()).unwrap();

        assert_eq!(Settings::load(dir.path()).unwrap(), settings);
    }

    #[test]
    fn out_of_range_mines_are_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            Settings::path(dir.path()),
            "[preferences]\nwidth = 10\nheight = 10\nmines = 100\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();

        assert_eq!(settings.preferences.mines, 95);
        assert!(!settings.debug_mode);
    }

    #[test]
    fn garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(Settings::path(dir.path()), "preferences = 3").unwrap();
        assert!(Settings::load(dir.path()).is_err());
    }
}
