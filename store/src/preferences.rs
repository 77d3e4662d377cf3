use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::*;

pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 2;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Normal, Self::Hard];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Normal => "Normal",
            Self::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown difficulty {0:?}, expected Easy, Normal or Hard")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}

/// The three settings carried between games.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preferences {
    pub difficulty: Difficulty,
    pub time_limit_minutes: u32,
    pub alias: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            time_limit_minutes: DEFAULT_TIME_LIMIT_MINUTES,
            alias: String::new(),
        }
    }
}

/// Each setting is persisted on its own and falls back to its own default when absent.
pub trait PreferencesStore {
    fn difficulty(&self) -> Result<Difficulty>;
    fn set_difficulty(&self, difficulty: Difficulty) -> Result<()>;

    fn time_limit_minutes(&self) -> Result<u32>;
    fn set_time_limit_minutes(&self, minutes: u32) -> Result<()>;

    fn alias(&self) -> Result<String>;
    fn set_alias(&self, alias: &str) -> Result<()>;

    fn load(&self) -> Result<Preferences> {
        Ok(Preferences {
            difficulty: self.difficulty()?,
            time_limit_minutes: self.time_limit_minutes()?,
            alias: self.alias()?,
        })
    }
}

/// On-disk shape, every key optional.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alias: Option<String>,
}

/// Preferences kept in a small TOML file.
#[derive(Clone, Debug)]
pub struct TomlPreferencesStore {
    path: PathBuf,
}

impl TomlPreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredPreferences> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(StoredPreferences::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn update(&self, edit: impl FnOnce(&mut StoredPreferences)) -> Result<()> {
        let mut stored = self.read()?;
        edit(&mut stored);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string(&stored)?)?;
        log::debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }
}

impl PreferencesStore for TomlPreferencesStore {
    fn difficulty(&self) -> Result<Difficulty> {
        let Some(label) = self.read()?.difficulty else {
            return Ok(Difficulty::default());
        };
        Ok(label.parse().unwrap_or_else(|err| {
            log::warn!("{}, falling back to {}", err, Difficulty::default());
            Difficulty::default()
        }))
    }

    fn set_difficulty(&self, difficulty: Difficulty) -> Result<()> {
        self.update(|stored| stored.difficulty = Some(difficulty.label().to_string()))
    }

    fn time_limit_minutes(&self) -> Result<u32> {
        Ok(self.read()?.time_limit.unwrap_or(DEFAULT_TIME_LIMIT_MINUTES))
    }

    fn set_time_limit_minutes(&self, minutes: u32) -> Result<()> {
        self.update(|stored| stored.time_limit = Some(minutes))
    }

    fn alias(&self) -> Result<String> {
        Ok(self.read()?.alias.unwrap_or_default())
    }

    fn set_alias(&self, alias: &str) -> Result<()> {
        self.update(|stored| stored.alias = Some(alias.to_string()))
    }
}
