use sweeper_core::GameConfig;
use sweeper_store::{Difficulty, Preferences};

/// Board parameters for each difficulty level.
pub const fn game_config(difficulty: Difficulty) -> GameConfig {
    match difficulty {
        Difficulty::Easy => GameConfig::new_unchecked(6, 5),
        Difficulty::Normal => GameConfig::new_unchecked(7, 8),
        Difficulty::Hard => GameConfig::new_unchecked(8, 12),
    }
}

/// Everything needed to start one game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub config: GameConfig,
    pub max_time_secs: u32,
    pub alias: String,
}

impl GameSettings {
    pub fn new(difficulty: Difficulty, time_limit_minutes: u32, alias: impl Into<String>) -> Self {
        Self {
            difficulty,
            config: game_config(difficulty),
            max_time_secs: time_limit_minutes.saturating_mul(60),
            alias: alias.into(),
        }
    }
}

impl From<&Preferences> for GameSettings {
    fn from(prefs: &Preferences) -> Self {
        Self::new(prefs.difficulty, prefs.time_limit_minutes, prefs.alias.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_table() {
        assert_eq!(game_config(Difficulty::Easy), GameConfig::new(6, 5).unwrap());
        assert_eq!(game_config(Difficulty::Normal), GameConfig::new(7, 8).unwrap());
        assert_eq!(game_config(Difficulty::Hard), GameConfig::new(8, 12).unwrap());
    }

    #[test]
    fn default_preferences_give_normal_two_minute_game() {
        let settings = GameSettings::from(&Preferences::default());
        assert_eq!(settings.config, GameConfig::new_unchecked(7, 8));
        assert_eq!(settings.max_time_secs, 120);
        assert_eq!(settings.alias, "");
    }
}
