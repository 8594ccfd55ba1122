//! # Game Settings
//!
//! Run-wide configuration, loadable from JSON and validated before any run
//! starts so that a bad pool id or a missing narrative fails at startup rather
//! than mid-run.

use crate::game::story;
use crate::generation::{find_effect, find_event, EffectKind, EventPool, GenerationConfig};
use crate::{config, PandoraError, PandoraResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of floors to clear
    pub max_floors: u32,
    /// Player health at the start of a run
    pub player_max_health: i32,
    /// Pause after ordinary lines, in milliseconds
    pub line_pause_ms: u64,
    /// Pause after dialogue branch lines, in milliseconds
    pub dialogue_pause_ms: u64,
    /// Pools and tuning for random selection
    pub generation: GenerationConfig,
}

impl GameConfig {
    /// Creates the default configuration with the given seed.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            max_floors: config::MAX_FLOORS,
            player_max_health: config::DEFAULT_PLAYER_HEALTH,
            line_pause_ms: config::LINE_PAUSE_MS,
            dialogue_pause_ms: config::DIALOGUE_PAUSE_MS,
            generation: GenerationConfig::new(seed),
        }
    }

    /// Creates a configuration with no pauses, for tests and headless runs.
    pub fn for_testing(seed: Option<u64>) -> Self {
        Self {
            line_pause_ms: 0,
            dialogue_pause_ms: 0,
            ..Self::new(seed)
        }
    }

    /// Loads and validates a configuration file.
    pub fn from_json_file(path: &Path) -> PandoraResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn line_pause(&self) -> Duration {
        Duration::from_millis(self.line_pause_ms)
    }

    pub fn dialogue_pause(&self) -> Duration {
        Duration::from_millis(self.dialogue_pause_ms)
    }

    /// Checks that every configured id is registered and every floor is scripted.
    pub fn validate(&self) -> PandoraResult<()> {
        if self.max_floors == 0 {
            return Err(PandoraError::InvalidConfig(
                "max_floors must be at least 1".to_string(),
            ));
        }
        if self.player_max_health <= 0 {
            return Err(PandoraError::InvalidConfig(format!(
                "player_max_health must be positive, got {}",
                self.player_max_health
            )));
        }
        if self.max_floors > story::scripted_floor_count() {
            return Err(PandoraError::ConfigurationMissing(format!(
                "no narrative for floor {}",
                story::scripted_floor_count() + 1
            )));
        }

        let generation = &self.generation;
        if generation.enemy_roster.is_empty() {
            return Err(PandoraError::ConfigurationMissing(
                "enemy roster is empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&generation.base_curse_chance) {
            return Err(PandoraError::InvalidConfig(format!(
                "base_curse_chance out of range: {}",
                generation.base_curse_chance
            )));
        }

        validate_effects(EffectKind::Curse, &generation.curse_pool)?;
        validate_effects(EffectKind::Blessing, &generation.blessing_pool)?;
        validate_events(EventPool::Generic, &generation.generic_events)?;
        validate_events(EventPool::Cursed, &generation.cursed_events)?;

        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

fn validate_effects(kind: EffectKind, pool: &[String]) -> PandoraResult<()> {
    for id in pool {
        if id.contains(',') {
            return Err(PandoraError::InvalidConfig(format!(
                "{} id '{}' contains the list delimiter",
                kind, id
            )));
        }
        if find_effect(kind, id).is_none() {
            return Err(PandoraError::InvalidConfig(format!(
                "unknown {} id '{}'",
                kind, id
            )));
        }
    }
    Ok(())
}

fn validate_events(pool_kind: EventPool, pool: &[String]) -> PandoraResult<()> {
    for id in pool {
        match find_event(id) {
            Some(event) if event.pool == pool_kind => {}
            Some(_) => {
                return Err(PandoraError::InvalidConfig(format!(
                    "event '{}' does not belong in the {:?} pool",
                    id, pool_kind
                )))
            }
            None => {
                return Err(PandoraError::InvalidConfig(format!(
                    "unknown event id '{}'",
                    id
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
        assert!(GameConfig::for_testing(Some(1)).validate().is_ok());
    }

    #[test]
    fn test_unknown_curse_fails_fast() {
        let mut config = GameConfig::default();
        config.generation.curse_pool.push("eternal_itch".to_string());
        assert!(matches!(
            config.validate(),
            Err(PandoraError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_blessing_in_curse_pool_is_rejected() {
        let mut config = GameConfig::default();
        config.generation.curse_pool = vec!["divine_vigor".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_misplaced_event_is_rejected() {
        let mut config = GameConfig::default();
        config.generation.generic_events.push("ambush".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_pools_are_allowed() {
        let mut config = GameConfig::default();
        config.generation = GenerationConfig::with_empty_pools(None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_roster_is_missing_configuration() {
        let mut config = GameConfig::default();
        config.generation.enemy_roster.clear();
        assert!(matches!(
            config.validate(),
            Err(PandoraError::ConfigurationMissing(_))
        ));
    }

    #[test]
    fn test_unscripted_floors_are_missing_configuration() {
        let mut config = GameConfig::default();
        config.max_floors = story::scripted_floor_count() + 1;
        assert!(matches!(
            config.validate(),
            Err(PandoraError::ConfigurationMissing(_))
        ));
    }

    #[test]
    fn test_load_partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_floors": 3, "generation": {{ "seed": 9 }} }}"#).unwrap();

        let config = GameConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.max_floors, 3);
        assert_eq!(config.generation.seed, Some(9));
        assert_eq!(config.player_max_health, config::DEFAULT_PLAYER_HEALTH);
        assert_eq!(config.generation.curse_pool.len(), 3);
    }

    #[test]
    fn test_load_rejects_unknown_ids() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "generation": {{ "blessing_pool": ["free_lunch"] }} }}"#).unwrap();
        assert!(GameConfig::from_json_file(file.path()).is_err());
    }
}
