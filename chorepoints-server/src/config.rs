use chorepoints_shared::Role;
use serde::Deserialize;
use std::{env, fs, path::Path};

const DEFAULT_DB_PATH: &str = "data/app.db";
/// Upper bound for `invitations.validity_days`.
pub const MAX_VALIDITY_DAYS: i64 = 3650;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Overridden by the `DB_PATH` environment variable.
    pub database_path: Option<String>,
    #[serde(default)]
    pub invitations: InvitationConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InvitationConfig {
    pub validity_days: i64,
    pub code_length: usize,
    pub max_attempts: u32,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            validity_days: 7,
            code_length: 8,
            max_attempts: 5,
        }
    }
}

/// Rows upserted on startup so a fresh database has a family to work with.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub users: Vec<SeedUser>,
    pub relationships: Vec<SeedRelationship>,
    pub tasks: Vec<SeedTask>,
    pub rewards: Vec<SeedReward>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedRelationship {
    pub parent: String,
    pub child: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedTask {
    pub id: String,
    pub name: String,
    pub points: i32,
    pub owner: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedReward {
    pub id: String,
    pub name: String,
    pub required_points: i32,
    pub owner: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
        Self::load_from_path(path)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(&path)?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn db_path(&self) -> String {
        env::var("DB_PATH")
            .ok()
            .or_else(|| self.database_path.clone())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let inv = &self.invitations;
        if !(1..=MAX_VALIDITY_DAYS).contains(&inv.validity_days) {
            return Err(ConfigError::Invalid(format!(
                "invitations.validity_days must be between 1 and {MAX_VALIDITY_DAYS}"
            )));
        }
        if !(4..=32).contains(&inv.code_length) {
            return Err(ConfigError::Invalid(
                "invitations.code_length must be between 4 and 32".into(),
            ));
        }
        if inv.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "invitations.max_attempts must be at least 1".into(),
            ));
        }
        for t in &self.seed.tasks {
            if t.points < 0 {
                return Err(ConfigError::Invalid(format!(
                    "task {} has negative points",
                    t.id
                )));
            }
        }
        for r in &self.seed.rewards {
            if r.required_points < 0 {
                return Err(ConfigError::Invalid(format!(
                    "reward {} has negative required_points",
                    r.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(cfg.invitations.validity_days, 7);
        assert_eq!(cfg.invitations.code_length, 8);
        assert_eq!(cfg.invitations.max_attempts, 5);
        assert!(cfg.seed.users.is_empty());
    }

    #[test]
    fn parses_seed_section() {
        let yaml = r#"
database_path: /tmp/points.db
invitations:
  max_attempts: 3
seed:
  users:
    - { id: p1, username: mum, display_name: Mum, role: parent }
    - { id: c1, username: ana, display_name: Ana, role: child }
  relationships:
    - { parent: p1, child: c1 }
  tasks:
    - { id: dishes, name: Dishes, points: 10, owner: p1 }
  rewards:
    - { id: movie, name: Movie night, required_points: 40, owner: p1 }
"#;
        let cfg = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.database_path.as_deref(), Some("/tmp/points.db"));
        assert_eq!(cfg.invitations.max_attempts, 3);
        assert_eq!(cfg.invitations.code_length, 8);
        assert_eq!(cfg.seed.users[1].role, Role::Child);
        assert_eq!(cfg.seed.tasks[0].points, 10);
        assert_eq!(cfg.seed.rewards[0].required_points, 40);
    }

    #[test]
    fn rejects_bad_invitation_policy() {
        let err = AppConfig::from_yaml("invitations: { code_length: 2 }").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = AppConfig::from_yaml("invitations: { max_attempts: 0 }").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_out_of_range_validity() {
        for days in ["0", "-3", "3651", "200000000000000"] {
            let yaml = format!("invitations: {{ validity_days: {days} }}");
            let err = AppConfig::from_yaml(&yaml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{days}: {err:?}");
        }
        let cfg = AppConfig::from_yaml("invitations: { validity_days: 3650 }").unwrap();
        assert_eq!(cfg.invitations.validity_days, MAX_VALIDITY_DAYS);
    }
}
