/// Configuration module for estimate-sync.
///
/// Holds the API base URL, request timeout, and the entity-route table that
/// maps each estimate section (equipment, demo, rough, piping, ...) onto its
/// REST endpoints. Loaded once at startup and passed down explicitly.
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "estimate.json";

// ── Default value functions ──────────────────────────────────────────

fn default_api_base() -> String {
    "http://localhost:7071/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_entities() -> Vec<EntityRoute> {
    vec![
        EntityRoute::new("equipment", "Equipment", "EquipmentId"),
        EntityRoute::new("demo", "Demo", "DemoId"),
        EntityRoute::new("rough", "Rough", "ERoughId").with_path("erough"),
        EntityRoute::new("piping", "Piping", "PipingId"),
    ]
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_entities")]
    pub entities: Vec<EntityRoute>,
}

/// REST routes for one entity kind.
///
/// `path` is the collection root; every other route hangs off it unless
/// `list_path` / `alternates_list_path` override the read side (some
/// deployments still serve reads from older endpoints). Templates use `{id}`
/// as the placeholder for a record identifier.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EntityRoute {
    pub name: String,

    #[serde(default)]
    pub label: String,

    /// Primary key as it appears on the wire, e.g. `EquipmentId`. Alternates
    /// carry the same key as their foreign key to the parent.
    pub id_field: String,

    #[serde(default)]
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternates_list_path: Option<String>,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
            entities: default_entities(),
        }
    }
}

// ── EntityRoute implementation ───────────────────────────────────────

impl EntityRoute {
    #[must_use]
    pub fn new(name: &str, label: &str, id_field: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            id_field: id_field.to_string(),
            path: name.to_string(),
            list_path: None,
            alternates_list_path: None,
        }
    }

    /// Serve this entity from a collection root other than its name.
    #[must_use]
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Root path with surrounding slashes removed; falls back to `name`.
    #[must_use]
    pub fn root(&self) -> &str {
        let path = self.path.trim_matches('/');
        if path.is_empty() { self.name.as_str() } else { path }
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }

    /// `GET` route returning all primaries.
    #[must_use]
    pub fn list_template(&self) -> String {
        self.list_path
            .clone()
            .unwrap_or_else(|| self.root().to_string())
    }

    /// `GET` route returning the alternates of one parent.
    #[must_use]
    pub fn alternates_list_template(&self) -> String {
        self.alternates_list_path
            .clone()
            .unwrap_or_else(|| format!("{}/alternates/{{id}}", self.root()))
    }

    /// `PUT` / `DELETE` route for one primary.
    #[must_use]
    pub fn item_template(&self) -> String {
        format!("{}/{{id}}", self.root())
    }

    /// `POST` route creating an alternate.
    #[must_use]
    pub fn alternates_template(&self) -> String {
        format!("{}/alternates", self.root())
    }

    /// `PUT` route for one alternate.
    #[must_use]
    pub fn alternate_item_template(&self) -> String {
        format!("{}/alternates/{{id}}", self.root())
    }

    /// `DELETE` route wiping the whole table.
    #[must_use]
    pub fn clear_template(&self) -> String {
        format!("{}/clear", self.root())
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Look up an entity route by name (case-insensitive).
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityRoute> {
        self.entities
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to [`DEFAULT_CONFIG_PATH`].
    /// If the file does not exist, returns a default config and generates a
    /// template file when the default path was used.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            DEFAULT_CONFIG_PATH
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            if path == DEFAULT_CONFIG_PATH {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let mut cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");

        // An explicit empty table is treated the same as an absent one
        if cfg.entities.is_empty() {
            cfg.entities = default_entities();
        }

        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.api_base.starts_with("http://") || self.api_base.starts_with("https://"),
            "api_base must be an http(s) URL, got {:?}",
            self.api_base
        );
        anyhow::ensure!(self.timeout_secs > 0, "timeout_secs must be positive");
        anyhow::ensure!(
            !self.entities.is_empty(),
            "at least one entity route must be configured"
        );

        let mut seen = std::collections::HashSet::new();
        for route in &self.entities {
            anyhow::ensure!(!route.name.trim().is_empty(), "entity name must not be empty");
            anyhow::ensure!(
                !route.id_field.trim().is_empty(),
                "entity {} has an empty id_field",
                route.name
            );
            anyhow::ensure!(
                seen.insert(route.name.to_ascii_lowercase()),
                "duplicate entity route: {}",
                route.name
            );
            if let Some(tpl) = &route.alternates_list_path {
                anyhow::ensure!(
                    tpl.contains("{id}"),
                    "entity {}: alternates_list_path must contain {{id}}",
                    route.name
                );
            }
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base, "http://localhost:7071/api");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.entities.len(), 4);
        assert_eq!(config.entity("piping").unwrap().id_field, "PipingId");
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{"api_base": "https://example.test/api", "timeout_secs": 5}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.api_base, "https://example.test/api");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        // Entities should have defaults
        assert!(config.entity("equipment").is_some());
    }

    #[test]
    fn test_rough_default_route() {
        let config = Config::default();
        let rough = config.entity("rough").unwrap();
        assert_eq!(rough.id_field, "ERoughId");
        assert_eq!(rough.root(), "erough");
        assert_eq!(rough.item_template(), "erough/{id}");
        assert_eq!(rough.clear_template(), "erough/clear");
    }

    #[test]
    fn test_entity_lookup_case_insensitive() {
        let config = Config::default();
        assert_eq!(config.entity("Demo").unwrap().name, "demo");
        assert!(config.entity("plumbing").is_none());
    }

    #[test]
    fn test_route_templates() {
        let route = EntityRoute::new("piping", "Piping", "PipingId");
        assert_eq!(route.list_template(), "piping");
        assert_eq!(route.alternates_list_template(), "piping/alternates/{id}");
        assert_eq!(route.item_template(), "piping/{id}");
        assert_eq!(route.alternates_template(), "piping/alternates");
        assert_eq!(route.alternate_item_template(), "piping/alternates/{id}");
        assert_eq!(route.clear_template(), "piping/clear");
    }

    #[test]
    fn test_route_read_overrides() {
        let json = r#"{
            "name": "equipment",
            "id_field": "EquipmentId",
            "list_path": "db-test",
            "alternates_list_path": "db-test-alternate/{id}"
        }"#;
        let route: EntityRoute = serde_json::from_str(json).unwrap();
        assert_eq!(route.list_template(), "db-test");
        assert_eq!(route.alternates_list_template(), "db-test-alternate/{id}");
        // Writes still use the entity root
        assert_eq!(route.item_template(), "equipment/{id}");
        assert_eq!(route.display_name(), "equipment");
    }

    #[test]
    fn test_validate_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_base() {
        let mut config = Config::default();
        config.api_base = "localhost".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_duplicate_entity() {
        let mut config = Config::default();
        config
            .entities
            .push(EntityRoute::new("DEMO", "Demo again", "DemoId"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_alternates_template_needs_placeholder() {
        let mut config = Config::default();
        config.entities[0].alternates_list_path = Some("db-test-alternate".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("absent.json");
        let config = Config::load(&path.to_string_lossy()).unwrap();
        assert_eq!(config.entities.len(), 4);
        // Only the default path gets a template written
        assert!(!path.exists());
    }

    #[test]
    fn test_load_invalid_json_falls_back() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let config = Config::load(&path.to_string_lossy()).unwrap();
        assert_eq!(config.api_base, default_api_base());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("estimate.json");
        let path = path.to_string_lossy().to_string();

        let mut config = Config::default();
        config.api_base = "https://estimates.test/api".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.api_base, "https://estimates.test/api");
        assert_eq!(loaded.entities, config.entities);
    }
}
