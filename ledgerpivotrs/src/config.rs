//! Configuration for ledger-pivot.
//!
//! TOML-based: the fact view the builder reads from and the PostgreSQL connection.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PivotError, Result};
use crate::sql_ast::TableRef;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PivotConfig {
    pub view: ViewConfig,
    pub postgres: PostgresConfig,
}

/// Fact view the pivot aggregates over.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Schema holding the view (default: `finance`). Empty means unqualified.
    pub schema: String,
    /// View name (default: `vw_ledger_transactions`).
    pub name: String,
}

/// PostgreSQL connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PostgresConfig {
    /// Connection string, URL or key-value form.
    pub url: Option<String>,
    /// Connection pool size (default: 16).
    pub pool_size: usize,
    /// Server-side statement timeout in milliseconds (0 = server default).
    pub statement_timeout_ms: u64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            schema: "finance".to_string(),
            name: "vw_ledger_transactions".to_string(),
        }
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: 16,
            statement_timeout_ms: 0,
        }
    }
}

impl ViewConfig {
    pub fn table_ref(&self) -> TableRef {
        let schema = Some(self.schema.as_str()).filter(|s| !s.is_empty());
        TableRef::new(schema, &self.name)
    }
}

impl PivotConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| PivotError::Config(format!("failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| PivotError::Config(format!("failed to parse config: {e}")))?;
        if config.view.name.trim().is_empty() {
            return Err(PivotError::Config("view.name must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Load from default locations (env var, cwd, user config dir, or defaults).
    ///
    /// Search order:
    /// 1. `LEDGER_PIVOT_CONFIG` environment variable
    /// 2. `./ledger-pivot.toml` (current directory)
    /// 3. `~/.config/ledger-pivot/config.toml` (user config dir)
    /// 4. Built-in defaults
    pub fn load_default() -> Self {
        if let Ok(path) = std::env::var("LEDGER_PIVOT_CONFIG") {
            match Self::from_file(&path) {
                Ok(cfg) => {
                    tracing::info!(path = %path, "loaded config from LEDGER_PIVOT_CONFIG");
                    return cfg;
                }
                Err(e) => tracing::warn!(path = %path, error = %e, "ignoring LEDGER_PIVOT_CONFIG"),
            }
        }

        if let Ok(cfg) = Self::from_file("ledger-pivot.toml") {
            tracing::info!("loaded config from ./ledger-pivot.toml");
            return cfg;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("ledger-pivot").join("config.toml");
            if let Ok(cfg) = Self::from_file(&user_config) {
                tracing::info!(path = %user_config.display(), "loaded config from user config dir");
                return cfg;
            }
        }

        tracing::debug!("no config file found, using defaults");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let cfg = PivotConfig::default();
        assert_eq!(
            cfg.view.table_ref(),
            TableRef::new(Some("finance"), "vw_ledger_transactions")
        );
        assert_eq!(cfg.postgres.pool_size, 16);
        assert_eq!(cfg.postgres.statement_timeout_ms, 0);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[view]
schema = ""
name = "ledger_facts"

[postgres]
url = "postgresql://localhost/erp"
pool_size = 4
"#;
        let cfg = PivotConfig::from_toml(toml).unwrap();
        assert_eq!(cfg.view.table_ref(), TableRef::new(None, "ledger_facts"));
        assert_eq!(cfg.postgres.url.as_deref(), Some("postgresql://localhost/erp"));
        assert_eq!(cfg.postgres.pool_size, 4);
    }

    #[test]
    fn test_empty_view_name_rejected() {
        let err = PivotConfig::from_toml("[view]\nname = \"\"\n").unwrap_err();
        assert!(matches!(err, PivotError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[postgres]\nstatement_timeout_ms = 5000").unwrap();
        let cfg = PivotConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.postgres.statement_timeout_ms, 5000);
        assert_eq!(cfg.view.name, "vw_ledger_transactions");
    }
}
