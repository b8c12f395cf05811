//! Application configuration
//!
//! The server and CLI are driven by one YAML file describing the database,
//! the HTTP listener, pagination bounds and the tables exposed as resources.
//!
//! ```yaml
//! database:
//!   path: data.duckdb
//!   init: "CREATE TABLE IF NOT EXISTS users (key BIGINT PRIMARY KEY, name VARCHAR)"
//! server:
//!   port: 8080
//! pagination:
//!   default_limit: 20
//!   max_limit: 500
//! resources:
//!   - name: users
//!     table: users
//! ```

use crate::database::{quote_identifier, MEMORY};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration loaded from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database location and bootstrap SQL
    #[serde(default)]
    pub database: DatabaseConfig,

    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Page size bounds
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Tables exposed over HTTP
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

impl AppConfig {
    /// Look up a resource by its route name
    pub fn resource(&self, name: &str) -> Result<&ResourceConfig> {
        self.resources
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| Error::UnknownResource {
                name: name.to_string(),
            })
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_database_path")]
    pub path: String,

    /// SQL run once after opening (schema bootstrap)
    #[serde(default)]
    pub init: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            init: None,
        }
    }
}

fn default_database_path() -> String {
    MEMORY.to_string()
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request time budget in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Page size bounds applied when binding list requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when a request gives none (or zero)
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Largest page size a request may ask for
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl PaginationConfig {
    /// Resolve a requested page size: zero means the default, and anything
    /// above the maximum is clamped
    pub fn resolve(&self, requested: usize) -> usize {
        if requested == 0 {
            self.default_limit
        } else {
            requested.min(self.max_limit)
        }
    }
}

fn default_limit() -> usize {
    20
}

fn default_max_limit() -> usize {
    500
}

/// A table exposed under `/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Route name
    pub name: String,

    /// Table name (defaults to the route name)
    #[serde(default)]
    pub table: Option<String>,
}

impl ResourceConfig {
    /// Table backing this resource
    pub fn table_name(&self) -> &str {
        self.table.as_deref().unwrap_or(&self.name)
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load and validate configuration from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_config_from_str(&content)
}

/// Load and validate configuration from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<AppConfig> {
    let config: AppConfig = serde_yaml::from_str(yaml)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate a parsed configuration
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let pagination = &config.pagination;
    if pagination.default_limit == 0 {
        return Err(Error::invalid_config(
            "pagination.default_limit",
            "must be at least 1",
        ));
    }
    if pagination.max_limit < pagination.default_limit {
        return Err(Error::invalid_config(
            "pagination.max_limit",
            format!(
                "must not be below default_limit ({})",
                pagination.default_limit
            ),
        ));
    }

    if config.server.request_timeout_ms == 0 {
        return Err(Error::invalid_config(
            "server.request_timeout_ms",
            "must be greater than 0",
        ));
    }

    let mut names = HashSet::new();
    for resource in &config.resources {
        if resource.name.is_empty() {
            return Err(Error::config("Resource name cannot be empty"));
        }
        if resource.name == "health" {
            return Err(Error::invalid_config(
                "resources.health",
                "'health' is reserved for the health check route",
            ));
        }
        if !names.insert(resource.name.as_str()) {
            return Err(Error::config(format!(
                "Duplicate resource name: {}",
                resource.name
            )));
        }
        quote_identifier(&resource.name).map_err(|_| {
            Error::invalid_config(
                format!("resources.{}", resource.name),
                "name must be a plain identifier",
            )
        })?;
        quote_identifier(resource.table_name()).map_err(|_| {
            Error::invalid_config(
                format!("resources.{}.table", resource.name),
                "table must be a plain identifier",
            )
        })?;
    }

    Ok(())
}
