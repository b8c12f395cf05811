//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, validate_config, AppConfig};
use crate::database::Database;
use crate::error::{Error, Result};
use crate::service::{Binding, CrudService, Document, FindQuery, GetQuery, Model};
use crate::types::{JsonValue, StringMap};
use serde_json::json;
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Serve { port, host } => self.serve(*port, host.as_deref()).await,
            Commands::Find {
                resource,
                filters,
                order,
                select,
                limit,
                cursor,
                page,
            } => {
                let query = FindQuery {
                    cursor: cursor.clone(),
                    page: *page,
                    limit: *limit,
                    order: order.clone(),
                    select: select.clone(),
                };
                self.find(resource, filters, &query)
            }
            Commands::Get {
                resource,
                key,
                select,
            } => self.get(resource, key, select),
            Commands::Tables => self.tables(),
            Commands::Check => self.check(),
        }
    }

    /// Load configuration and apply command line overrides
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.cli.config {
            Some(path) => load_config(path)?,
            None => AppConfig::default(),
        };

        if let Some(database) = &self.cli.database {
            config.database.path.clone_from(database);
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Open the configured database and run its bootstrap SQL
    fn open_database(&self, config: &AppConfig) -> Result<Arc<Database>> {
        let db = Database::open(&config.database.path)?;
        if let Some(init) = &config.database.init {
            db.execute_batch(init)?;
        }
        tracing::debug!(location = %db.location(), "Opened database");
        Ok(Arc::new(db))
    }

    /// Service for a configured resource
    fn service(
        &self,
        config: &AppConfig,
        db: &Arc<Database>,
        resource: &str,
    ) -> Result<CrudService<Document>> {
        let resource = config.resource(resource)?;
        Ok(CrudService::new(
            Arc::clone(db),
            resource.table_name(),
            config.pagination,
        ))
    }

    /// Start HTTP server
    async fn serve(&self, port: Option<u16>, host: Option<&str>) -> Result<()> {
        let mut config = self.load_config()?;
        if let Some(port) = port {
            config.server.port = port;
        }
        if let Some(host) = host {
            config.server.host = host.to_string();
        }

        if config.resources.is_empty() {
            tracing::warn!("No resources configured; only /health will be served");
        }

        let db = self.open_database(&config)?;
        crate::cli::serve(db, config).await
    }

    /// Fetch one page and print `{meta, result}`
    fn find(&self, resource: &str, filters: &[String], query: &FindQuery) -> Result<()> {
        let config = self.load_config()?;
        let db = self.open_database(&config)?;
        let service = self.service(&config, &db, resource)?;

        let model: Document = Binding::new().query(&parse_filters(filters)?).bind()?;
        let page = service.find(&model, query)?;

        self.output_message(&serde_json::to_value(page)?);
        Ok(())
    }

    /// Fetch one record by key
    fn get(&self, resource: &str, key: &str, select: &str) -> Result<()> {
        let config = self.load_config()?;
        let db = self.open_database(&config)?;
        let service = self.service(&config, &db, resource)?;

        let model: Document = Binding::new().key(Document::KEY_COLUMN, key).bind()?;
        let query = GetQuery {
            select: select.to_string(),
        };
        let record = service.get(&model, &query)?;

        self.output_message(&record);
        Ok(())
    }

    /// List database tables
    fn tables(&self) -> Result<()> {
        let config = self.load_config()?;
        let db = self.open_database(&config)?;

        let tables = db.list_tables()?;
        self.output_message(&json!({
            "type": "TABLES",
            "tables": tables
        }));
        Ok(())
    }

    /// Validate config, test the connection and check every resource's table exists
    fn check(&self) -> Result<()> {
        let config = self.load_config()?;

        let status = self.open_database(&config).and_then(|db| {
            db.check_connection()?;
            let tables = db.list_tables()?;
            let missing: Vec<&str> = config
                .resources
                .iter()
                .map(|r| r.table_name())
                .filter(|table| !tables.iter().any(|t| t == table))
                .collect();
            if missing.is_empty() {
                Ok(())
            } else {
                Err(Error::config(format!(
                    "Missing tables: {}",
                    missing.join(", ")
                )))
            }
        });

        match status {
            Ok(()) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": format!("{} resource(s) ready", config.resources.len())
                    }
                }));
                Ok(())
            }
            Err(e) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "FAILED",
                        "message": format!("Check failed: {e}")
                    }
                }));
                Err(e)
            }
        }
    }

    /// Output a message as JSON
    fn output_message(&self, msg: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Parse `field=value` filter arguments
fn parse_filters(filters: &[String]) -> Result<StringMap> {
    filters
        .iter()
        .map(|filter| {
            filter
                .split_once('=')
                .map(|(field, value)| (field.trim().to_string(), value.to_string()))
                .ok_or_else(|| {
                    Error::invalid_request(format!("Filter must be 'field=value', got '{filter}'"))
                })
        })
        .collect()
}
