pub mod database;
pub mod logger;
pub mod scan;
pub mod server;

pub(crate) use std::sync::LazyLock;

use anyhow::Context;
use config::Config;
use serde::Deserialize;

pub use database::DatabaseConfig;
pub use scan::ScanConfig;
pub use server::ServerConfig;

use crate::config::logger::LoggerConfig;

static APPCONFIG: LazyLock<AppConfig> =
    LazyLock::new(|| AppConfig::load().expect("Failed to load application configuration"));

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    server: ServerConfig,
    database: DatabaseConfig,
    #[serde(default)]
    scan: ScanConfig,
    #[serde(default)]
    logger: LoggerConfig,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = Config::builder()
            .add_source(
                config::File::with_name("application")
                    .format(config::FileFormat::Yaml)
                    .required(true),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .try_parsing(true)
                    .separator("_"),
            )
            .build()
            .with_context(|| "Failed to read The Configuration")?
            .try_deserialize()
            .with_context(|| "Failed to deserialize The Configuration");

        config
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn database(&self) -> &DatabaseConfig {
        &self.database
    }

    pub fn scan(&self) -> &ScanConfig {
        &self.scan
    }

    pub fn logger(&self) -> &LoggerConfig {
        &self.logger
    }
}

pub fn get() -> &'static AppConfig {
    &APPCONFIG
}
