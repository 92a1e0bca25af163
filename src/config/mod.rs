use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::record::tree::{DEFAULT_MAX_DEPTH, RICHTEXT_MAX_RUNES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub assets: AssetsConfig,
    pub mapper: MapperConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Directory holding one `{tenant}-{version:03}` folder per tenant version
    pub config_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperConfig {
    pub richtext_truncation: bool,
    pub richtext_max_runes: usize,
    pub max_tree_depth: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            richtext_truncation: true,
            richtext_max_runes: RICHTEXT_MAX_RUNES,
            max_tree_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        Self::preset(environment).with_overrides(|key| env::var(key).ok())
    }

    pub fn preset(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    fn with_overrides<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Assets
        if let Some(v) = var("ASSETS_PATH") {
            self.assets.config_root = PathBuf::from(v);
        }

        // Mapper overrides
        if let Some(v) = var("MAPPER_RICHTEXT_TRUNCATION") {
            self.mapper.richtext_truncation = v.parse().unwrap_or(self.mapper.richtext_truncation);
        }
        if let Some(v) = var("MAPPER_RICHTEXT_MAX_RUNES") {
            self.mapper.richtext_max_runes = v.parse().unwrap_or(self.mapper.richtext_max_runes);
        }
        if let Some(v) = var("MAPPER_MAX_TREE_DEPTH") {
            self.mapper.max_tree_depth = v.parse().unwrap_or(self.mapper.max_tree_depth);
        }

        // API overrides; PORT is what most hosting platforms set
        if let Some(v) = var("API_PORT").or_else(|| var("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Some(v) = var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Some(v) = var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Some(v) = var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            assets: AssetsConfig {
                config_root: PathBuf::from("./assets/config"),
            },
            mapper: MapperConfig::default(),
            api: ApiConfig {
                port: 9001,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            assets: AssetsConfig {
                config_root: PathBuf::from("/srv/assets/config"),
            },
            mapper: MapperConfig::default(),
            api: ApiConfig {
                port: 8080,
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            assets: AssetsConfig {
                config_root: PathBuf::from("/srv/assets/config"),
            },
            mapper: MapperConfig {
                max_tree_depth: 32,
                ..MapperConfig::default()
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
