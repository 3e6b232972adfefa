/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 3000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `DATA_DIR`: Directory holding the collection files (default: data)
/// - `TASKS_FILE`: Task collection file (default: `$DATA_DIR/tasks.json`)
/// - `USERS_FILE`: User collection file (default: `$DATA_DIR/users.json`)
/// - `LOG_FORMAT`: `json` for JSON logs, anything else for plain text
/// - `RUST_LOG`: Log filter (default: kanban_api=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use kanban_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Collection file locations
    pub storage: StorageConfig,

    /// Log output configuration
    pub log: LogConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the task collection
    pub tasks_file: PathBuf,

    /// JSON file holding the user collection
    pub users_file: PathBuf,
}

/// Log output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Emit JSON lines instead of human-readable logs
    pub json: bool,
}

impl StorageConfig {
    /// Standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            tasks_file: dir.join("tasks.json"),
            users_file: dir.join("users.json"),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is loaded first, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable has an invalid value (e.g. a
    /// non-numeric `API_PORT`).
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("API_PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("API_PORT must be a port number: {}", e))?,
            None => 3000,
        };

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        if cors_origins.is_empty() {
            anyhow::bail!("CORS_ORIGINS must list at least one origin");
        }

        let data_dir = PathBuf::from(lookup("DATA_DIR").unwrap_or_else(|| "data".to_string()));
        let defaults = StorageConfig::in_dir(&data_dir);
        let storage = StorageConfig {
            tasks_file: lookup("TASKS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.tasks_file),
            users_file: lookup("USERS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.users_file),
        };

        let json = lookup("LOG_FORMAT")
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
            },
            storage,
            log: LogConfig { json },
        })
    }

    /// Configuration for a local server keeping its files in `dir`
    pub fn local(dir: impl AsRef<Path>) -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            storage: StorageConfig::in_dir(dir),
            log: LogConfig::default(),
        }
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
