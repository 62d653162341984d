use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_DATABASE_URL: &str = "sqlite:trivia.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
pub const QUESTIONS_PER_PAGE: i64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub questions_per_page: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseSettings {
                url: DEFAULT_DATABASE_URL.to_owned(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
            },
            server: ServerSettings {
                host: DEFAULT_HOST.to_owned(),
                port: DEFAULT_PORT,
            },
            questions_per_page: QUESTIONS_PER_PAGE,
        }
    }
}

impl Settings {
    /// Settings for an isolated in-memory database, used by tests and dry runs.
    pub fn in_memory() -> Self {
        let mut settings = Self::default();
        settings.database.url = "sqlite::memory:".to_owned();
        settings.database.max_connections = 1;
        settings
    }

    /// Defaults, overridden by an optional `trivia.toml`, overridden by `TRIVIA__*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Config::builder()
            .set_default("database.url", DEFAULT_DATABASE_URL)?
            .set_default("database.max_connections", DEFAULT_MAX_CONNECTIONS as i64)?
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", DEFAULT_PORT as i64)?
            .set_default("questions_per_page", QUESTIONS_PER_PAGE)?
            .add_source(File::with_name("trivia").required(false))
            .add_source(
                Environment::with_prefix("TRIVIA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Self>()?
            .validated()
    }

    /// Rejects a page size that would break pagination: SQLite reads `LIMIT -1` as unbounded.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.questions_per_page < 1 {
            return Err(ConfigError::Message(format!(
                "questions_per_page must be at least 1, got {}",
                self.questions_per_page
            )));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.questions_per_page, 10);
        assert_eq!(settings.server.addr(), "0.0.0.0:5000");
        assert!(!settings.database.is_in_memory());
    }

    #[test]
    fn page_size_below_one_is_rejected() {
        for per_page in [0, -1] {
            let mut settings = Settings::default();
            settings.questions_per_page = per_page;
            let error = settings.validated().unwrap_err();
            assert!(error.to_string().contains("questions_per_page"));
        }
    }

    #[test]
    fn default_page_size_is_valid() {
        assert_eq!(Settings::default().validated().unwrap().questions_per_page, 10);
    }

    #[test]
    fn in_memory_uses_single_connection() {
        let settings = Settings::in_memory();
        assert!(settings.database.is_in_memory());
        assert_eq!(settings.database.max_connections, 1);
    }
}
