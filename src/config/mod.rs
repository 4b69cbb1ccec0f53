use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub uploads: UploadConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_cors: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory photo files are written to and served from.
    pub dir: String,
    /// Public URL prefix resolving to `dir`.
    pub public_prefix: String,
    pub max_file_bytes: usize,
    pub max_files_per_listing: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub session_ttl_hours: i64,
    pub session_cookie_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PORTAL_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_ENABLE_CORS") {
            self.server.enable_cors = v.parse().unwrap_or(self.server.enable_cors);
        }
        if let Ok(v) = env::var("SERVER_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs = v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOADS_DIR") {
            self.uploads.dir = v;
        }
        if let Ok(v) = env::var("UPLOADS_MAX_FILE_BYTES") {
            self.uploads.max_file_bytes = v.parse().unwrap_or(self.uploads.max_file_bytes);
        }
        if let Ok(v) = env::var("UPLOADS_MAX_FILES_PER_LISTING") {
            self.uploads.max_files_per_listing = v.parse().unwrap_or(self.uploads.max_files_per_listing);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH_SESSION_TTL_HOURS") {
            self.auth.session_ttl_hours = v.parse().unwrap_or(self.auth.session_ttl_hours);
        }
        if let Ok(v) = env::var("AUTH_SESSION_COOKIE_NAME") {
            self.auth.session_cookie_name = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                enable_cors: true,
                // 10 photos x 10 MiB plus multipart framing headroom
                max_request_size_bytes: 110 * 1024 * 1024,
            },
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            uploads: UploadConfig {
                dir: "public/uploads".to_string(),
                public_prefix: "/uploads".to_string(),
                max_file_bytes: 10 * 1024 * 1024,
                max_files_per_listing: 10,
            },
            auth: AuthConfig {
                session_ttl_hours: 24,
                session_cookie_name: "portal_session".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                enable_cors: true,
                max_request_size_bytes: 110 * 1024 * 1024,
            },
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout_secs: 10,
            },
            uploads: UploadConfig {
                dir: "public/uploads".to_string(),
                public_prefix: "/uploads".to_string(),
                max_file_bytes: 10 * 1024 * 1024,
                max_files_per_listing: 10,
            },
            auth: AuthConfig {
                session_ttl_hours: 24,
                session_cookie_name: "portal_session".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                enable_cors: false,
                max_request_size_bytes: 110 * 1024 * 1024,
            },
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout_secs: 5,
            },
            uploads: UploadConfig {
                dir: "public/uploads".to_string(),
                public_prefix: "/uploads".to_string(),
                max_file_bytes: 10 * 1024 * 1024,
                max_files_per_listing: 10,
            },
            auth: AuthConfig {
                session_ttl_hours: 24,
                session_cookie_name: "portal_session".to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.server.enable_cors);
        assert_eq!(config.uploads.max_file_bytes, 10 * 1024 * 1024);
        assert_eq!(config.uploads.max_files_per_listing, 10);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.server.enable_cors);
        assert_eq!(config.database.max_connections, 50);
    }
}
