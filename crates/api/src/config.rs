use domain::models::survey::SchemaLimits;
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub limits: LimitsConfig,
    /// Owner access token verification
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Base URL of the public respondent site; share links are rendered as
    /// `{public_base_url}/s/{token}`.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Pool settings in the form the persistence crate expects.
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Public submissions allowed per client IP per minute (0 disables the limit)
    #[serde(default = "default_public_rate_limit")]
    pub public_rate_limit_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_questions_per_survey")]
    pub max_questions_per_survey: usize,

    #[serde(default = "default_max_options_per_question")]
    pub max_options_per_question: usize,

    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,

    #[serde(default = "default_max_answer_length")]
    pub max_answer_length: usize,
}

impl LimitsConfig {
    pub fn schema_limits(&self) -> SchemaLimits {
        SchemaLimits {
            max_questions: self.max_questions_per_survey,
            max_options: self.max_options_per_question,
            max_title_length: self.max_title_length,
            max_answer_length: self.max_answer_length,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 secret of the identity provider that issues owner tokens
    pub jwt_secret: String,

    /// Expected `aud` claim, if the provider sets one
    #[serde(default)]
    pub audience: Option<String>,

    /// Leeway in seconds for clock skew tolerance (default: 30)
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    1_048_576
}
fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_public_rate_limit() -> u32 {
    30
}
fn default_max_questions_per_survey() -> usize {
    100
}
fn default_max_options_per_question() -> usize {
    50
}
fn default_max_title_length() -> usize {
    200
}
fn default_max_answer_length() -> usize {
    5000
}
fn default_jwt_leeway() -> u64 {
    shared::jwt::DEFAULT_LEEWAY_SECS
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with SURVEY__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SURVEY").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// This method creates a config entirely from defaults and overrides,
    /// without relying on config files (which may not be accessible during tests).
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        // Embed defaults directly to avoid file system dependency in tests
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30
            max_body_size = 1048576
            public_base_url = "http://localhost:3000"

            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            public_rate_limit_per_minute = 30

            [limits]
            max_questions_per_survey = 100
            max_options_per_question = 50
            max_title_length = 200
            max_answer_length = 5000

            [auth]
            jwt_secret = "test-jwt-secret"
            leeway_secs = 30
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "SURVEY__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "SURVEY__AUTH__JWT_SECRET environment variable must be set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }

    /// Public URL of a survey share link.
    pub fn share_url(&self, token: &str) -> String {
        format!(
            "{}/s/{}",
            self.server.public_base_url.trim_end_matches('/'),
            token
        )
    }
}
