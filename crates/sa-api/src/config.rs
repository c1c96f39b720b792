use serde::Deserialize;

/// Deployment environment, selects logging format among other things.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Service configuration, read from environment variables.
///
/// Variable names are the upper-cased field names (`JWT_SECRET`,
/// `AI_SERVICE_URL`, ...). List values such as `ALLOWED_ORIGINS` are
/// comma separated.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    /// Postgres connection string. Without it the service keeps data in memory.
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    /// Secret used to verify bearer tokens issued by the auth service
    pub jwt_secret: String,
    #[serde(default)]
    pub env: Environment,
    /// Base URL of the AI generation service
    #[serde(default = "default_ai_service_url")]
    pub ai_service_url: String,
    #[serde(default = "default_ai_service_timeout_secs")]
    pub ai_service_timeout_secs: u64,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    /// How long a submitted quiz session stays readable before it is dropped
    #[serde(default = "default_session_retention_secs")]
    pub session_retention_secs: u64,
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_ai_service_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_ai_service_timeout_secs() -> u64 {
    30
}

fn default_port() -> u16 {
    3000
}

fn default_session_retention_secs() -> u64 {
    600
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        let config: Self = envy::from_env()?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), envy::Error> {
        if self.jwt_secret.len() < 32 {
            return Err(envy::Error::Custom(
                "JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }
        Ok(())
    }
}
