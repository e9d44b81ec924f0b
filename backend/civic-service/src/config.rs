/// Configuration management for the civic service
///
/// Loads configuration from environment variables.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Session / token configuration
    pub auth: AuthConfig,
    /// Report SLA configuration
    pub sla: SlaConfig,
    /// Points and rewards configuration
    pub points: PointsConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Seed the demo admin account and reward catalog on an empty store
    pub seed_demo_data: bool,
}

/// Database configuration
///
/// `url` is optional: without a `DATABASE_URL` the service runs on the
/// in-memory store, which is the development and test backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: Option<String>,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Session token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret for session tokens
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub token_ttl_hours: i64,
}

/// Report resolution SLA configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaConfig {
    /// Hours a report may sit in `reported`/`under_review` before it is
    /// flagged as breached
    pub resolution_hours: i64,
    /// Seconds between background SLA scans
    pub scan_interval_secs: u64,
}

/// Points configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsConfig {
    /// Points credited for submitting a report
    pub report_reward: i64,
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8090),
            seed_demo_data: std::env::var("SEED_DEMO_DATA")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL").ok(),
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_max_connections),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_min_connections),
        };

        let auth = AuthConfig {
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "swachhmitra-dev-secret".to_string()),
            token_ttl_hours: std::env::var("TOKEN_TTL_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24),
        };

        let sla = SlaConfig {
            resolution_hours: std::env::var("SLA_RESOLUTION_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(72),
            scan_interval_secs: std::env::var("SLA_SCAN_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
        };

        let points = PointsConfig {
            report_reward: std::env::var("REPORT_REWARD_POINTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        };

        Ok(Config {
            app,
            database,
            auth,
            sla,
            points,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}
