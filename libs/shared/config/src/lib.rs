use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_host: String,
    pub bind_port: u16,
    pub environment: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_host: env::var("APP_BIND_HOST")
                .unwrap_or_else(|_| {
                    warn!("APP_BIND_HOST not set, using 0.0.0.0");
                    "0.0.0.0".to_string()
                }),
            bind_port: env::var("APP_BIND_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or_else(|| {
                    warn!("APP_BIND_PORT not set or invalid, using 3000");
                    3000
                }),
            environment: env::var("APP_ENVIRONMENT")
                .unwrap_or_else(|_| {
                    warn!("APP_ENVIRONMENT not set, using development");
                    "development".to_string()
                }),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
