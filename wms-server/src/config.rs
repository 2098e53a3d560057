//! Server configuration

use crate::BoxError;

/// Server configuration, read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// SQLite connection URL
    pub database_url: String,
    pub http_port: u16,
    /// HS256 secret for staff tokens
    pub jwt_secret: String,
    pub stripe_secret_key: String,
    /// SES sender address; mail is only sent when `ses_enabled`
    pub ses_from_email: String,
    pub ses_enabled: bool,
    /// Where Stripe Checkout sends the customer afterwards
    pub stripe_success_url: String,
    pub stripe_cancel_url: String,
    /// Where Stripe account onboarding returns the manager
    pub stripe_refresh_url: String,
    pub stripe_return_url: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn var_or(name: &str, default: &str) -> String {
        std::env::var(name)
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = Self::var_or("ENVIRONMENT", "development");

        Ok(Self {
            database_url: Self::var_or("DATABASE_URL", "sqlite://wms.db"),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            stripe_secret_key: Self::require_secret("STRIPE_SECRET_KEY", &environment)?,
            ses_from_email: Self::var_or("SES_FROM_EMAIL", "noreply@wms.local"),
            ses_enabled: std::env::var("SES_ENABLED")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            stripe_success_url: Self::var_or("STRIPE_SUCCESS_URL", "http://localhost:3000/payment/success"),
            stripe_cancel_url: Self::var_or("STRIPE_CANCEL_URL", "http://localhost:3000/payment/cancel"),
            stripe_refresh_url: Self::var_or("STRIPE_REFRESH_URL", "http://localhost:3000/payouts/refresh"),
            stripe_return_url: Self::var_or("STRIPE_RETURN_URL", "http://localhost:3000/payouts/return"),
            environment,
        })
    }
}
