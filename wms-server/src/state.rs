//! Shared application state

use std::sync::Arc;

use aws_sdk_sesv2::Client as SesClient;
use sqlx::SqlitePool;

use crate::BoxError;
use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;
use crate::db::DbService;
use crate::email::{LogMailer, Mailer, SesMailer};
use crate::stripe::{PaymentProvider, StripeClient, StripeUrls};

#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// HS256 secret for staff tokens
    pub jwt_secret: String,
    /// Rate limiter for login/registration/password reset routes
    pub rate_limiter: RateLimiter,
    pub mailer: Arc<dyn Mailer>,
    pub payments: Arc<dyn PaymentProvider>,
}

impl AppState {
    /// Open the database and build the production collaborators
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let db = DbService::new(&config.database_url).await?;

        let mailer: Arc<dyn Mailer> = if config.ses_enabled {
            let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let ses = if let Ok(ses_region) = std::env::var("SES_REGION") {
                let ses_config = aws_config
                    .to_builder()
                    .region(aws_config::Region::new(ses_region))
                    .build();
                SesClient::new(&ses_config)
            } else {
                SesClient::new(&aws_config)
            };
            tracing::info!(from = %config.ses_from_email, "SES mail enabled");
            Arc::new(SesMailer::new(ses, config.ses_from_email.clone()))
        } else {
            tracing::info!("SES mail disabled, emails will be logged");
            Arc::new(LogMailer)
        };

        let payments = Arc::new(StripeClient::new(
            config.stripe_secret_key.clone(),
            StripeUrls {
                success: config.stripe_success_url.clone(),
                cancel: config.stripe_cancel_url.clone(),
                refresh: config.stripe_refresh_url.clone(),
                return_to: config.stripe_return_url.clone(),
            },
        ));

        Ok(Self::with_parts(db.pool, config.jwt_secret.clone(), mailer, payments))
    }

    /// Assemble state from already-built parts
    pub fn with_parts(
        pool: SqlitePool,
        jwt_secret: String,
        mailer: Arc<dyn Mailer>,
        payments: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            pool,
            jwt_secret,
            rate_limiter: RateLimiter::new(),
            mailer,
            payments,
        }
    }
}
