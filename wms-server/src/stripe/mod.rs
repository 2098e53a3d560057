//! Stripe Connect integration via REST API (no SDK dependency)
//!
//! Each restaurant's manager owns an Express connected account. Customers
//! pay through a Checkout session whose funds are transferred to that
//! account minus a fixed platform fee.

use async_trait::async_trait;

use crate::BoxError;

const API: &str = "https://api.stripe.com/v1";

/// Platform fee per checkout, in cents
pub const APPLICATION_FEE_CENTS: i64 = 123;

/// Checkout currency
pub const CURRENCY: &str = "aud";

/// One line of a checkout: `quantity` units at `unit_amount` cents each
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub name: String,
    pub unit_amount: i64,
    pub quantity: i64,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create an Express account, returning its id
    async fn create_account(&self, email: &str) -> Result<String, BoxError>;

    /// Onboarding URL for an account
    async fn onboarding_link(&self, account_id: &str) -> Result<String, BoxError>;

    /// Whether the account holder finished submitting their details
    async fn details_submitted(&self, account_id: &str) -> Result<bool, BoxError>;

    /// Create a payment-mode Checkout session paying out to `account_id`,
    /// returning its URL
    async fn create_checkout(&self, account_id: &str, lines: &[CheckoutLine]) -> Result<String, BoxError>;
}

/// Redirect targets handed to Stripe
#[derive(Debug, Clone)]
pub struct StripeUrls {
    pub success: String,
    pub cancel: String,
    pub refresh: String,
    pub return_to: String,
}

pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    urls: StripeUrls,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>, urls: StripeUrls) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            urls,
        }
    }

    async fn post(&self, path: &str, form: &[(String, String)]) -> Result<serde_json::Value, BoxError> {
        let resp = self
            .http
            .post(format!("{API}/{path}"))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(form)
            .send()
            .await?
            .json()
            .await?;
        Ok(resp)
    }
}

/// Form fields for a Checkout session
pub fn checkout_form(account_id: &str, lines: &[CheckoutLine], urls: &StripeUrls) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), urls.success.clone()),
        ("cancel_url".to_string(), urls.cancel.clone()),
        (
            "payment_intent_data[application_fee_amount]".to_string(),
            APPLICATION_FEE_CENTS.to_string(),
        ),
        (
            "payment_intent_data[transfer_data][destination]".to_string(),
            account_id.to_string(),
        ),
    ];
    for (i, line) in lines.iter().enumerate() {
        let key = |field: &str| format!("line_items[{i}]{field}");
        form.push((key("[price_data][currency]"), CURRENCY.to_string()));
        form.push((key("[price_data][product_data][name]"), line.name.clone()));
        form.push((key("[price_data][unit_amount]"), line.unit_amount.to_string()));
        form.push((key("[quantity]"), line.quantity.to_string()));
    }
    form
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_account(&self, email: &str) -> Result<String, BoxError> {
        let form = [
            ("type".to_string(), "express".to_string()),
            ("email".to_string(), email.to_string()),
        ];
        let resp = self.post("accounts", &form).await?;
        resp["id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| format!("Stripe create_account failed: {resp}").into())
    }

    async fn onboarding_link(&self, account_id: &str) -> Result<String, BoxError> {
        let form = [
            ("account".to_string(), account_id.to_string()),
            ("refresh_url".to_string(), self.urls.refresh.clone()),
            ("return_url".to_string(), self.urls.return_to.clone()),
            ("type".to_string(), "account_onboarding".to_string()),
        ];
        let resp = self.post("account_links", &form).await?;
        resp["url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| format!("Stripe account link failed: {resp}").into())
    }

    async fn details_submitted(&self, account_id: &str) -> Result<bool, BoxError> {
        let resp: serde_json::Value = self
            .http
            .get(format!("{API}/accounts/{account_id}"))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?
            .json()
            .await?;
        resp["details_submitted"]
            .as_bool()
            .ok_or_else(|| format!("Stripe retrieve account failed: {resp}").into())
    }

    async fn create_checkout(&self, account_id: &str, lines: &[CheckoutLine]) -> Result<String, BoxError> {
        let form = checkout_form(account_id, lines, &self.urls);
        let resp = self.post("checkout/sessions", &form).await?;
        resp["url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| format!("Stripe create_checkout failed: {resp}").into())
    }
}
