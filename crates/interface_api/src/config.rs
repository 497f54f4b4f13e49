//! API configuration

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use core_kernel::{Currency, HourlyRate, Money, MoneyError, RetryPolicy};
use domain_claims::service::DEFAULT_UPLOAD_LINK_BASE;
use domain_claims::{NegativeAmountPolicy, ServiceSettings, UploadConfig, WorkflowPolicy};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    pub log_format: LogFormat,
    /// Base URL of the customer photo upload page
    pub upload_link_base_url: String,
    pub currency: Currency,
    /// Hourly labor rate applied to every damage line
    pub labor_rate: Decimal,
    pub max_photos: usize,
    /// Bytes per upload chunk
    pub upload_chunk_size: usize,
    pub upload_max_retries: u32,
    pub upload_retry_delay_ms: u64,
    pub notification_max_retries: u32,
    pub assessment_timeout_secs: u64,
    /// How long finished assessment jobs stay queryable
    pub job_retention_secs: u64,
    /// Refuse review submission while any line is unreviewed
    pub require_all_lines_reviewed: bool,
    pub negative_amount_policy: NegativeAmountPolicy,
    /// Load the dashboard demo claims at startup
    pub seed_demo_data: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            upload_link_base_url: DEFAULT_UPLOAD_LINK_BASE.to_string(),
            currency: Currency::USD,
            labor_rate: dec!(150),
            max_photos: 10,
            upload_chunk_size: 64 * 1024,
            upload_max_retries: 3,
            upload_retry_delay_ms: 200,
            notification_max_retries: 3,
            assessment_timeout_secs: 30,
            job_retention_secs: 3600,
            require_all_lines_reviewed: true,
            negative_amount_policy: NegativeAmountPolicy::Reject,
            seed_demo_data: true,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("API")
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Guards applied by the workflow controller
    pub fn workflow_policy(&self) -> WorkflowPolicy {
        WorkflowPolicy {
            require_all_lines_reviewed: self.require_all_lines_reviewed,
            negative_amounts: self.negative_amount_policy,
            max_photos: self.max_photos,
        }
    }

    /// Service wiring derived from this configuration
    ///
    /// # Errors
    ///
    /// Fails if the labor rate is negative.
    pub fn service_settings(&self) -> Result<ServiceSettings, MoneyError> {
        let labor_rate = HourlyRate::new(Money::new(self.labor_rate, self.currency))?;
        let retry = RetryPolicy {
            max_retries: self.upload_max_retries,
            retry_delay_ms: self.upload_retry_delay_ms,
            ..RetryPolicy::default()
        };

        let mut settings = ServiceSettings::new(labor_rate);
        settings.policy = self.workflow_policy();
        settings.upload = UploadConfig {
            chunk_size: self.upload_chunk_size,
            retry,
        };
        settings.upload_link_base = self.upload_link_base_url.clone();
        settings.assessment_timeout = Duration::from_secs(self.assessment_timeout_secs);
        settings.job_retention = Duration::from_secs(self.job_retention_secs);
        settings.notification_retry = RetryPolicy {
            max_retries: self.notification_max_retries,
            ..RetryPolicy::default()
        };
        Ok(settings)
    }
}
