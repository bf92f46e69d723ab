//! Oracle selection from configuration.

use docchat_config::AppConfig;
use docchat_core::error::OracleError;
use docchat_core::oracle::TokenOracle;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::estimate::EstimatingOracle;
use crate::gemini::GeminiOracle;

/// Build the configured oracle.
///
/// The Gemini oracle needs an API key; the estimating oracle does not.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn TokenOracle>, OracleError> {
    debug!(provider = %config.provider, model = %config.model, "Building token oracle");

    match config.provider.as_str() {
        "gemini" => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                OracleError::NotConfigured(
                    "no API key (set api_key in config.toml or GOOGLE_API_KEY)".into(),
                )
            })?;

            let mut oracle = GeminiOracle::new(api_key)
                .with_model(&config.model)
                .with_timeout(Duration::from_secs(config.timeout_secs));
            if let Some(url) = &config.api_url {
                oracle = oracle.with_base_url(url);
            }
            Ok(Arc::new(oracle))
        }
        "estimate" => Ok(Arc::new(EstimatingOracle::new())),
        other => Err(OracleError::NotConfigured(format!(
            "unknown provider '{other}'"
        ))),
    }
}
