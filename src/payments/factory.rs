use crate::config::AppConfig;
use crate::payments::error::PaymentResult;
use crate::payments::provider::PaymentStatusProvider;
use crate::payments::providers::{KhqrProvider, SourceApiProvider};
use crate::payments::types::ProviderName;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct PaymentFactoryConfig {
    pub default_provider: ProviderName,
    pub source_api: crate::config::SourceApiConfig,
    pub khqr: crate::config::KhqrConfig,
}

impl From<&AppConfig> for PaymentFactoryConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            default_provider: config.upstream.provider,
            source_api: config.source_api.clone(),
            khqr: config.khqr.clone(),
        }
    }
}

pub struct PaymentProviderFactory {
    config: PaymentFactoryConfig,
}

impl PaymentProviderFactory {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            config: PaymentFactoryConfig::from(config),
        }
    }

    pub fn with_config(config: PaymentFactoryConfig) -> Self {
        Self { config }
    }

    pub fn get_provider(
        &self,
        provider: ProviderName,
    ) -> PaymentResult<Arc<dyn PaymentStatusProvider>> {
        match provider {
            ProviderName::SourceApi => Ok(Arc::new(SourceApiProvider::new(
                self.config.source_api.clone(),
            )?)),
            ProviderName::Khqr => Ok(Arc::new(KhqrProvider::new(self.config.khqr.clone())?)),
        }
    }

    pub fn get_default_provider(&self) -> PaymentResult<Arc<dyn PaymentStatusProvider>> {
        self.get_provider(self.config.default_provider)
    }

    /// Upstreams whose configuration is complete enough to build.
    pub fn list_available_providers(&self) -> Vec<ProviderName> {
        let mut available = vec![ProviderName::SourceApi];
        if self.config.khqr.token.is_some() {
            available.push(ProviderName::Khqr);
        }
        available
    }
}
