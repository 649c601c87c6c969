//! Model registry for managing available LLM providers

use super::{
    all_models, LlmError, LlmRequest, LlmResponse, LlmService, LoggingService, ModelDef,
    OpenAICompatService, Provider,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

const PREFERRED_DEFAULT: &str = "shivaay";

/// Configuration for LLM providers
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub shivaay_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Chat-completions URL that replaces every model's own endpoint
    /// (e.g. a local OpenAI-compatible gateway)
    pub base_url: Option<String>,
    /// Default model ID
    pub default_model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            shivaay_api_key: std::env::var("SHIVAAY_API_KEY").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: std::env::var("LLM_BASE_URL").ok(),
            default_model: std::env::var("DEFAULT_MODEL").ok(),
        }
    }
}

/// Registry of available LLM models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
}

impl ModelRegistry {
    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        for model_def in all_models() {
            if let Some(service) = Self::try_create_model(model_def, config) {
                services.insert(model_def.id.to_string(), service);
            }
        }

        let default_model = config
            .default_model
            .clone()
            .or_else(|| {
                if services.contains_key(PREFERRED_DEFAULT) {
                    Some(PREFERRED_DEFAULT.to_string())
                } else {
                    let mut ids: Vec<_> = services.keys().cloned().collect();
                    ids.sort();
                    ids.into_iter().next()
                }
            })
            .unwrap_or_else(|| PREFERRED_DEFAULT.to_string());

        Self {
            services,
            default_model,
        }
    }

    /// Try to create a model service, validating prerequisites
    fn try_create_model(model_def: &ModelDef, config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
        let key = match model_def.provider {
            Provider::Futurix => config.shivaay_api_key.as_ref(),
            Provider::OpenAI => config.openai_api_key.as_ref(),
        }
        .filter(|k| !k.is_empty());

        // Behind a gateway the key is optional; the gateway authenticates
        let api_key = match (key, config.base_url.is_some()) {
            (Some(k), _) => k.clone(),
            (None, true) => "implicit".to_string(),
            (None, false) => return None,
        };

        let endpoint = config.base_url.as_deref().unwrap_or(model_def.endpoint);

        match OpenAICompatService::new(api_key, model_def.id, model_def.api_name, endpoint) {
            Ok(service) => Some(Arc::new(LoggingService::new(Arc::new(service)))),
            Err(e) => {
                tracing::warn!(model = model_def.id, error = %e, "Failed to create LLM service");
                None
            }
        }
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    /// Get the default model
    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    /// Get the default model ID
    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    /// Get detailed information about available models
    pub fn available_model_info(&self) -> Vec<crate::api::ModelInfo> {
        all_models()
            .iter()
            .filter(|def| self.services.contains_key(def.id))
            .map(|def| crate::api::ModelInfo {
                id: def.id.to_string(),
                provider: def.provider.display_name().to_string(),
                description: def.description.to_string(),
            })
            .collect()
    }

    /// Check if any models are available
    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }

    /// Environment variables that would enable at least one model
    pub fn missing_key_hint() -> String {
        let mut vars: Vec<&str> = all_models()
            .iter()
            .map(|def| def.provider.api_key_env_var())
            .collect();
        vars.dedup();
        format!("Set {} or LLM_BASE_URL", vars.join(" or "))
    }

    /// Registry over prebuilt services
    #[cfg(test)]
    pub fn from_services(services: Vec<Arc<dyn LlmService>>, default_model: &str) -> Self {
        Self {
            services: services
                .into_iter()
                .map(|s| (s.model_id().to_string(), s))
                .collect(),
            default_model: default_model.to_string(),
        }
    }
}

/// Adapter that resolves the model on every call, falling back to the default
pub struct RegistryLlmClient {
    registry: Arc<ModelRegistry>,
    model_id: String,
}

impl RegistryLlmClient {
    pub fn new(registry: Arc<ModelRegistry>, model_id: String) -> Self {
        Self { registry, model_id }
    }
}

#[async_trait]
impl LlmService for RegistryLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let llm = self
            .registry
            .get(&self.model_id)
            .or_else(|| self.registry.default())
            .ok_or_else(|| LlmError::network("No LLM available"))?;
        llm.complete(request).await
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
