//! Catalog of chat models the desk can talk to

/// LLM provider enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Futurix,
    OpenAI,
}

impl Provider {
    /// Get the display name for this provider
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Futurix => "FuturixAI",
            Provider::OpenAI => "OpenAI",
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Provider::Futurix => "SHIVAAY_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }
}

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// User-facing model ID
    pub id: &'static str,
    pub provider: Provider,
    /// Name sent in the `model` field of the request
    pub api_name: &'static str,
    pub description: &'static str,
    /// Chat-completions URL used when no gateway override is configured
    pub endpoint: &'static str,
}

/// Get all available model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "shivaay",
            provider: Provider::Futurix,
            api_name: "shivaay",
            description: "Shivaay (hosted, default loan advisor model)",
            endpoint: "https://api.futurixai.com/api/lara/v1/chat/completions",
        },
        ModelDef {
            id: "gpt-4o-mini",
            provider: Provider::OpenAI,
            api_name: "gpt-4o-mini",
            description: "GPT-4o mini (fast, inexpensive)",
            endpoint: "https://api.openai.com/v1/chat/completions",
        },
        ModelDef {
            id: "gpt-4o",
            provider: Provider::OpenAI,
            api_name: "gpt-4o",
            description: "GPT-4o (most capable OpenAI chat model)",
            endpoint: "https://api.openai.com/v1/chat/completions",
        },
    ]
}
