use crate::config::EngineConfig;
use crate::error::EngineError;

/// Fallback capacity for configured models missing from the builtin table.
const FALLBACK_CONTEXT_TOKENS: u64 = 128_000;

/// Role a profile plays in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRole {
    Default,
    Reasoner,
    Other,
}

/// Immutable description of one selectable model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProfile {
    pub id: String,
    pub context_tokens: u64,
    pub role: ModelRole,
}

impl ModelProfile {
    #[must_use]
    pub fn new(id: impl Into<String>, context_tokens: u64, role: ModelRole) -> Self {
        Self {
            id: id.into(),
            context_tokens,
            role,
        }
    }
}

/// Insertion-ordered set of model profiles known to the session.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    profiles: Vec<ModelProfile>,
}

const BUILTIN_MODELS: &[(&str, u64)] = &[
    ("moonshotai/kimi-k2-instruct", 131_072),
    ("llama-3.3-70b-versatile", 131_072),
    ("llama-3.1-8b-instant", 131_072),
    ("mixtral-8x7b-32768", 32_768),
];

impl ModelRegistry {
    /// Builds the registry from the builtin table, marking the configured
    /// default and reasoner ids. Configured ids outside the table are added
    /// with a fallback capacity.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut profiles: Vec<ModelProfile> = BUILTIN_MODELS
            .iter()
            .map(|(id, context_tokens)| {
                ModelProfile::new(
                    *id,
                    *context_tokens,
                    role_for(id, &config.default_model, &config.reasoner_model),
                )
            })
            .collect();

        for configured in [&config.default_model, &config.reasoner_model] {
            if !profiles.iter().any(|profile| &profile.id == configured) {
                profiles.push(ModelProfile::new(
                    configured.clone(),
                    FALLBACK_CONTEXT_TOKENS,
                    role_for(configured, &config.default_model, &config.reasoner_model),
                ));
            }
        }

        Self { profiles }
    }

    /// Builds a registry from explicit profiles. The first profile acts as
    /// the default (and the reasoner, unless one is marked).
    #[must_use]
    pub fn with_profiles(profiles: Vec<ModelProfile>) -> Self {
        debug_assert!(!profiles.is_empty());
        Self { profiles }
    }

    pub fn resolve(&self, id: &str) -> Result<&ModelProfile, EngineError> {
        self.profiles
            .iter()
            .find(|profile| profile.id == id)
            .ok_or_else(|| EngineError::unknown_model(id))
    }

    #[must_use]
    pub fn list_all(&self) -> &[ModelProfile] {
        &self.profiles
    }

    #[must_use]
    pub fn default_profile(&self) -> &ModelProfile {
        self.profiles
            .iter()
            .find(|profile| profile.role == ModelRole::Default)
            .unwrap_or(&self.profiles[0])
    }

    #[must_use]
    pub fn reasoner_profile(&self) -> &ModelProfile {
        self.profiles
            .iter()
            .find(|profile| profile.role == ModelRole::Reasoner)
            .unwrap_or_else(|| self.default_profile())
    }
}

fn role_for(id: &str, default_id: &str, reasoner_id: &str) -> ModelRole {
    if id == default_id {
        ModelRole::Default
    } else if id == reasoner_id {
        ModelRole::Reasoner
    } else {
        ModelRole::Other
    }
}
