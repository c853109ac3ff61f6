//! Credential lookup for provider API keys.

use std::collections::HashMap;

/// Looks up a credential by its environment variable name.
///
/// Consulted on every catalog query and backend construction; nothing is
/// cached.
pub trait CredentialSource: Send + Sync {
    fn get(&self, env_var: &str) -> Option<String>;

    fn is_present(&self, env_var: &str) -> bool {
        self.get(env_var).is_some()
    }
}

/// Reads the process environment. Empty values count as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn get(&self, env_var: &str) -> Option<String> {
        std::env::var(env_var)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}

/// Fixed credentials, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    values: HashMap<String, String>
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, env_var: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(env_var.into(), value.into());
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn get(&self, env_var: &str) -> Option<String> {
        self.values
            .get(env_var)
            .filter(|value| !value.trim().is_empty())
            .cloned()
    }
}
