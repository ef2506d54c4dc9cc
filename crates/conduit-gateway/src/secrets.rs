//! Credential lookup by name

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};

use crate::error::GatewayError;

/// Source of provider credentials, keyed by the name configured in `api_key_env`
pub trait SecretStore: Send + Sync {
    /// Raw secret value, if the store has one
    fn get(&self, name: &str) -> Option<SecretString>;
}

/// Reads credentials from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretStore;

impl SecretStore for EnvSecretStore {
    fn get(&self, name: &str) -> Option<SecretString> {
        std::env::var(name).ok().map(SecretString::from)
    }
}

/// Fixed in-memory credentials, for embedding and tests
#[derive(Debug, Default)]
pub struct MapSecretStore {
    secrets: HashMap<String, SecretString>,
}

impl MapSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(name.into(), SecretString::from(value.into()));
        self
    }
}

impl SecretStore for MapSecretStore {
    fn get(&self, name: &str) -> Option<SecretString> {
        self.secrets.get(name).cloned()
    }
}

/// Sample-config sentinel for a credential named `name`
///
/// `CEREBRAS_API_KEY` becomes `YOUR_CEREBRAS_API_KEY_HERE`.
pub fn placeholder_for(name: &str) -> String {
    format!("YOUR_{name}_HERE")
}

/// Look up a usable credential
///
/// Missing values, blank values, and unedited placeholders all count as
/// not configured.
pub fn resolve_credential(store: &dyn SecretStore, name: &str) -> Result<SecretString, GatewayError> {
    let unresolved = || GatewayError::UnresolvedCredential { name: name.to_owned() };

    let secret = store.get(name).ok_or_else(unresolved)?;
    let value = secret.expose_secret().trim();

    if value.is_empty() || value == placeholder_for(name) {
        return Err(unresolved());
    }

    Ok(secret)
}
