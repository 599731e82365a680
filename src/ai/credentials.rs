use keyring::Entry;

const SERVICE_NAME: &str = "pdf-organizer";

/// Provider name used as the keychain user
pub const OPENAI_PROVIDER: &str = "openai";

/// Environment variable consulted when the config file has no key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// API key lookup: config value, then environment, then OS keychain
pub struct CredentialManager;

impl CredentialManager {
    /// Resolve the API key for a run.
    ///
    /// Order: non-empty value from the config file, `OPENAI_API_KEY`, keychain.
    pub fn resolve_api_key(configured: Option<&str>) -> Option<String> {
        Self::resolve_with(configured, |k| std::env::var(k).ok(), || {
            Self::get_api_key(OPENAI_PROVIDER).ok()
        })
    }

    fn resolve_with<E, K>(configured: Option<&str>, env: E, keychain: K) -> Option<String>
    where
        E: Fn(&str) -> Option<String>,
        K: FnOnce() -> Option<String>,
    {
        if let Some(key) = configured.map(str::trim).filter(|k| !k.is_empty()) {
            tracing::debug!("[Credentials] Using API key from config file");
            return Some(key.to_string());
        }

        if let Some(key) = env(OPENAI_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            tracing::debug!("[Credentials] Using API key from {}", OPENAI_API_KEY_ENV);
            return Some(key.trim().to_string());
        }

        let key = keychain();
        if key.is_some() {
            tracing::debug!("[Credentials] Using API key from keychain");
        }
        key
    }

    /// Store an API key in the OS keychain
    pub fn store_api_key(provider: &str, api_key: &str) -> Result<(), String> {
        let entry = Entry::new(SERVICE_NAME, provider)
            .map_err(|e| format!("Keychain unavailable: {}", e))?;
        entry
            .set_password(api_key)
            .map_err(|e| format!("Failed to store API key: {}", e))?;
        tracing::info!("[Credentials] Stored API key in keychain for: {}", provider);
        Ok(())
    }

    /// Get an API key from the OS keychain
    pub fn get_api_key(provider: &str) -> Result<String, String> {
        let entry = Entry::new(SERVICE_NAME, provider)
            .map_err(|e| format!("Keychain unavailable: {}", e))?;
        entry
            .get_password()
            .map_err(|_| "API key not found".to_string())
    }
}
