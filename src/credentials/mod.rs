pub mod storage;

pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StorageError};

use std::fmt;

/// Key under which the user's credential is persisted.
pub const STORAGE_KEY: &str = "gemini_api_key";

/// Last-resort credential baked in at build time, if any.
pub const BUILTIN_FALLBACK: Option<&str> = option_env!("NGLE_FALLBACK_API_KEY");

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("La clave API no puede estar vacía.")]
    EmptyCredential,
    #[error("La clave API contiene caracteres no válidos.")]
    Malformed,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// An API key that is safe to put in a request header. `Debug` never prints
/// the key itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn parse(raw: &str) -> Result<Self, CredentialError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::EmptyCredential);
        }
        if !trimmed.chars().all(|c| c.is_ascii_graphic()) {
            return Err(CredentialError::Malformed);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Entered by the user through `configure`.
    Configured,
    Environment(String),
    Persisted,
    Fallback,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured => write!(f, "configured"),
            Self::Environment(var) => write!(f, "environment ({})", var),
            Self::Persisted => write!(f, "persisted"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Environment-provided credentials, captured once. Later changes to the
/// process environment are not observed.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentCredentials {
    entries: Vec<(String, String)>,
}

impl EnvironmentCredentials {
    pub fn from_process(var_names: &[String]) -> Self {
        let entries = var_names
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| (name.clone(), value)))
            .collect();
        Self { entries }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self { entries: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    fn first_valid(&self) -> Option<(Credential, CredentialSource)> {
        self.entries.iter().find_map(|(name, value)| match Credential::parse(value) {
            Ok(credential) => Some((credential, CredentialSource::Environment(name.clone()))),
            Err(e) => {
                tracing::warn!(var = %name, error = %e, "ignoring unusable credential from environment");
                None
            }
        })
    }
}

/// Owns the active credential and its persisted copy.
///
/// Precedence: configured > environment > persisted > fallback. Every
/// mutation validates and persists first, then swaps the active slot, so a
/// failed `configure` or `clear` leaves the previous state intact.
pub struct CredentialStore {
    storage: Box<dyn KeyValueStore>,
    environment: EnvironmentCredentials,
    fallback: Option<String>,
    active: Option<(Credential, CredentialSource)>,
}

impl CredentialStore {
    /// Tries environment, then persisted, then fallback; the first source
    /// that yields a usable credential wins.
    pub fn initialize(
        storage: Box<dyn KeyValueStore>,
        environment: EnvironmentCredentials,
        fallback: Option<String>,
    ) -> Self {
        let mut store = Self { storage, environment, fallback, active: None };
        store.active = store
            .environment
            .first_valid()
            .or_else(|| store.persisted())
            .or_else(|| store.fallback_credential());
        store.log_active();
        store
    }

    fn persisted(&self) -> Option<(Credential, CredentialSource)> {
        match self.storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => match Credential::parse(&raw) {
                Ok(credential) => Some((credential, CredentialSource::Persisted)),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring unusable persisted credential");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted credential");
                None
            }
        }
    }

    fn fallback_credential(&self) -> Option<(Credential, CredentialSource)> {
        let raw = self.fallback.as_deref()?;
        Credential::parse(raw).ok().map(|credential| (credential, CredentialSource::Fallback))
    }

    fn log_active(&self) {
        match &self.active {
            Some((_, source)) => tracing::info!(%source, "API credential initialized"),
            None => tracing::warn!("no API credential available"),
        }
    }

    pub fn resolve_active(&self) -> Option<&Credential> {
        self.active.as_ref().map(|(credential, _)| credential)
    }

    pub fn active_source(&self) -> Option<&CredentialSource> {
        self.active.as_ref().map(|(_, source)| source)
    }

    pub fn is_configured(&self) -> bool {
        self.active.is_some()
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    pub fn configure(&mut self, key: &str) -> Result<(), CredentialError> {
        let credential = Credential::parse(key)?;
        self.storage.set(STORAGE_KEY, credential.expose())?;
        self.active = Some((credential, CredentialSource::Configured));
        self.log_active();
        Ok(())
    }

    /// Forgets the persisted credential and re-initializes from the
    /// environment, then the fallback. Safe to call repeatedly.
    pub fn clear(&mut self) -> Result<(), CredentialError> {
        self.storage.remove(STORAGE_KEY)?;
        self.active = self.environment.first_valid().or_else(|| self.fallback_credential());
        self.log_active();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_rejects_blank_or_control_characters() {
        assert_eq!(Credential::parse("  AIza123 \n").unwrap().expose(), "AIza123");
        assert!(matches!(Credential::parse("   "), Err(CredentialError::EmptyCredential)));
        assert!(matches!(Credential::parse("AI za"), Err(CredentialError::Malformed)));
        assert!(matches!(Credential::parse("clave\u{7f}"), Err(CredentialError::Malformed)));
    }

    #[test]
    fn debug_output_is_redacted() {
        let credential = Credential::parse("AIza-secret").unwrap();
        assert!(!format!("{:?}", credential).contains("secret"));
    }

    #[test]
    fn malformed_environment_value_falls_through_to_the_next_source() {
        let env = EnvironmentCredentials::from_pairs([("GEMINI_API_KEY", "bad key"), ("API_KEY", "good")]);
        let store = CredentialStore::initialize(Box::new(MemoryKeyValueStore::new()), env, None);
        assert_eq!(store.resolve_active().map(Credential::expose), Some("good"));
        assert_eq!(store.active_source(), Some(&CredentialSource::Environment("API_KEY".to_string())));
    }

    #[test]
    fn persisted_credential_beats_fallback() {
        let store = CredentialStore::initialize(
            Box::new(MemoryKeyValueStore::with_entry(STORAGE_KEY, "saved-key")),
            EnvironmentCredentials::default(),
            Some("fallback-key".to_string()),
        );
        assert_eq!(store.resolve_active().map(Credential::expose), Some("saved-key"));
        assert_eq!(store.active_source(), Some(&CredentialSource::Persisted));
    }

    #[test]
    fn clear_removes_the_saved_entry() {
        let mut store = CredentialStore::initialize(
            Box::new(MemoryKeyValueStore::with_entry(STORAGE_KEY, "saved-key")),
            EnvironmentCredentials::default(),
            None,
        );
        store.clear().unwrap();
        assert_eq!(store.storage().get(STORAGE_KEY).unwrap(), None);
        assert!(!store.is_configured());
    }

    #[test]
    fn nothing_available_leaves_store_unconfigured() {
        let store = CredentialStore::initialize(
            Box::new(MemoryKeyValueStore::new()),
            EnvironmentCredentials::default(),
            Some("   ".to_string()),
        );
        assert!(!store.is_configured());
        assert!(store.resolve_active().is_none());
    }
}
