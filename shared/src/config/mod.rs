use thiserror::Error;

pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";
pub const REMOVE_BASE_PATH_VAR: &str = "REMOVE_BASE_PATH";
pub const PORT_VAR: &str = "PORT";

const DEFAULT_PORT: u16 = 3001;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing SUPABASE_URL or SUPABASE_ANON_KEY")]
    MissingSupabaseSettings,
}

/// Validated connection settings for the Supabase project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// Joins `path` onto the project URL, ignoring a trailing slash on the URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Service configuration, read once when the router is built.
///
/// The Supabase values are kept optional here; whether they are present is
/// checked per request so a misconfigured deployment still answers with a
/// JSON error instead of failing to start.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub remove_base_path: bool,
    pub port: u16,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let remove_base_path = lookup(REMOVE_BASE_PATH_VAR)
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let port = match lookup(PORT_VAR) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid {} value: {}", PORT_VAR, raw);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        Self {
            supabase_url: non_empty(SUPABASE_URL_VAR),
            supabase_anon_key: non_empty(SUPABASE_ANON_KEY_VAR),
            remove_base_path,
            port,
        }
    }

    /// Configuration with both Supabase values set and defaults elsewhere.
    pub fn with_supabase(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            supabase_url: Some(url.into()),
            supabase_anon_key: Some(anon_key.into()),
            remove_base_path: false,
            port: DEFAULT_PORT,
        }
    }

    pub fn supabase(&self) -> Result<SupabaseConfig, ConfigError> {
        match (&self.supabase_url, &self.supabase_anon_key) {
            (Some(url), Some(anon_key)) => Ok(SupabaseConfig::new(url, anon_key)),
            _ => Err(ConfigError::MissingSupabaseSettings),
        }
    }
}
