//! Configuration system (layered: code > env > rule file > built-in rules).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use strum::{Display, EnumString};

use crate::error::{OrderingError, Result};
use crate::ordering::OrderingPolicy;

/// Path to a TOML rule file.
pub const RULES_FILE_ENV: &str = "ROCI_ORDERING_RULES_FILE";
/// `auto`, `always` or `never`.
pub const MODE_ENV: &str = "ROCI_ORDERING_MODE";
/// Enables debug dumps of transcripts before and after repair.
pub const LOG_SEQUENCES_ENV: &str = "ROCI_ORDERING_LOG_SEQUENCES";

const DEFAULT_RULES_FILE: &str = "ordering.toml";

/// Global default config (lazy-initialized from env).
static DEFAULT_CONFIG: OnceLock<OrderingConfig> = OnceLock::new();

/// When repair runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OrderingMode {
    /// The policy decides per model and provider.
    #[default]
    Auto,
    /// Every transcript is repaired.
    Always,
    /// Transcripts pass through untouched.
    Never,
}

/// Layered configuration for ordering enforcement.
#[derive(Clone, Default)]
pub struct OrderingConfig {
    policy: OrderingPolicy,
    mode: OrderingMode,
    log_sequences: bool,
    rules_file: Option<PathBuf>,
}

impl fmt::Debug for OrderingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderingConfig")
            .field("rules", &self.policy.rules().len())
            .field("mode", &self.mode)
            .field("log_sequences", &self.log_sequences)
            .field("rules_file", &self.rules_file)
            .finish()
    }
}

impl OrderingConfig {
    /// Built-in rules, `auto` mode, no sequence logging.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: OrderingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_mode(mut self, mode: OrderingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_log_sequences(mut self, enabled: bool) -> Self {
        self.log_sequences = enabled;
        self
    }

    /// Load from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    ///
    /// An explicit rule file must exist; the default one
    /// (`~/.roci/ordering.toml`) is optional.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(raw) = non_empty(lookup(MODE_ENV)) {
            config.mode = OrderingMode::from_str(raw.trim()).map_err(|_| {
                OrderingError::Configuration(format!(
                    "{MODE_ENV}='{raw}': expected one of auto, always, never"
                ))
            })?;
        }

        if let Some(raw) = non_empty(lookup(LOG_SEQUENCES_ENV)) {
            config.log_sequences = parse_flag(LOG_SEQUENCES_ENV, &raw)?;
        }

        match non_empty(lookup(RULES_FILE_ENV)) {
            Some(path) => config.load_rules_file(PathBuf::from(path))?,
            None => {
                let path = default_rules_path();
                if path.is_file() {
                    config.load_rules_file(path)?;
                }
            }
        }

        Ok(config)
    }

    /// Get (or create) the global default config.
    ///
    /// A broken environment falls back to the built-in configuration with a
    /// warning, so callers on the request path never fail here.
    pub fn global() -> &'static OrderingConfig {
        DEFAULT_CONFIG.get_or_init(|| {
            Self::from_env().unwrap_or_else(|err| {
                tracing::warn!(
                    error = %err,
                    "invalid ordering configuration; using built-in rules"
                );
                Self::new()
            })
        })
    }

    pub fn policy(&self) -> &OrderingPolicy {
        &self.policy
    }

    pub fn mode(&self) -> OrderingMode {
        self.mode
    }

    pub fn log_sequences(&self) -> bool {
        self.log_sequences
    }

    /// Rule file the policy was loaded from, if any.
    pub fn rules_file(&self) -> Option<&Path> {
        self.rules_file.as_deref()
    }

    /// Whether transcripts for this backend should be repaired.
    pub fn requires_strict_ordering(&self, model_id: &str, provider_id: Option<&str>) -> bool {
        match self.mode {
            OrderingMode::Auto => self.policy.requires_strict_ordering(model_id, provider_id),
            OrderingMode::Always => true,
            OrderingMode::Never => false,
        }
    }

    fn load_rules_file(&mut self, path: PathBuf) -> Result<()> {
        self.policy = OrderingPolicy::load(&path).map_err(|err| match err {
            OrderingError::Io(io) => OrderingError::Configuration(format!(
                "cannot read rule file {}: {io}",
                path.display()
            )),
            other => other,
        })?;
        tracing::debug!(
            path = %path.display(),
            rules = self.policy.rules().len(),
            "loaded ordering rules"
        );
        self.rules_file = Some(path);
        Ok(())
    }
}

/// `~/.roci/ordering.toml`.
pub fn default_rules_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".roci"))
        .unwrap_or_else(|| PathBuf::from(".roci"))
        .join(DEFAULT_RULES_FILE)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(OrderingError::Configuration(format!(
            "{key}='{raw}': expected a boolean"
        ))),
    }
}
