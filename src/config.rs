//! Run configuration.
//!
//! Settings come from four places, highest precedence first:
//! command line flags, environment variables, a TOML file, defaults.
//!
//! ```toml
//! baseline_dir = "/srv/gv"      # <dir>/predefined_<TIER>.substvar
//! parallel = true
//!
//! [credentials]
//! prefix = "//common-om-connections///Connections/JDBC/Postgres_Appl/"
//! alternate_identity = "omselect"
//!
//! [tiers.DEV4]
//! baseline = "/srv/gv/dev/predefined_DEV4.substvar"
//! credential_rule = true
//!
//! [tiers.UAT]
//! enabled = false
//! ```

use crate::checks::credentials::{CredentialKeySet, DEFAULT_ALTERNATE_IDENTITY, DEFAULT_CONNECTION_PREFIX};
use crate::checks::tier::TierProfile;
use crate::cli::args::CheckArgs;
use crate::Tier;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {}", .path.display(), .source)]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    UnknownTier(#[from] crate::UnknownTier),

    #[error("no baseline configured for tier {0} (set tiers.{0}.baseline or baseline_dir)")]
    MissingBaseline(Tier),

    #[error("tier {0} has an empty baseline path")]
    EmptyBaseline(Tier),

    #[error("tier {0} was requested but is disabled in the configuration")]
    TierDisabled(Tier),

    #[error("no tier has a baseline configured")]
    NoTiers,

    #[error("max_parallel must be at least 1")]
    InvalidMaxParallel,

    #[error("credential {0} must not be empty")]
    EmptyCredentialSetting(&'static str),
}

/// Settings of one tier as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TierSettings {
    pub baseline: Option<PathBuf>,
    pub credential_rule: Option<bool>,
    pub exclusions: Option<Vec<String>>,
    pub enabled: Option<bool>,
}

impl TierSettings {
    fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CredentialSettings {
    prefix: Option<String>,
    alternate_identity: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    baseline_dir: Option<PathBuf>,
    parallel: Option<bool>,
    fail_fast: Option<bool>,
    max_parallel: Option<usize>,
    credentials: CredentialSettings,
    tiers: BTreeMap<String, TierSettings>,
}

/// Configuration for a validation run.
#[derive(Debug, Clone)]
pub struct PreflightConfig {
    /// Directory holding `predefined_<TIER>.substvar` files
    pub baseline_dir: Option<PathBuf>,
    pub tiers: BTreeMap<Tier, TierSettings>,
    pub credential_prefix: String,
    pub alternate_identity: String,
    /// Tiers to validate (empty = every tier with a baseline)
    pub selected: Vec<Tier>,
    pub parallel: bool,
    pub fail_fast: bool,
    pub max_parallel: usize,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        PreflightConfig {
            baseline_dir: None,
            tiers: BTreeMap::new(),
            credential_prefix: DEFAULT_CONNECTION_PREFIX.to_string(),
            alternate_identity: DEFAULT_ALTERNATE_IDENTITY.to_string(),
            selected: Vec::new(),
            parallel: false,
            fail_fast: false,
            max_parallel: 4,
        }
    }
}

impl PreflightConfig {
    /// Load a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&text).map_err(|e| match e {
            ConfigError::Toml { source, .. } => ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse TOML config text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: PathBuf::from("<inline>"),
            source,
        })?;

        let defaults = PreflightConfig::default();
        let mut tiers = BTreeMap::new();
        for (name, settings) in file.tiers {
            tiers.insert(name.parse::<Tier>()?, settings);
        }

        Ok(PreflightConfig {
            baseline_dir: file.baseline_dir,
            tiers,
            credential_prefix: file.credentials.prefix.unwrap_or(defaults.credential_prefix),
            alternate_identity: file
                .credentials
                .alternate_identity
                .unwrap_or(defaults.alternate_identity),
            selected: Vec::new(),
            parallel: file.parallel.unwrap_or(defaults.parallel),
            fail_fast: file.fail_fast.unwrap_or(defaults.fail_fast),
            max_parallel: file.max_parallel.unwrap_or(defaults.max_parallel),
        })
    }

    /// Build the configuration for the `check` command.
    ///
    /// The config file (from `--config` or `BW_PREFLIGHT_CONFIG`) is loaded
    /// first and command line values are layered on top.
    pub fn from_args(args: &CheckArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(dir) = &args.baseline_dir {
            config.baseline_dir = Some(dir.clone());
        }
        for baseline in &args.baseline {
            config.set_baseline(baseline.tier, &baseline.path);
        }
        config.selected = args.tier.clone();
        config.parallel |= args.parallel;
        config.fail_fast |= args.fail_fast;
        if let Some(max) = args.max_parallel {
            config.max_parallel = max;
        }

        Ok(config)
    }

    /// Set (or replace) the baseline file of a tier
    pub fn set_baseline(&mut self, tier: Tier, path: impl Into<PathBuf>) {
        self.tiers.entry(tier).or_default().baseline = Some(path.into());
    }

    pub fn credential_keys(&self) -> CredentialKeySet {
        CredentialKeySet::new(&self.credential_prefix, &self.alternate_identity)
    }

    /// Check the configuration without building profiles
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tier_profiles().map(|_| ())
    }

    /// Validate the configuration and build one profile per tier to run.
    ///
    /// Without an explicit selection every tier with a resolvable baseline
    /// runs; tiers named in the file but lacking a baseline are an error.
    pub fn tier_profiles(&self) -> Result<Vec<TierProfile>, ConfigError> {
        if self.max_parallel == 0 {
            return Err(ConfigError::InvalidMaxParallel);
        }
        if self.credential_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyCredentialSetting("prefix"));
        }
        if self.alternate_identity.trim().is_empty() {
            return Err(ConfigError::EmptyCredentialSetting("alternate_identity"));
        }

        let credentials = self.credential_keys();
        let explicit = !self.selected.is_empty();
        let mut profiles = Vec::new();

        for tier in Tier::ALL {
            let settings = self.tiers.get(&tier);
            let requested = self.selected.contains(&tier);

            if explicit && !requested {
                continue;
            }
            if !settings.map_or(true, TierSettings::is_enabled) {
                if requested {
                    return Err(ConfigError::TierDisabled(tier));
                }
                continue;
            }

            let baseline = match self.baseline_for(tier, settings) {
                Some(path) => path,
                None if requested || settings.is_some() => return Err(ConfigError::MissingBaseline(tier)),
                None => continue,
            };
            if baseline.as_os_str().is_empty() {
                return Err(ConfigError::EmptyBaseline(tier));
            }

            let mut profile = TierProfile::new(tier, baseline).with_credentials(credentials.clone());
            if let Some(settings) = settings {
                if let Some(enabled) = settings.credential_rule {
                    profile = profile.with_credential_rule(enabled);
                }
                if let Some(exclusions) = &settings.exclusions {
                    profile = profile.with_exclusions(exclusions.iter().cloned());
                }
            }
            profiles.push(profile);
        }

        if profiles.is_empty() {
            return Err(ConfigError::NoTiers);
        }
        Ok(profiles)
    }

    fn baseline_for(&self, tier: Tier, settings: Option<&TierSettings>) -> Option<PathBuf> {
        settings
            .and_then(|s| s.baseline.clone())
            .or_else(|| {
                self.baseline_dir
                    .as_ref()
                    .map(|dir| dir.join(tier.baseline_file_name()))
            })
    }
}
