//! Configuration resolution with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <path>` if given, else `~/.devspace`
//! 3. Environment variables named after an option (`NAMESPACE`, `KUBE_CONTEXT`)
//! 4. Environment variables with `DEVSPACE_*` prefix
//!
//! Exactly one file location is considered per run. A missing file is not an
//! error, a malformed one is reported and skipped, and only a missing home
//! directory aborts startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::traits::HomeDirProvider;

/// Base name of the config file in the home directory (no extension).
pub const CONFIG_BASE_NAME: &str = ".devspace";

/// Prefix of environment variables overriding file values.
pub const ENV_PREFIX: &str = "DEVSPACE";

/// Extensions tried after the extensionless base name.
const KNOWN_EXTENSIONS: [&str; 4] = ["yaml", "yml", "toml", "json"];

/// User-level defaults consulted when the matching global flag is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Default namespace
    pub namespace: Option<String>,
    /// Default kube context
    pub kube_context: Option<String>,
}

/// Where the config file is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config <path>`: the sole candidate, no default search
    Explicit(PathBuf),
    /// `<home>/.devspace`, with or without a format extension
    HomeDefault(PathBuf),
}

impl ConfigSource {
    /// Pick the single base location for this run.
    ///
    /// # Errors
    /// `ApplicationError::HomeDirUnavailable` if no explicit path is given and
    /// the home directory cannot be determined.
    pub fn resolve(
        explicit: Option<&Path>,
        home: &dyn HomeDirProvider,
    ) -> ApplicationResult<Self> {
        if let Some(path) = explicit {
            let expanded = shellexpand::full(&path.to_string_lossy())
                .map(|s| PathBuf::from(s.into_owned()))
                .unwrap_or_else(|_| path.to_path_buf());
            return Ok(Self::Explicit(expanded));
        }

        let home = home.home_dir().ok_or(ApplicationError::HomeDirUnavailable)?;
        Ok(Self::HomeDefault(home.join(CONFIG_BASE_NAME)))
    }

    /// Path as given or as derived from the home directory.
    pub fn base_path(&self) -> &Path {
        match self {
            Self::Explicit(path) | Self::HomeDefault(path) => path,
        }
    }

    /// The existing file this source refers to, with its format.
    fn locate(&self) -> Option<(PathBuf, FileFormat)> {
        match self {
            Self::Explicit(path) => path
                .is_file()
                .then(|| (path.clone(), format_for(path))),
            Self::HomeDefault(base) => {
                if base.is_file() {
                    return Some((base.clone(), FileFormat::Yaml));
                }
                KNOWN_EXTENSIONS.iter().find_map(|ext| {
                    let candidate = with_suffix(base, ext);
                    candidate
                        .is_file()
                        .then(|| (candidate.clone(), format_for(&candidate)))
                })
            }
        }
    }
}

/// What happened to the file layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLoad {
    /// File found and parsed
    Loaded(PathBuf),
    /// No file at the resolved location; defaults apply
    NotFound,
    /// File present but unreadable or unparsable; defaults apply
    Malformed { path: PathBuf, reason: String },
}

/// Result of config resolution: the chosen location, the file outcome and the
/// effective settings (file layer plus environment overrides).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub source: ConfigSource,
    pub load: ConfigLoad,
    pub settings: Settings,
}

impl Settings {
    /// Resolve location, load the file layer and apply environment overrides.
    ///
    /// # Arguments
    /// * `explicit` - Value of `--config`, if given
    /// * `home` - Home directory lookup
    /// * `env` - Environment for overrides, `None` = process environment
    pub fn resolve(
        explicit: Option<&Path>,
        home: &dyn HomeDirProvider,
        env: Option<HashMap<String, String>>,
    ) -> ApplicationResult<ResolvedConfig> {
        let source = ConfigSource::resolve(explicit, home)?;
        debug!("config source: {:?}", source);

        let (settings, load) = match source.locate() {
            None => (Settings::default(), ConfigLoad::NotFound),
            Some((path, format)) => match Self::load_file(&path, format) {
                Ok(settings) => {
                    info!("Using config file: {}", path.display());
                    (settings, ConfigLoad::Loaded(path))
                }
                Err(e) => {
                    let reason = e.to_string();
                    warn!("Ignoring config file {}: {}", path.display(), reason);
                    (Settings::default(), ConfigLoad::Malformed { path, reason })
                }
            },
        };

        let settings = settings.apply_env_overrides(env);

        Ok(ResolvedConfig {
            source,
            load,
            settings,
        })
    }

    fn load_file(path: &Path, format: FileFormat) -> ApplicationResult<Self> {
        Config::builder()
            .add_source(File::from(path).format(format).required(true))
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| ApplicationError::Config {
                message: format!("parse {}: {}", path.display(), e),
            })
    }

    /// Apply environment variables as explicit overrides.
    ///
    /// Bare option names (`NAMESPACE`) are read first, `DEVSPACE_*` names are
    /// added on top, so the prefixed form wins when both are set. Env vars
    /// replace file values, never the other way round.
    fn apply_env_overrides(mut self, env: Option<HashMap<String, String>>) -> Self {
        let config = Config::builder()
            .add_source(Environment::default().source(env.clone()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build();

        let config = match config {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring environment overrides: {}", e);
                return self;
            }
        };

        if let Ok(val) = config.get_string("namespace") {
            self.namespace = Some(val);
        }
        if let Ok(val) = config.get_string("kube_context") {
            self.kube_context = Some(val);
        }

        self
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# devspace user configuration (~/.devspace, YAML)
#
# Precedence (lowest to highest):
#   File:  --config <path>, else ~/.devspace
#   Env:   NAMESPACE / KUBE_CONTEXT, then DEVSPACE_* (explicit overrides)
#   Flags: --namespace / --kube-context

# Namespace used when --namespace is not given
# namespace: my-namespace

# Kube context used when --kube-context is not given
# kube_context: minikube
"#
        .to_string()
    }
}

/// Format from the file extension, YAML when there is none.
fn format_for(path: &Path) -> FileFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => FileFormat::Toml,
        Some("json") => FileFormat::Json,
        Some("ini") => FileFormat::Ini,
        Some("ron") => FileFormat::Ron,
        Some("json5") => FileFormat::Json5,
        _ => FileFormat::Yaml,
    }
}

/// `base` with `.ext` appended (`.devspace` -> `.devspace.yaml`).
fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::FixedHomeDir;
    use tempfile::TempDir;

    fn no_env() -> Option<HashMap<String, String>> {
        Some(HashMap::new())
    }

    #[test]
    fn given_no_explicit_path_when_resolving_then_uses_home_base_name() {
        let home = FixedHomeDir::at("/home/dev");

        let source = ConfigSource::resolve(None, &home).unwrap();

        assert_eq!(
            source,
            ConfigSource::HomeDefault(PathBuf::from("/home/dev/.devspace"))
        );
    }

    #[test]
    fn given_missing_home_when_resolving_then_fatal() {
        let result = ConfigSource::resolve(None, &FixedHomeDir::missing());
        assert!(matches!(result, Err(ApplicationError::HomeDirUnavailable)));
    }

    #[test]
    fn given_explicit_path_when_home_missing_then_home_not_needed() {
        let source =
            ConfigSource::resolve(Some(Path::new("/etc/ds.yaml")), &FixedHomeDir::missing())
                .unwrap();
        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("/etc/ds.yaml")));
    }

    #[test]
    fn given_extensionless_file_when_resolving_then_parsed_as_yaml() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join(".devspace"), "namespace: from-file\n").unwrap();

        let resolved =
            Settings::resolve(None, &FixedHomeDir::at(home.path()), no_env()).unwrap();

        assert_eq!(resolved.settings.namespace.as_deref(), Some("from-file"));
        assert_eq!(
            resolved.load,
            ConfigLoad::Loaded(home.path().join(".devspace"))
        );
    }

    #[test]
    fn given_toml_variant_when_resolving_then_found_by_extension() {
        let home = TempDir::new().unwrap();
        std::fs::write(
            home.path().join(".devspace.toml"),
            "kube_context = \"kind-dev\"\n",
        )
        .unwrap();

        let resolved =
            Settings::resolve(None, &FixedHomeDir::at(home.path()), no_env()).unwrap();

        assert_eq!(resolved.settings.kube_context.as_deref(), Some("kind-dev"));
    }

    #[test]
    fn given_env_override_when_file_sets_value_then_env_wins() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join(".devspace"), "namespace: from-file\n").unwrap();
        let env = HashMap::from([("DEVSPACE_NAMESPACE".to_string(), "from-env".to_string())]);

        let resolved =
            Settings::resolve(None, &FixedHomeDir::at(home.path()), Some(env)).unwrap();

        assert_eq!(resolved.settings.namespace.as_deref(), Some("from-env"));
    }

    #[test]
    fn given_bare_and_prefixed_env_when_both_set_then_prefixed_wins() {
        let env = HashMap::from([
            ("KUBE_CONTEXT".to_string(), "bare".to_string()),
            ("DEVSPACE_KUBE_CONTEXT".to_string(), "prefixed".to_string()),
        ]);

        let settings = Settings::default().apply_env_overrides(Some(env));

        assert_eq!(settings.kube_context.as_deref(), Some("prefixed"));
    }

    #[test]
    fn test_with_suffix_keeps_leading_dot() {
        let p = with_suffix(Path::new("/h/.devspace"), "yaml");
        assert_eq!(p, PathBuf::from("/h/.devspace.yaml"));
    }

    #[test]
    fn test_format_for_defaults_to_yaml() {
        assert_eq!(format_for(Path::new("/h/.devspace")), FileFormat::Yaml);
        assert_eq!(format_for(Path::new("cfg.toml")), FileFormat::Toml);
    }
}
