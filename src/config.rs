//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/bodmas-viz/bodmas-viz.toml`
//! 3. Local config: `./.bodmas-viz.toml`
//! 4. Environment variables: `BODMAS_*` prefix (`__` for nested keys)
//! 5. Command line flags (applied by the CLI)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{Endpoint, Extent, DEFAULT_BACKEND_URL};

const APP_NAME: &str = "bodmas-viz";
const LOCAL_CONFIG_FILE: &str = ".bodmas-viz.toml";

/// Diagram canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 400.0,
            margin_top: 40.0,
            margin_right: 90.0,
            margin_bottom: 50.0,
            margin_left: 90.0,
        }
    }
}

impl CanvasConfig {
    /// Drawable area inside the margins, never negative.
    pub fn extent(&self) -> Extent {
        Extent {
            width: (self.width - self.margin_left - self.margin_right).max(0.0),
            height: (self.height - self.margin_top - self.margin_bottom).max(0.0),
        }
    }
}

/// Unified configuration for bodmas-viz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Evaluation backend base address
    pub backend_url: String,
    /// Origin serving `config.json`; the config resolver is skipped when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontend_origin: Option<String>,
    /// Bound on the `config.json` fetch; expiry keeps the configured backend
    pub config_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub submit_timeout_secs: u64,
    /// Where rendered diagrams and reports go when no explicit path is given
    pub output_dir: PathBuf,
    pub canvas: CanvasConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            frontend_origin: None,
            config_timeout_secs: 5,
            probe_timeout_secs: 5,
            submit_timeout_secs: 30,
            output_dir: PathBuf::from("."),
            canvas: CanvasConfig::default(),
        }
    }
}

/// Get the XDG config directory for bodmas-viz.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{APP_NAME}.toml")))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}

impl Settings {
    /// Load settings with layered precedence, local config taken from the
    /// current directory.
    pub fn load() -> Result<Self, ApplicationError> {
        let local = std::env::current_dir()
            .ok()
            .map(|dir| local_config_path(&dir));
        Self::load_from(global_config_path().as_deref(), local.as_deref())
    }

    /// Load settings from explicit file locations. Missing files are skipped.
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&Settings::default()).map_err(config_err)?);

        for path in [global, local].into_iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("BODMAS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.expand_paths();
        Ok(settings)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    fn expand_paths(&mut self) {
        let raw = self.output_dir.to_string_lossy().to_string();
        if let Ok(expanded) = shellexpand::full(&raw) {
            self.output_dir = PathBuf::from(expanded.as_ref());
        }
    }

    /// Validated backend address.
    pub fn backend_endpoint(&self) -> Result<Endpoint, ApplicationError> {
        Ok(Endpoint::parse(&self.backend_url)?)
    }

    /// Validated page origin, if configured.
    pub fn origin(&self) -> Result<Option<Endpoint>, ApplicationError> {
        self.frontend_origin
            .as_deref()
            .filter(|o| !o.trim().is_empty())
            .map(Endpoint::parse)
            .transpose()
            .map_err(ApplicationError::from)
    }

    pub fn config_timeout(&self) -> Duration {
        Duration::from_secs(self.config_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# bodmas-viz configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/bodmas-viz/bodmas-viz.toml
#   Local:  ./.bodmas-viz.toml
#   Env:    BODMAS_* environment variables (BODMAS_CANVAS__WIDTH=1200)
#   Flags:  --backend, --origin

# Evaluation backend base address
# backend_url = "http://127.0.0.1:8000"

# Origin serving config.json with a BACKEND_URL override
# frontend_origin = "http://127.0.0.1:8080"

# config.json fetch timeout in seconds
# config_timeout_secs = 5

# Health check timeout in seconds
# probe_timeout_secs = 5

# Expression submission timeout in seconds
# submit_timeout_secs = 30

# Default directory for rendered diagrams and reports
# output_dir = "~/bodmas"

[canvas]
# width = 1000
# height = 400
# margin_top = 40
# margin_right = 90
# margin_bottom = 50
# margin_left = 90
"#
        .to_string()
    }
}

/// Frontend configuration document served as `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FrontendConfig {
    #[serde(rename = "BACKEND_URL", default)]
    pub backend_url: Option<String>,
    #[serde(rename = "VERSION", default)]
    pub version: Option<String>,
    #[serde(rename = "DEBUG", default)]
    pub debug: Option<bool>,
}

impl FrontendConfig {
    /// Document pointing a frontend at `backend`.
    pub fn for_backend(backend: &Endpoint, debug: bool) -> Self {
        Self {
            backend_url: Some(backend.to_string()),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            debug: Some(debug),
        }
    }

    /// Non-empty `BACKEND_URL`, if present.
    pub fn backend(&self) -> Option<&str> {
        self.backend_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn to_json(&self) -> Result<String, ApplicationError> {
        serde_json::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize frontend config: {e}"),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn given_no_config_files_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None, None).expect("load defaults");

        assert_eq!(settings.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(settings.probe_timeout(), Duration::from_secs(5));
        assert_eq!(settings.submit_timeout(), Duration::from_secs(30));
        assert_eq!(settings.canvas, CanvasConfig::default());
    }

    #[test]
    fn given_default_canvas_when_computing_extent_then_margins_removed() {
        let extent = CanvasConfig::default().extent();

        assert_eq!(extent.width, 820.0);
        assert_eq!(extent.height, 310.0);
    }

    #[test]
    fn given_margins_larger_than_canvas_when_computing_extent_then_zero() {
        let canvas = CanvasConfig {
            width: 100.0,
            height: 50.0,
            ..CanvasConfig::default()
        };

        let extent = canvas.extent();

        assert_eq!(extent.width, 0.0);
        assert_eq!(extent.height, 0.0);
    }

    #[test]
    fn given_local_overrides_global_when_loading_then_local_wins() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join("local.toml");
        fs::write(
            &global,
            "backend_url = \"http://global:1\"\nprobe_timeout_secs = 9\n",
        )
        .unwrap();
        fs::write(&local, "backend_url = \"http://local:2\"\n[canvas]\nwidth = 1200\n").unwrap();

        let settings = Settings::load_from(Some(&global), Some(&local)).unwrap();

        assert_eq!(settings.backend_url, "http://local:2");
        assert_eq!(settings.probe_timeout_secs, 9);
        assert_eq!(settings.canvas.width, 1200.0);
        assert_eq!(settings.canvas.height, 400.0);
    }

    #[test]
    fn given_invalid_toml_when_loading_then_config_error() {
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("broken.toml");
        fs::write(&local, "backend_url = [").unwrap();

        let result = Settings::load_from(None, Some(&local));

        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_tilde_in_output_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            output_dir: PathBuf::from("~/diagrams"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.output_dir.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn given_blank_origin_when_resolving_then_none() {
        let settings = Settings {
            frontend_origin: Some("  ".into()),
            ..Settings::default()
        };

        assert_eq!(settings.origin().unwrap(), None);
    }

    #[test]
    fn given_settings_when_to_toml_then_round_trips_through_template_keys() {
        let toml = Settings::default().to_toml().unwrap();

        assert!(toml.contains("backend_url = \"http://127.0.0.1:8000\""));
        assert!(toml.contains("[canvas]"));
        assert!(!toml.contains("frontend_origin"));
        assert!(Settings::template().contains("submit_timeout_secs"));
    }

    #[test]
    fn given_frontend_config_without_backend_when_reading_then_none() {
        let doc: FrontendConfig = serde_json::from_str(r#"{"BACKEND_URL": "", "DEBUG": true}"#).unwrap();

        assert_eq!(doc.backend(), None);
        assert_eq!(doc.debug, Some(true));
    }

    #[test]
    fn given_backend_when_generating_frontend_config_then_uses_upper_case_keys() {
        let backend = Endpoint::parse("https://bodmasparser.onrender.com/").unwrap();

        let json = FrontendConfig::for_backend(&backend, false).to_json().unwrap();

        assert!(json.contains(r#""BACKEND_URL": "https://bodmasparser.onrender.com""#));
        assert!(json.contains(r#""DEBUG": false"#));
        assert!(json.contains("VERSION"));
    }
}
