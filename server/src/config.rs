//! config.rs
//! Service settings read from `SHEETXML_*` environment variables.

use std::fmt;
use std::path::PathBuf;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use sheetxml_core::config::ConverterConfig;
use sheetxml_core::source::SchemaProfile;
use sheetxml_core::constants::{DEFAULT_KDF_ITERATIONS, DEFAULT_KDF_SALT, DEFAULT_MAX_UPLOAD_SIZE_MB};

pub const ENV_PREFIX: &str = "SHEETXML";

#[derive(Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    /// Used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_max_upload")]
    pub max_upload_size_mb: u64,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Comma separated, e.g. `.xlsx,.xls`. Unset keeps the converter default.
    #[serde(default)]
    pub allowed_extensions: Option<String>,

    /// Required. Startup fails without it.
    #[serde(default)]
    pub encryption_secret: String,
    #[serde(default = "default_kdf_salt")]
    pub kdf_salt: String,
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
    #[serde(default = "default_true")]
    pub encrypt_by_default: bool,
    #[serde(default)]
    pub retain_after_download: bool,
    #[serde(default)]
    pub strict: bool,
    /// Inline JSON schema profile. Mutually exclusive with `schema_profile_path`.
    #[serde(default)]
    pub schema_profile: Option<String>,
    #[serde(default)]
    pub schema_profile_path: Option<PathBuf>,

    /// HS256 secret for bearer tokens. Unset or blank disables session checks.
    #[serde(default)]
    pub session_secret: Option<String>,
    #[serde(default = "default_session_timeout")]
    pub session_timeout_minutes: u64,

    /// Comma separated; `*` allows any origin.
    #[serde(default = "default_origins")]
    pub allowed_origins: String,

    /// Return internal error text to callers.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub audit_log_path: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_upload() -> u64 {
    DEFAULT_MAX_UPLOAD_SIZE_MB
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_kdf_salt() -> String {
    DEFAULT_KDF_SALT.to_string()
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_KDF_ITERATIONS
}

fn default_true() -> bool {
    true
}

fn default_session_timeout() -> u64 {
    5
}

fn default_origins() -> String {
    "http://localhost:3000".to_string()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    /// Same as `from_env` but reads from the given variables instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self::load(Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn load(env: Environment) -> Result<Self, ConfigError> {
        let cfg: Self = Config::builder().add_source(env).build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encryption_secret.trim().is_empty() {
            return Err(ConfigError::Message(format!("{}_ENCRYPTION_SECRET must be set", ENV_PREFIX)));
        }
        if self.max_upload_size_mb == 0 {
            return Err(ConfigError::Message("max_upload_size_mb must be positive".into()));
        }
        if self.kdf_iterations == 0 {
            return Err(ConfigError::Message("kdf_iterations must be positive".into()));
        }
        if let Some(exts) = self.extensions() {
            if exts.is_empty() {
                return Err(ConfigError::Message("allowed_extensions must name at least one extension".into()));
            }
        }
        self.profile()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }

    pub fn session_secret(&self) -> Option<&str> {
        self.session_secret.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Normalized to lower case with a leading dot.
    pub fn extensions(&self) -> Option<Vec<String>> {
        let list = self.allowed_extensions.as_deref()?;
        Some(
            list.split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(|e| format!(".{}", e.trim_start_matches('.').to_ascii_lowercase()))
                .collect(),
        )
    }

    /// Schema profile from inline JSON or a JSON file, if either is set.
    pub fn profile(&self) -> Result<Option<SchemaProfile>, ConfigError> {
        let inline = self.schema_profile.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let json = match (inline, &self.schema_profile_path) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Message(
                    "schema_profile and schema_profile_path are mutually exclusive".into(),
                ))
            }
            (Some(text), None) => text.to_string(),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
                ConfigError::Message(format!("cannot read schema profile {}: {}", path.display(), e))
            })?,
            (None, None) => return Ok(None),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| ConfigError::Message(format!("invalid schema profile: {}", e)))
    }

    pub fn converter_config(&self) -> Result<ConverterConfig, ConfigError> {
        let mut cfg = ConverterConfig::new(&self.output_dir, &self.upload_dir, self.encryption_secret.clone())
            .with_max_upload_size(self.max_upload_size_bytes())
            .with_kdf_iterations(self.kdf_iterations)
            .with_strict(self.strict);
        cfg.kdf_salt = self.kdf_salt.clone();
        cfg.encrypt_by_default = self.encrypt_by_default;
        cfg.retain_after_download = self.retain_after_download;
        cfg.expose_error_details = self.debug;
        if let Some(exts) = self.extensions() {
            cfg.allowed_extensions = exts;
        }
        if let Some(profile) = self.profile()? {
            cfg = cfg.with_schema_profile(profile);
        }
        Ok(cfg)
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("bind", &self.bind_addr())
            .field("log_level", &self.log_level)
            .field("max_upload_size_mb", &self.max_upload_size_mb)
            .field("output_dir", &self.output_dir)
            .field("upload_dir", &self.upload_dir)
            .field("allowed_extensions", &self.extensions())
            .field("schema_profile", &(self.schema_profile.is_some() || self.schema_profile_path.is_some()))
            .field("encryption_secret", &"<redacted>")
            .field("sessions", &self.session_secret().is_some())
            .field("session_timeout_minutes", &self.session_timeout_minutes)
            .field("allowed_origins", &self.origins())
            .field("debug", &self.debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_with_only_the_secret() {
        let cfg = ServiceConfig::from_vars([("SHEETXML_ENCRYPTION_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8000");
        assert_eq!(cfg.max_upload_size_bytes(), 10 * 1024 * 1024);
        assert_eq!(cfg.session_timeout_minutes, 5);
        assert!(cfg.session_secret().is_none());
        assert_eq!(cfg.origins(), vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_missing_secret_is_a_startup_error() {
        let err = ServiceConfig::from_vars([("SHEETXML_PORT", "9000")]).unwrap_err();
        assert!(err.to_string().contains("ENCRYPTION_SECRET"));
    }

    #[test]
    fn test_overrides_flow_into_converter_config() {
        let cfg = ServiceConfig::from_vars([
            ("SHEETXML_ENCRYPTION_SECRET", "s3cret"),
            ("SHEETXML_PORT", "9000"),
            ("SHEETXML_MAX_UPLOAD_SIZE_MB", "2"),
            ("SHEETXML_DEBUG", "true"),
            ("SHEETXML_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("SHEETXML_SESSION_SECRET", "  "),
        ])
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.origins().len(), 2);
        assert!(cfg.session_secret().is_none());

        let core = cfg.converter_config().unwrap();
        assert_eq!(core.max_upload_size_bytes, 2 * 1024 * 1024);
        assert!(core.expose_error_details);
        assert!(core.schema_profile.is_none());
        assert_eq!(core.allowed_extensions, vec![".xls", ".xlsx"]);
        assert!(core.validate().is_ok());
        assert!(!format!("{:?}", cfg).contains("s3cret"));
    }

    #[test]
    fn test_schema_profile_and_extensions_from_env() {
        let cfg = ServiceConfig::from_vars([
            ("SHEETXML_ENCRYPTION_SECRET", "s3cret"),
            ("SHEETXML_ALLOWED_EXTENSIONS", "XLSX, .xlsm"),
            (
                "SHEETXML_SCHEMA_PROFILE",
                r#"{"columns":[{"name":"Age","type":"integer","nullable":false},{"name":"Name","type":"text"}]}"#,
            ),
        ])
        .unwrap();

        let core = cfg.converter_config().unwrap();
        assert_eq!(core.allowed_extensions, vec![".xlsx", ".xlsm"]);
        let profile = core.schema_profile.unwrap();
        assert_eq!(profile.columns.len(), 2);
        assert_eq!(profile.columns[0].name, "Age");
        assert!(!profile.columns[0].nullable);
    }

    #[test]
    fn test_schema_profile_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, r#"{"columns":[{"name":"Email","type":"text","nullable":false}]}"#).unwrap();

        let cfg = ServiceConfig::from_vars([
            ("SHEETXML_ENCRYPTION_SECRET".to_string(), "s3cret".to_string()),
            ("SHEETXML_SCHEMA_PROFILE_PATH".to_string(), path.display().to_string()),
        ])
        .unwrap();
        let profile = cfg.converter_config().unwrap().schema_profile.unwrap();
        assert_eq!(profile.columns[0].name, "Email");
    }

    #[test]
    fn test_bad_profile_or_extensions_fail_at_startup() {
        let err = ServiceConfig::from_vars([
            ("SHEETXML_ENCRYPTION_SECRET", "s3cret"),
            ("SHEETXML_SCHEMA_PROFILE", "{\"columns\": [oops]}"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("invalid schema profile"));

        let err = ServiceConfig::from_vars([("SHEETXML_ENCRYPTION_SECRET", "s3cret"), ("SHEETXML_ALLOWED_EXTENSIONS", " , ")])
            .unwrap_err();
        assert!(err.to_string().contains("allowed_extensions"));
    }
}
