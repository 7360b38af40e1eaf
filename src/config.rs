//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Directory name under the config home.
const APP_DIR: &str = "url-reporter";

/// TOML-style file configuration for reporter defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Reporter email sent with every submission.
    pub email: Option<String>,
    /// Report reason code.
    pub reason: Option<String>,
    /// Report endpoint URL.
    pub endpoint: Option<String>,
    /// Maximum URLs per request (1..=1000).
    pub max_batch_size: Option<u16>,
    /// Batches in flight at once (1..=16).
    pub batch_concurrency: Option<u8>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Submission log database path.
    pub db_path: Option<PathBuf>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
    /// Extensions handled by OCR.
    pub image_extensions: Option<Vec<String>>,
    /// Extensions read as text.
    pub document_extensions: Option<Vec<String>>,
    /// Path to the tesseract binary.
    pub tesseract_path: Option<PathBuf>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(size) = self.max_batch_size
            && !(1..=1000).contains(&size)
        {
            bail!("Invalid config value for `max_batch_size`: {size}. Expected range: 1..=1000");
        }

        if let Some(concurrency) = self.batch_concurrency
            && !(1..=16).contains(&concurrency)
        {
            bail!(
                "Invalid config value for `batch_concurrency`: {concurrency}. Expected range: 1..=16"
            );
        }

        if let Some(email) = self.email.as_deref()
            && !email.contains('@')
        {
            bail!("Invalid config value for `email`: '{email}'. Expected an email address");
        }

        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        validate_extensions("image_extensions", self.image_extensions.as_deref())?;
        validate_extensions("document_extensions", self.document_extensions.as_deref())?;

        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

fn validate_extensions(field: &str, value: Option<&[String]>) -> Result<()> {
    if value.is_some_and(<[String]>::is_empty) {
        bail!("Invalid config value for `{field}`: expected at least one extension");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    /// Whether configuration was read from disk.
    #[must_use]
    pub fn loaded_from_file(&self) -> bool {
        self.config.is_some()
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/url-reporter/config.toml`
/// 2. `$HOME/.config/url-reporter/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join(APP_DIR).join("config.toml"));
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml"),
    )
}

/// Default submission log location: `$XDG_DATA_HOME/url-reporter/submissions.db`,
/// falling back to `$HOME/.local/share/...`, then the working directory.
#[must_use]
pub fn default_db_path() -> PathBuf {
    if let Some(data_home) = env_var_non_empty_os("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR).join("submissions.db");
    }
    env_var_non_empty_os("HOME").map_or_else(
        || PathBuf::from("submissions.db"),
        |home| {
            PathBuf::from(home)
                .join(".local")
                .join("share")
                .join(APP_DIR)
                .join("submissions.db")
        },
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_no = line_index + 1;
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "email" => cfg.email = Some(parse_string_literal(value).with_context(invalid)?),
            "reason" => cfg.reason = Some(parse_string_literal(value).with_context(invalid)?),
            "endpoint" => cfg.endpoint = Some(parse_string_literal(value).with_context(invalid)?),
            "max_batch_size" => {
                let parsed = parse_integer_u64(value).with_context(invalid)?;
                let n = u16::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("max_batch_size out of range for u16"))
                    .with_context(invalid)?;
                cfg.max_batch_size = Some(n);
            }
            "batch_concurrency" => {
                cfg.batch_concurrency = Some(parse_integer_u8(value).with_context(invalid)?);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "db_path" => {
                cfg.db_path = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            "tesseract_path" => {
                cfg.tesseract_path = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            "image_extensions" => {
                cfg.image_extensions = Some(parse_extension_list(value).with_context(invalid)?);
            }
            "document_extensions" => {
                cfg.document_extensions =
                    Some(parse_extension_list(value).with_context(invalid)?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

/// Parses `"jpg, png"` or `"jpg png"` into lowercase extensions without dots.
fn parse_extension_list(raw_value: &str) -> Result<Vec<String>> {
    let raw = parse_string_literal(raw_value)?;
    Ok(raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect())
}

fn parse_integer_u8(raw_value: &str) -> Result<u8> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<u16>()?;
    u8::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u8"))
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
email = "abuse@example.org"
max_batch_size = 250
verbosity = "verbose"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.email.as_deref(), Some("abuse@example.org"));
        assert_eq!(cfg.max_batch_size, Some(250));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
        assert!(cfg.endpoint.is_none());
    }

    #[test]
    fn test_parse_config_rejects_zero_batch_size() {
        let err = parse_config_str("max_batch_size = 0").expect_err("invalid size expected");
        assert!(err.to_string().contains("max_batch_size"));
    }

    #[test]
    fn test_parse_config_rejects_batch_size_above_service_limit() {
        let err = parse_config_str("max_batch_size = 1001").expect_err("invalid size expected");
        assert!(err.to_string().contains("max_batch_size"));
    }

    #[test]
    fn test_parse_config_rejects_batch_size_too_large_for_u16() {
        let err = parse_config_str("max_batch_size = 70000").expect_err("out of range expected");
        assert!(format!("{err:#}").contains("max_batch_size"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_concurrency() {
        let err = parse_config_str("batch_concurrency = 17").expect_err("invalid value expected");
        assert!(err.to_string().contains("batch_concurrency"));
    }

    #[test]
    fn test_parse_config_rejects_numeric_values_with_trailing_tokens() {
        let err = parse_config_str("batch_concurrency = 4 trailing")
            .expect_err("expected trailing token error");
        assert!(err.to_string().contains("batch_concurrency"));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
reason = "HMG" # government report
endpoint = "http://localhost:8080/report#frag" # kept inside quotes
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.reason.as_deref(), Some("HMG"));
        assert_eq!(
            cfg.endpoint.as_deref(),
            Some("http://localhost:8080/report#frag")
        );
    }

    #[test]
    fn test_parse_config_rejects_unquoted_string() {
        let err = parse_config_str("email = abuse@example.org").expect_err("quotes required");
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_parse_config_rejects_email_without_at() {
        let err = parse_config_str(r#"email = "nobody""#).expect_err("invalid email expected");
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_parse_config_timeout_fields() {
        let cfg = parse_config_str(
            r"
connect_timeout_secs = 5
read_timeout_secs = 90
",
        )
        .expect("timeout config should parse");
        assert_eq!(cfg.connect_timeout_secs, Some(5));
        assert_eq!(cfg.read_timeout_secs, Some(90));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout_value() {
        let err =
            parse_config_str("read_timeout_secs = 0").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("read_timeout_secs"));
    }

    #[test]
    fn test_parse_config_extension_lists() {
        let cfg = parse_config_str(
            r#"
image_extensions = "PNG, .jpg webp"
document_extensions = "txt"
"#,
        )
        .expect("extension lists should parse");
        assert_eq!(
            cfg.image_extensions,
            Some(vec!["png".to_string(), "jpg".to_string(), "webp".to_string()])
        );
        assert_eq!(cfg.document_extensions, Some(vec!["txt".to_string()]));
    }

    #[test]
    fn test_parse_config_rejects_empty_extension_list() {
        let err = parse_config_str(r#"image_extensions = " , ""#).expect_err("empty list");
        assert!(err.to_string().contains("image_extensions"));
    }

    #[test]
    fn test_parse_config_paths() {
        let cfg = parse_config_str(
            r#"
db_path = "/var/lib/url-reporter/submissions.db"
tesseract_path = "/usr/local/bin/tesseract"
"#,
        )
        .expect("paths should parse");
        assert_eq!(
            cfg.db_path,
            Some(PathBuf::from("/var/lib/url-reporter/submissions.db"))
        );
        assert_eq!(
            cfg.tesseract_path,
            Some(PathBuf::from("/usr/local/bin/tesseract"))
        );
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("unknown_key = 123").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("unknown_key"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("email").expect_err("syntax error expected");
        assert!(err.to_string().contains("expected key = value"));
    }

    #[test]
    fn test_verbosity_as_str() {
        assert_eq!(VerbositySetting::Default.as_str(), "default");
        assert_eq!(VerbositySetting::Verbose.as_str(), "verbose");
        assert_eq!(VerbositySetting::Quiet.as_str(), "quiet");
        assert_eq!(VerbositySetting::Debug.as_str(), "debug");
    }
}
