//! Configuration management for searchpdf.
//!
//! Settings are layered: built-in defaults, then environment variables, then
//! an optional config file, then CLI flags (applied by the caller).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ocr::LanguageSet;

/// Default rasterization resolution.
pub const DEFAULT_DPI: u32 = 300;

/// Default OCR language set.
pub const DEFAULT_LANGUAGES: &str = "eng";

/// Where Tesseract's best-quality models are published.
pub const DEFAULT_TESSDATA_URL: &str = "https://github.com/tesseract-ocr/tessdata_best/raw/main";

/// Default limit on connecting to the model host, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Accepted rasterization resolutions.
pub const DPI_RANGE: std::ops::RangeInclusive<u32> = 36..=1200;

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Locations of the external tools the pipeline shells out to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub pdftoppm: PathBuf,
    pub pdftotext: PathBuf,
    pub tesseract: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            pdftoppm: PathBuf::from("pdftoppm"),
            pdftotext: PathBuf::from("pdftotext"),
            tesseract: PathBuf::from("tesseract"),
        }
    }
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rasterization resolution in dots per inch.
    pub dpi: u32,
    /// `+`-joined Tesseract language codes, e.g. `eng+spa+fra`.
    pub languages: String,
    /// JPEG quality used for rendered page images (1-100).
    pub jpeg_quality: u8,
    /// Directory holding `<lang>.traineddata` files.
    pub tessdata_dir: PathBuf,
    /// Base URL language models are downloaded from.
    pub tessdata_url: String,
    /// Seconds allowed to connect to the model host.
    pub download_connect_timeout_secs: u64,
    /// Seconds allowed for a whole model download. Unset means no limit.
    pub download_timeout_secs: Option<u64>,
    /// Font size of the invisible text layer, in page units.
    pub text_font_size: f32,
    /// External tool binaries.
    pub tools: ToolPaths,
    /// Config file these settings were loaded from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_env_lookup(|key| std::env::var(key).ok())
    }
}

impl Settings {
    /// Build defaults with overrides taken from `lookup` (normally the process
    /// environment).
    pub fn from_env_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let tessdata_dir = match var("TESSDATA_PREFIX") {
            Some(prefix) => PathBuf::from(prefix).join("tessdata"),
            None => default_tessdata_dir(),
        };

        let dpi = match var("SEARCHPDF_DPI") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid SEARCHPDF_DPI value: {}", raw);
                DEFAULT_DPI
            }),
            None => DEFAULT_DPI,
        };

        Self {
            dpi,
            languages: var("SEARCHPDF_LANG").unwrap_or_else(|| DEFAULT_LANGUAGES.to_string()),
            jpeg_quality: 90,
            tessdata_dir,
            tessdata_url: var("SEARCHPDF_TESSDATA_URL")
                .unwrap_or_else(|| DEFAULT_TESSDATA_URL.to_string()),
            download_connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            download_timeout_secs: None,
            text_font_size: 10.0,
            tools: ToolPaths::default(),
            source_path: None,
        }
    }

    /// Load settings from a config file, falling back to defaults for any
    /// field the file leaves out.
    /// Supports JSON, TOML and YAML based on file extension.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_err = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let mut settings: Settings = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| parse_err(e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_err(e.to_string()))?
            }
            _ => serde_json::from_str(&contents).map_err(|e| parse_err(e.to_string()))?,
        };

        settings.source_path = Some(path.to_path_buf());
        settings.expand_paths();
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => {
                let settings = Self::default();
                settings.validate()?;
                Ok(settings)
            }
        }
    }

    /// Check value ranges and that the language set parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !DPI_RANGE.contains(&self.dpi) {
            return Err(ConfigError::Invalid(format!(
                "dpi must be between {} and {}, got {}",
                DPI_RANGE.start(),
                DPI_RANGE.end(),
                self.dpi
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        if self.text_font_size.is_nan() || self.text_font_size <= 0.0 {
            return Err(ConfigError::Invalid(
                "text_font_size must be positive".to_string(),
            ));
        }
        if self.download_connect_timeout_secs == 0 || self.download_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "download timeouts must be at least one second".to_string(),
            ));
        }
        self.language_set()?;
        Ok(())
    }

    /// Parsed form of `languages`.
    pub fn language_set(&self) -> Result<LanguageSet, ConfigError> {
        self.languages
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("{}", e)))
    }

    fn expand_paths(&mut self) {
        self.tessdata_dir = expand(&self.tessdata_dir);
        self.tools.pdftoppm = expand(&self.tools.pdftoppm);
        self.tools.pdftotext = expand(&self.tools.pdftotext);
        self.tools.tesseract = expand(&self.tools.tesseract);
    }
}

/// Fallback tessdata directory when `TESSDATA_PREFIX` is not set.
fn default_tessdata_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("searchpdf")
        .join("tessdata")
}

fn expand(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    }
}
