//! Local cache of Tesseract language models.
//!
//! Models live in a single directory as `<code>.traineddata`. Missing models
//! are downloaded once and reused on later runs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::backend::OcrError;
use super::languages::{is_valid_code, LanguageError, LanguageSet};
use crate::config::Settings;

/// Extension Tesseract expects on model files.
pub const MODEL_EXTENSION: &str = "traineddata";

/// Something that can download a model file.
pub trait ModelFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, OcrError>;
}

/// Default limit on establishing a connection to the model host.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads models over HTTP(S).
///
/// Models are tens of megabytes, so by default only connecting is time
/// limited; a slow download that keeps making progress runs to completion.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    connect_timeout: Duration,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, OcrError> {
        Self::with_timeouts(DEFAULT_CONNECT_TIMEOUT, None)
    }

    /// `timeout` bounds the whole request, body included; `None` disables it.
    pub fn with_timeouts(
        connect_timeout: Duration,
        timeout: Option<Duration>,
    ) -> Result<Self, OcrError> {
        Self::build(
            reqwest::blocking::Client::builder(),
            connect_timeout,
            timeout,
        )
    }

    /// Fetcher using the download timeouts from `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, OcrError> {
        Self::with_timeouts(
            Duration::from_secs(settings.download_connect_timeout_secs),
            settings.download_timeout_secs.map(Duration::from_secs),
        )
    }

    fn build(
        builder: reqwest::blocking::ClientBuilder,
        connect_timeout: Duration,
        timeout: Option<Duration>,
    ) -> Result<Self, OcrError> {
        let client = builder
            .user_agent(concat!("searchpdf/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| OcrError::Download {
                url: String::new(),
                message: format!("could not build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            connect_timeout,
            timeout,
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Total request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl ModelFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, OcrError> {
        let download_err = |e: reqwest::Error| OcrError::Download {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(download_err)?;
        let bytes = response.bytes().map_err(download_err)?;
        Ok(bytes.to_vec())
    }
}

/// The tessdata directory plus where to fetch missing models from.
pub struct TessdataStore {
    dir: PathBuf,
    base_url: String,
    fetcher: Box<dyn ModelFetcher>,
}

impl TessdataStore {
    pub fn new(
        dir: impl Into<PathBuf>,
        base_url: impl Into<String>,
        fetcher: Box<dyn ModelFetcher>,
    ) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into(),
            fetcher,
        }
    }

    /// Store at the configured tessdata directory, downloading over HTTP.
    pub fn from_settings(settings: &Settings) -> Result<Self, OcrError> {
        Ok(Self::new(
            &settings.tessdata_dir,
            &settings.tessdata_url,
            Box::new(HttpFetcher::from_settings(settings)?),
        ))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the model file for `code`.
    pub fn model_path(&self, code: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", code, MODEL_EXTENSION))
    }

    /// Download URL for `code`.
    pub fn model_url(&self, code: &str) -> String {
        format!(
            "{}/{}.{}",
            self.base_url.trim_end_matches('/'),
            code,
            MODEL_EXTENSION
        )
    }

    pub fn is_cached(&self, code: &str) -> bool {
        self.model_path(code).is_file()
    }

    /// Language codes with a model in the directory, sorted.
    pub fn cached_languages(&self) -> Result<Vec<String>, OcrError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut codes: Vec<String> = std::fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .map(|ext| ext == MODEL_EXTENSION)
                    .unwrap_or(false)
            })
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        codes.sort();
        Ok(codes)
    }

    /// Make sure every language in `languages` has a local model.
    ///
    /// Returns the codes that had to be downloaded.
    pub fn ensure(&self, languages: &LanguageSet) -> Result<Vec<String>, OcrError> {
        let mut fetched = Vec::new();
        for code in languages.codes() {
            if self.ensure_language(code)? {
                fetched.push(code.clone());
            }
        }
        Ok(fetched)
    }

    /// Download the model for `code` if it is not cached yet.
    ///
    /// Returns whether a download happened.
    pub fn ensure_language(&self, code: &str) -> Result<bool, OcrError> {
        if !is_valid_code(code) {
            return Err(LanguageError::InvalidCode(code.to_string()).into());
        }

        std::fs::create_dir_all(&self.dir)?;

        let dest = self.model_path(code);
        if dest.exists() {
            tracing::debug!("Language data for {} already at {}", code, dest.display());
            return Ok(false);
        }

        let url = self.model_url(code);
        tracing::info!("Downloading language data for {} from {}", code, url);
        let data = self.fetcher.fetch(&url)?;
        if data.is_empty() {
            return Err(OcrError::Download {
                url,
                message: "empty response body".to_string(),
            });
        }

        // Write beside the final path and rename, so an interrupted download
        // never leaves a truncated model that would be treated as cached.
        let partial = dest.with_extension(format!("{}.part", MODEL_EXTENSION));
        if let Err(e) = std::fs::write(&partial, &data) {
            let _ = std::fs::remove_file(&partial);
            return Err(e.into());
        }
        std::fs::rename(&partial, &dest)?;

        tracing::info!(
            "Saved {} ({} bytes) to {}",
            code,
            data.len(),
            dest.display()
        );
        Ok(true)
    }
}
