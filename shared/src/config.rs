use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://ucvapi.azure-api.net/defensoriauniversitaria/api/";
pub const DEFAULT_MAX_FILES: usize = 3;
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("base url must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("invalid endpoint path '{path}': {reason}")]
    InvalidEndpoint { path: String, reason: String },

    #[error("attachment limits must be positive (max_files={max_files}, max_file_bytes={max_file_bytes})")]
    InvalidAttachmentLimits { max_files: usize, max_file_bytes: u64 },

    #[error("attachment extension allow-list is empty")]
    EmptyExtensionList,
}

/// Relative paths under the API base url.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Endpoints {
    pub branches: String,
    pub case_number: String,
    pub departments: String,
    pub modalities: String,
    pub academic_units: String,
    pub register_case: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            branches: "DUSevicioWeb/CampusDU".into(),
            case_number: "DUSevicioWeb/NumeroExpedienteDU".into(),
            departments: "DUSevicioWeb/DepartamentosDU".into(),
            modalities: "DUSevicioWeb/ModalidadesDU".into(),
            academic_units: "DUSevicioWeb/UnidadesAcademicasDU".into(),
            register_case: "DUSevicioWeb/RegistrarExpedienteDU".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct AttachmentLimits {
    pub max_files: usize,
    pub max_file_bytes: u64,
    /// Lower-case, without the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for AttachmentLimits {
    fn default() -> Self {
        let allowed_extensions = DOCUMENT_EXTENSIONS
            .iter()
            .chain(IMAGE_EXTENSIONS)
            .chain(AUDIO_EXTENSIONS)
            .chain(VIDEO_EXTENSIONS)
            .map(|ext| (*ext).to_string())
            .collect();

        Self {
            max_files: DEFAULT_MAX_FILES,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            allowed_extensions,
        }
    }
}

impl AttachmentLimits {
    #[must_use]
    pub fn allows_extension(&self, extension: &str) -> bool {
        let extension = extension.to_lowercase();
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
    }
}

/// Runtime configuration handed over by the shell with `Event::Configure`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub api_base_url: String,
    pub endpoints: Endpoints,
    pub attachments: AttachmentLimits,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            endpoints: Endpoints::default(),
            attachments: AttachmentLimits::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base_url()?;

        for path in [
            &self.endpoints.branches,
            &self.endpoints.case_number,
            &self.endpoints.departments,
            &self.endpoints.modalities,
            &self.endpoints.academic_units,
            &self.endpoints.register_case,
        ] {
            if path.trim().is_empty() {
                return Err(ConfigError::InvalidEndpoint {
                    path: path.clone(),
                    reason: "path cannot be empty".into(),
                });
            }
            base.join(path).map_err(|e| ConfigError::InvalidEndpoint {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        }

        if self.attachments.max_files == 0 || self.attachments.max_file_bytes == 0 {
            return Err(ConfigError::InvalidAttachmentLimits {
                max_files: self.attachments.max_files,
                max_file_bytes: self.attachments.max_file_bytes,
            });
        }

        if self.attachments.allowed_extensions.is_empty() {
            return Err(ConfigError::EmptyExtensionList);
        }

        Ok(())
    }

    fn base_url(&self) -> Result<Url, ConfigError> {
        // A base without a trailing slash would make `join` drop its last segment.
        let raw = if self.api_base_url.ends_with('/') {
            self.api_base_url.clone()
        } else {
            format!("{}/", self.api_base_url)
        };

        let base = Url::parse(&raw).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            reason: e.to_string(),
        })?;

        match base.scheme() {
            "http" | "https" => Ok(base),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn endpoint_url(&self, path: &str) -> Result<String, ConfigError> {
        let base = self.base_url()?;
        base.join(path)
            .map(|url| url.to_string())
            .map_err(|e| ConfigError::InvalidEndpoint {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }
}
