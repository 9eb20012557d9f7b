//! Format-agnostic configuration loading and saving

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Filesystem, NormalizedPath, Result};

/// Serialization formats recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from a path's extension.
    ///
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn from_path(path: &NormalizedPath) -> Result<Self> {
        let extension = path.extension().unwrap_or("");
        match extension.to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Format-agnostic configuration store over a [`Filesystem`].
///
/// The format is picked from the file extension and serialization is handled
/// transparently.
pub struct ConfigStore<'a> {
    fs: &'a dyn Filesystem,
}

impl<'a> ConfigStore<'a> {
    pub fn new(fs: &'a dyn Filesystem) -> Self {
        Self { fs }
    }

    /// Load and deserialize a configuration file.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let format = ConfigFormat::from_path(path)?;
        let bytes = self.fs.read(path)?;
        let content = String::from_utf8(bytes).map_err(|e| Error::ConfigParse {
            path: path.to_native(),
            format: format.name().into(),
            message: e.to_string(),
        })?;
        decode(path, format, &content)
    }

    /// Load a configuration file, returning `None` when it does not exist.
    pub fn load_optional<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<Option<T>> {
        if !self.fs.exists(path) {
            return Ok(None);
        }
        self.load(path).map(Some)
    }

    /// Serialize and save a configuration file.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let content = encode(path, value)?;
        self.fs.write(path, content.as_bytes())
    }
}

/// Serialize a value in the format implied by `path`.
pub fn encode<T: Serialize>(path: &NormalizedPath, value: &T) -> Result<String> {
    let format = ConfigFormat::from_path(path)?;
    let serialize_error = |message: String| Error::ConfigSerialize {
        path: path.to_native(),
        format: format.name().into(),
        message,
    };
    match format {
        ConfigFormat::Toml => toml::to_string_pretty(value).map_err(|e| serialize_error(e.to_string())),
        ConfigFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))
        }
        ConfigFormat::Yaml => serde_yaml::to_string(value).map_err(|e| serialize_error(e.to_string())),
    }
}

/// Deserialize `content` in the given format.
pub fn decode<T: DeserializeOwned>(
    path: &NormalizedPath,
    format: ConfigFormat,
    content: &str,
) -> Result<T> {
    let parse_error = |message: String| Error::ConfigParse {
        path: path.to_native(),
        format: format.name().into(),
        message,
    };
    match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}
