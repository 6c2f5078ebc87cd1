use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;
use serde::Deserialize;

pub const API_KEY_ENV_VAR: &str = "GOOGLE_MAPS_API_KEY";

/// API keys, read once at startup.
#[derive(Deserialize)]
pub struct Credentials {
    #[serde(rename = "gmaps")]
    pub google_maps_api_key: String,
}

impl Credentials {
    /// Reads a JSON file of the form `{"gmaps": "<key>"}`.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open credentials file {}", path.display()))?;
        let credentials: Credentials = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid credentials file {}", path.display()))?;

        if credentials.google_maps_api_key.trim().is_empty() {
            anyhow::bail!("Credentials file {} has an empty key", path.display());
        }

        Ok(credentials)
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let key = std::env::var(API_KEY_ENV_VAR)
            .with_context(|| format!("{} is not set", API_KEY_ENV_VAR))?;

        Ok(Self {
            google_maps_api_key: key,
        })
    }

    /// The file when given, the environment otherwise.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{ "gmaps": "abc123", "weather": "unused" }"#).unwrap();

        let credentials = Credentials::from_file(&path).unwrap();

        assert_eq!(credentials.google_maps_api_key, "abc123");
    }

    #[test]
    fn test_from_file_rejects_empty_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{ "gmaps": " " }"#).unwrap();

        assert!(Credentials::from_file(&path).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();

        assert!(Credentials::from_file(&dir.path().join("missing.json")).is_err());
    }
}
