// SPDX-License-Identifier: MIT

//! Studio configuration - YAML file plus environment overrides

use crate::adk::error::StudioError;
use crate::adk::model::{GenerationConfig, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub app_name: String,
    pub user_id: String,
    pub model_name: String,
    pub temperature: Option<f32>,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    /// Directory holding a built frontend (`index.html`, `assets/`)
    pub static_dir: PathBuf,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            app_name: "content_creation_studio".to_string(),
            user_id: "web_user_001".to_string(),
            model_name: DEFAULT_MODEL.to_string(),
            temperature: None,
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            static_dir: PathBuf::from("static"),
        }
    }
}

impl StudioConfig {
    /// Load from a YAML file; missing fields keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StudioError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            StudioError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse_yaml(&content)
    }

    pub fn parse_yaml(content: &str) -> Result<Self, StudioError> {
        let config: StudioConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Defaults or the given file, then the process environment on top
    pub fn resolve(path: Option<&Path>) -> Result<Self, StudioError> {
        let mut config = match path {
            Some(p) => {
                log::info!("Loading config from {}", p.display());
                Self::load(p)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|name| env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `MODEL_NAME`, `PORT`, `FRONTEND_URL` and `STATIC_DIR`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), StudioError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("MODEL_NAME").filter(|v| !v.is_empty()) {
            self.model_name = model;
        }
        if let Some(port) = lookup("PORT").filter(|v| !v.is_empty()) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| StudioError::config(format!("PORT is not a valid port: {}", port)))?;
        }
        if let Some(url) = lookup("FRONTEND_URL").filter(|v| !v.is_empty()) {
            let url = url.trim_end_matches('/').to_string();
            if !self.allowed_origins.contains(&url) {
                self.allowed_origins.push(url);
            }
        }
        if let Some(dir) = lookup("STATIC_DIR").filter(|v| !v.is_empty()) {
            self.static_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            ..Default::default()
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = StudioConfig::default();
        assert_eq!(config.app_name, "content_creation_studio");
        assert_eq!(config.user_id, "web_user_001");
        assert_eq!(config.model_name, "gemini-2.5-flash");
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
port: 9000
temperature: 0.4
allowed_origins:
  - "https://studio.example.com"
"#;
        let config = StudioConfig::parse_yaml(yaml).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.temperature, Some(0.4));
        assert_eq!(config.allowed_origins, vec!["https://studio.example.com"]);
        assert_eq!(config.app_name, "content_creation_studio");
        assert_eq!(config.generation_config().temperature, Some(0.4));
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(matches!(
            StudioConfig::parse_yaml("port: [not a number"),
            Err(StudioError::Yaml(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("MODEL_NAME", "gemini-2.5-pro"),
            ("PORT", "8080"),
            ("FRONTEND_URL", "https://app.example.com/"),
            ("STATIC_DIR", "web/dist"),
        ]);
        let mut config = StudioConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.model_name, "gemini-2.5-pro");
        assert_eq!(config.port, 8080);
        assert!(config
            .allowed_origins
            .contains(&"https://app.example.com".to_string()));
        assert_eq!(config.static_dir, PathBuf::from("web/dist"));

        // Applying twice does not duplicate the origin
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.allowed_origins.len(), 3);
    }

    #[test]
    fn test_bad_port_is_config_error() {
        let mut config = StudioConfig::default();
        let err = config
            .apply_overrides(|k| (k == "PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, StudioError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = StudioConfig::load("/nonexistent/studio.yaml").unwrap_err();
        assert!(matches!(err, StudioError::Config(_)));
    }
}
