use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read API key file at {key_path}: {source}")]
    KeyFileReadError {
        key_path: PathBuf,
        source: std::io::Error,
    },

    #[error("No API key found: set {env_var} or api_key_file in the config")]
    MissingApiKey { env_var: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of an OpenAI compatible API, without a trailing slash.
    pub api_base: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_file: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key_file: None,
            timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the key file path
        config.api_key_file = config
            .api_key_file
            .map(|path| Self::expand_path(&path).unwrap_or(path));
        config.api_base = config.api_base.trim_end_matches('/').to_string();

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/glossa");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Resolves the API key: environment variable first, then the key file.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        if let Ok(key) = std::env::var(&self.api_key_env)
            && !key.trim().is_empty()
        {
            return Ok(key.trim().to_string());
        }

        if let Some(key_path) = &self.api_key_file {
            let key = std::fs::read_to_string(key_path).map_err(|source| {
                ConfigError::KeyFileReadError {
                    key_path: key_path.clone(),
                    source,
                }
            })?;
            let key = key.trim();
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }

        Err(ConfigError::MissingApiKey {
            env_var: self.api_key_env.clone(),
        })
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/glossa/config.toml"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = toml::from_str(r#"model = "gpt-4o""#).unwrap();

        assert_eq!(
            config,
            Config {
                model: "gpt-4o".to_string(),
                ..Config::default()
            }
        );
    }

    #[test]
    fn test_empty_file_is_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "").unwrap();

        let loaded = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "timeout_secs = \"soon\"").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/dir/config.toml");
        let test_config = Config {
            api_base: "http://localhost:8080/v1".to_string(),
            api_key_file: Some(PathBuf::from("/tmp/glossa-key")),
            timeout_secs: 5,
            ..Config::default()
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_trailing_slash_is_trimmed_from_api_base() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "api_base = \"http://localhost:11434/v1/\"\n").unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(
            config.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/keys/openai");
        let expanded = Config::expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("keys/openai"));
    }

    #[test]
    fn test_key_file_with_env_var_in_toml() {
        let temp_dir = TempDir::new().unwrap();
        unsafe {
            env::set_var("GLOSSA_TEST_KEY_DIR", temp_dir.path());
        }
        std::fs::write(temp_dir.path().join("key"), "sk-from-file\n").unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "api_key_env = \"GLOSSA_TEST_UNSET_KEY\"\napi_key_file = \"$GLOSSA_TEST_KEY_DIR/key\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.api_key_file, Some(temp_dir.path().join("key")));
        assert_eq!(config.api_key().unwrap(), "sk-from-file");

        unsafe {
            env::remove_var("GLOSSA_TEST_KEY_DIR");
        }
    }

    #[test]
    fn test_env_var_takes_precedence_over_key_file() {
        let temp_dir = TempDir::new().unwrap();
        let key_file = temp_dir.path().join("key");
        std::fs::write(&key_file, "sk-from-file").unwrap();
        unsafe {
            env::set_var("GLOSSA_TEST_ENV_KEY", " sk-from-env ");
        }

        let config = Config {
            api_key_env: "GLOSSA_TEST_ENV_KEY".to_string(),
            api_key_file: Some(key_file),
            ..Config::default()
        };

        assert_eq!(config.api_key().unwrap(), "sk-from-env");

        unsafe {
            env::remove_var("GLOSSA_TEST_ENV_KEY");
        }
    }

    #[test]
    fn test_missing_api_key() {
        let config = Config {
            api_key_env: "GLOSSA_TEST_NEVER_SET".to_string(),
            ..Config::default()
        };

        let err = config.api_key().unwrap_err();

        assert!(matches!(err, ConfigError::MissingApiKey { ref env_var } if env_var == "GLOSSA_TEST_NEVER_SET"));
    }

    #[test]
    fn test_unreadable_key_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            api_key_env: "GLOSSA_TEST_NEVER_SET".to_string(),
            api_key_file: Some(temp_dir.path().join("missing")),
            ..Config::default()
        };

        let err = config.api_key().unwrap_err();

        assert!(matches!(err, ConfigError::KeyFileReadError { .. }));
    }
}
