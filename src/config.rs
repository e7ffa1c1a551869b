use std::{fs, path::Path};

use serde::Deserialize;

/// Default number of visits to one node permitted within a single run.
pub const DEFAULT_LOOP_ITERATION_LIMIT: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// maximum visits to one node within a single run, defaults to 100
    pub loop_iteration_limit: u32,
    /// outbound http request timeout in milliseconds, defaults to 10000
    pub http_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loop_iteration_limit: DEFAULT_LOOP_ITERATION_LIMIT,
            http_timeout_ms: 10_000,
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Self {
        let data = fs::read_to_string(path.as_ref()).expect(&format!("failed to load config file {:?}", path.as_ref()));

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Self {
        let config = toml::from_str::<Config>(toml_str).expect("failed to parse the toml str");
        config
    }
}

#[cfg(test)]
mod test {
    use crate::Config;

    #[test]
    fn test_config_deserialize() {
        let toml_str = r#"
        loop_iteration_limit = 25
        http_timeout_ms = 3000
        "#;
        let config = Config::load_from_str(toml_str);
        assert_eq!(config.loop_iteration_limit, 25);
        assert_eq!(config.http_timeout_ms, 3000);
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.loop_iteration_limit, 100);
        assert_eq!(config.http_timeout_ms, 10_000);
    }
}
