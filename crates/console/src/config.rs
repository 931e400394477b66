use verger_client::{ClientConfig, ConfigError};
use verger_core::pagination::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};

/// Console settings: backend connection plus list presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub client: ClientConfig,
    /// Rows per page when `--page-size` is not given (default: `10`).
    pub page_size: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// Reads everything [`ClientConfig::from_env`] reads, plus:
    ///
    /// | Env Var            | Default |
    /// |--------------------|---------|
    /// | `VERGER_PAGE_SIZE` | `10`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let client = ClientConfig::from_lookup(&lookup)?;

        let page_size = match lookup("VERGER_PAGE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|size| PAGE_SIZE_OPTIONS.contains(size))
                .ok_or_else(|| ConfigError {
                    var: "VERGER_PAGE_SIZE",
                    expected: "one of 5, 10, 25, 50",
                    value: raw.clone(),
                })?,
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self { client, page_size })
    }

    /// Replace the backend URL, e.g. from `--api-url`.
    pub fn with_api_url(mut self, url: Option<&str>) -> Self {
        if let Some(url) = url {
            self.client.base_url = url.to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ConsoleConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn reads_page_size_and_client_settings() {
        let config = ConsoleConfig::from_lookup(lookup(&[
            ("VERGER_PAGE_SIZE", "25"),
            ("VERGER_API_URL", "http://verger.local/api"),
        ]))
        .unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.client.base_url, "http://verger.local/api");
    }

    #[test]
    fn rejects_page_size_outside_options() {
        let err = ConsoleConfig::from_lookup(lookup(&[("VERGER_PAGE_SIZE", "7")])).unwrap_err();
        assert_eq!(err.var, "VERGER_PAGE_SIZE");
        assert_eq!(err.value, "7");
    }

    #[test]
    fn api_url_flag_overrides_environment() {
        let config = ConsoleConfig::default().with_api_url(Some("http://other/api"));
        assert_eq!(config.client.base_url, "http://other/api");
        let config = config.with_api_url(None);
        assert_eq!(config.client.base_url, "http://other/api");
    }
}
