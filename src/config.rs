use std::env;

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/api";

/// Deployment configuration for the generation endpoint.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub api_key: Option<String>,
}

impl Config {
    /// Resolves from the environment, falling back to defaults.
    /// `dotenv().ok()` is expected to have run already.
    pub fn from_env() -> Self {
        Config {
            api_url: env::var("KOGNIA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_key: env::var("KOGNIA_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }

    pub fn generate_url(&self) -> String {
        format!("{}/generate", self.api_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url_strips_trailing_slash() {
        let config = Config {
            api_url: "http://localhost:9000/api/".to_string(),
            api_key: None,
        };
        assert_eq!(config.generate_url(), "http://localhost:9000/api/generate");
    }
}
