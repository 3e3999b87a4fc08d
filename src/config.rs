use anyhow::Context;

pub const API_URL_VAR: &str = "WARREN_API_URL";
pub const API_TOKEN_VAR: &str = "WARREN_API_TOKEN";
pub const COURSE_ID_VAR: &str = "WARREN_COURSE_ID";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub course_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Config {
            api_url: read(API_URL_VAR),
            api_token: read(API_TOKEN_VAR),
            course_id: read(COURSE_ID_VAR),
        }
    }

    /// Only needed when payloads are not read from files.
    pub fn api_url(&self) -> anyhow::Result<&str> {
        self.api_url
            .as_deref()
            .context("WARREN_API_URL must be set to the analytics service base URL")
    }
}
