use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_PER_PAGE: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: String,
    pub account_id: Option<String>,
    pub per_page: u32,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_args_and_env(matches: &ArgMatches) -> Result<Self> {
        Self::resolve(matches, |key| env::var(key).ok())
    }

    /// Flags win over variables. `lookup` is the environment source.
    fn resolve(matches: &ArgMatches, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_base_url = matches
            .get_one::<String>("api-url")
            .cloned()
            .or_else(|| lookup("REVIEWS_API_URL"))
            .ok_or_else(|| anyhow!("API URL is required. Use --api-url or set REVIEWS_API_URL environment variable"))?
            .trim_end_matches('/')
            .to_string();

        let api_token = matches
            .get_one::<String>("token")
            .cloned()
            .or_else(|| lookup("REVIEWS_API_TOKEN"))
            .ok_or_else(|| anyhow!("API token is required. Use --token or set REVIEWS_API_TOKEN environment variable"))?;

        let account_id = matches
            .get_one::<String>("account-id")
            .cloned()
            .or_else(|| lookup("REVIEWS_ACCOUNT_ID"))
            .filter(|id| !id.is_empty());

        let per_page = match matches
            .get_one::<String>("per-page")
            .cloned()
            .or_else(|| lookup("REVIEWS_PER_PAGE"))
        {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("Page size must be a positive integer, got '{}'", raw))?,
            None => DEFAULT_PER_PAGE,
        };

        let log_dir = matches
            .get_one::<String>("log-dir")
            .cloned()
            .or_else(|| lookup("REVIEWS_LOG_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("logs"));

        Ok(Config {
            api_base_url,
            api_token,
            account_id,
            per_page,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::command;
    use std::collections::HashMap;

    fn resolve(args: &[&str], vars: &[(&str, &str)]) -> Result<Config> {
        let matches = command().try_get_matches_from(args).unwrap();
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::resolve(&matches, |key| vars.get(key).cloned())
    }

    #[test]
    fn flags_override_environment() {
        let config = resolve(
            &["gmb-reviews", "--api-url", "https://flag.example/", "--per-page", "25", "list"],
            &[
                ("REVIEWS_API_URL", "https://env.example"),
                ("REVIEWS_API_TOKEN", "tok"),
                ("REVIEWS_PER_PAGE", "5"),
            ],
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://flag.example");
        assert_eq!(config.api_token, "tok");
        assert_eq!(config.per_page, 25);
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert!(config.account_id.is_none());
    }

    #[test]
    fn missing_token_names_flag_and_variable() {
        let err = resolve(&["gmb-reviews"], &[("REVIEWS_API_URL", "https://x")]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("--token"));
        assert!(message.contains("REVIEWS_API_TOKEN"));
    }

    #[test]
    fn rejects_zero_page_size() {
        let err = resolve(
            &["gmb-reviews"],
            &[
                ("REVIEWS_API_URL", "https://x"),
                ("REVIEWS_API_TOKEN", "t"),
                ("REVIEWS_PER_PAGE", "0"),
            ],
        );
        assert!(err.is_err());
    }
}
