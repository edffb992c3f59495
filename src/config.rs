// Runtime settings. Everything comes from the environment (optionally
// seeded from a `.env` file by `main`); there are no command-line flags.

use secrecy::SecretString;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://api.monarchmoney.com";
pub const USERNAME_VAR: &str = "MONARCH_USERNAME";
pub const PASSWORD_VAR: &str = "MONARCH_PASSWORD";

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub token_cache: PathBuf,
    pub links_file: PathBuf,
}

impl Settings {
    /// Read settings from `MONARCH_BASE_URL`, `MONARCH_TOKEN_CACHE` and
    /// `MONARCH_LINKS_FILE`, falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("MONARCH_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let token_cache = std::env::var_os("MONARCH_TOKEN_CACHE")
            .map(PathBuf::from)
            .unwrap_or_else(default_token_cache);
        let links_file = std::env::var_os("MONARCH_LINKS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("links.json"));
        Settings {
            base_url,
            token_cache,
            links_file,
        }
    }
}

fn default_token_cache() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("monarch-review").join("token.json"))
        .unwrap_or_else(|| PathBuf::from(".token_cache"))
}

/// Login credentials, only needed when there is no cached token.
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn from_env() -> Result<Self, &'static str> {
        let username = std::env::var(USERNAME_VAR).map_err(|_| USERNAME_VAR)?;
        let password = std::env::var(PASSWORD_VAR).map_err(|_| PASSWORD_VAR)?;
        Ok(Credentials {
            username,
            password: SecretString::from(password),
        })
    }
}
