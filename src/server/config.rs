use fernet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use toml;

use crate::error::AssistError;

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AssistConfigAuthentication {
    pub fernet_key: String,
    pub session_cookie_age_seconds: u64,
    pub session_expire_at_browser_close: bool,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AssistConfigUsers {
    pub username_blacklist: PathBuf,
    pub username_blacklist_ttl_seconds: u64,
}

impl AssistConfigUsers {
    pub fn blacklist_ttl(&self) -> Duration {
        Duration::from_secs(self.username_blacklist_ttl_seconds)
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AssistConfigAvatars {
    pub media_path: PathBuf,
    // Width and height of the stored thumbnail, in pixels.
    pub size: u32,
    pub max_file_size: u64,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AssistConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub authentication: AssistConfigAuthentication,
    pub users: AssistConfigUsers,
    pub avatars: AssistConfigAvatars,
    // Default OpenID Connect settings, keyed by setting name
    // (e.g., `OIDC_OP_AUTHORIZATION_ENDPOINT`).
    #[serde(default)]
    pub oidc: BTreeMap<String, String>,
    // Identity-provider overrides of `oidc`, consulted first by the
    // sign-in and sign-out handoff.
    #[serde(default)]
    pub fxa: BTreeMap<String, String>,
}

pub fn config_to_toml(assist_config: AssistConfig) -> Result<String, AssistError> {
    Ok(toml::to_string(&assist_config)?)
}

pub fn default_server_config() -> AssistConfig {
    let oidc = BTreeMap::from([
        (
            "OIDC_OP_AUTHORIZATION_ENDPOINT".to_string(),
            "https://sso.example.org/authorize".to_string(),
        ),
        ("OIDC_RP_CLIENT_ID".to_string(), "assist-admin".to_string()),
        ("OIDC_RP_SCOPES".to_string(), "openid email".to_string()),
    ]);
    let fxa = BTreeMap::from([
        (
            "OIDC_OP_AUTHORIZATION_ENDPOINT".to_string(),
            "https://accounts.example.org/authorization".to_string(),
        ),
        ("OIDC_RP_CLIENT_ID".to_string(), "assist".to_string()),
        ("OIDC_RP_SCOPES".to_string(), "openid profile".to_string()),
        (
            "OIDC_OP_LOGOUT_URL".to_string(),
            "https://accounts.example.org/logout".to_string(),
        ),
    ]);

    AssistConfig {
        host: "0.0.0.0".to_string(),
        port: 8000,
        database_url: "sqlite://assist_data/assist.sqlite".to_string(),
        authentication: AssistConfigAuthentication {
            fernet_key: fernet::Fernet::generate_key(),
            session_cookie_age_seconds: 60 * 60 * 24 * 30,
            session_expire_at_browser_close: false,
        },
        users: AssistConfigUsers {
            username_blacklist: PathBuf::from("./assist_data/username-blacklist.txt"),
            username_blacklist_ttl_seconds: 60 * 60,
        },
        avatars: AssistConfigAvatars {
            media_path: PathBuf::from("./assist_data/media"),
            size: 200,
            max_file_size: 131072,
        },
        oidc,
        fxa,
    }
}

pub fn read_config(config_path: &Path) -> Result<AssistConfig, AssistError> {
    let contents = fs::read_to_string(config_path).map_err(|err| AssistError::ConfigurationError {
        message: format!("{}: {err}", config_path.display()),
    })?;
    match toml::from_str(&contents) {
        Ok(config) => Ok(config),
        Err(err) => Err(AssistError::ConfigurationError {
            message: err.to_string(),
        }),
    }
}
