use crate::error::AssistError;
use crate::server::config::AssistConfigAuthentication;
use crate::server::utils::get_cookie;
use actix_web::HttpRequest;
use fernet::Fernet;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json;

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_EXISTS_COOKIE: &str = "session_exists";
pub const COOKIE_FOR_LOGOUT: &str = "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Option<i32>,
    pub timezone: Option<String>,
    #[serde(default)]
    pub is_contributor: bool,
    pub oidc_state: Option<String>,
}

impl Session {
    pub fn for_user(user_id: i32) -> Self {
        Session {
            user_id: Some(user_id),
            ..Default::default()
        }
    }
}

fn get_fernet_generator(auth_config: &AssistConfigAuthentication) -> Result<Fernet, AssistError> {
    match Fernet::new(&auth_config.fernet_key) {
        Some(generator) => Ok(generator),
        None => Err(AssistError::ConfigurationError {
            message: "Missing or invalid Fernet key".to_string(),
        }),
    }
}

pub fn encrypt_session(
    session: &Session,
    auth_config: &AssistConfigAuthentication,
) -> Result<String, AssistError> {
    let generator = get_fernet_generator(auth_config)?;
    Ok(generator.encrypt(&serde_json::to_vec(session)?))
}

pub fn decrypt_session(
    ciphertext: &str,
    auth_config: &AssistConfigAuthentication,
) -> Result<Session, AssistError> {
    let generator = get_fernet_generator(auth_config)?;
    Ok(serde_json::from_slice(&generator.decrypt_with_ttl(
        ciphertext,
        auth_config.session_cookie_age_seconds,
    )?)?)
}

/// A missing, expired or tampered cookie reads as an anonymous session.
pub fn session_from_request(
    req: &HttpRequest,
    auth_config: &AssistConfigAuthentication,
) -> Session {
    match get_cookie(req, SESSION_COOKIE) {
        Some(ciphertext) => decrypt_session(&ciphertext, auth_config).unwrap_or_else(|err| {
            debug!("Discarding session cookie: {err}");
            Session::default()
        }),
        None => Session::default(),
    }
}

fn max_age(auth_config: &AssistConfigAuthentication) -> String {
    if auth_config.session_expire_at_browser_close {
        String::new()
    } else {
        format!("; Max-Age={}", auth_config.session_cookie_age_seconds)
    }
}

pub fn cookie_for_session(
    session: &Session,
    auth_config: &AssistConfigAuthentication,
) -> Result<String, AssistError> {
    Ok(format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax{}",
        SESSION_COOKIE,
        encrypt_session(session, auth_config)?,
        max_age(auth_config)
    ))
}

/// Readable by scripts, so pages can tell a session exists.
pub fn session_exists_cookie(auth_config: &AssistConfigAuthentication) -> String {
    format!("{}=1; Path=/{}", SESSION_EXISTS_COOKIE, max_age(auth_config))
}
