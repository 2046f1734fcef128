use crate::error::AssistError;
use crate::server::config::AssistConfig;
use url::Url;

pub const AUTHORIZATION_ENDPOINT: &str = "OIDC_OP_AUTHORIZATION_ENDPOINT";
pub const CLIENT_ID: &str = "OIDC_RP_CLIENT_ID";
pub const SCOPES: &str = "OIDC_RP_SCOPES";
pub const REDIRECT_URI: &str = "OIDC_RP_REDIRECT_URI";
pub const LOGOUT_URL: &str = "OIDC_OP_LOGOUT_URL";

const DEFAULT_SCOPES: &str = "openid email";
const CALLBACK_PATH: &str = "/oidc/callback/";

/// The identity provider's override of an OpenID Connect setting, if any.
pub fn fxa_setting<'a>(config: &'a AssistConfig, name: &str) -> Option<&'a str> {
    config.fxa.get(name).map(String::as_str)
}

pub fn oidc_setting<'a>(config: &'a AssistConfig, name: &str) -> Option<&'a str> {
    fxa_setting(config, name).or_else(|| config.oidc.get(name).map(String::as_str))
}

fn required_setting<'a>(config: &'a AssistConfig, name: &str) -> Result<&'a str, AssistError> {
    oidc_setting(config, name).ok_or_else(|| AssistError::ConfigurationError {
        message: format!("Missing OpenID Connect setting {name}"),
    })
}

/// Where the provider sends the user back to. `origin` is used when no
/// redirect URI is configured.
pub fn redirect_uri(config: &AssistConfig, origin: &str) -> String {
    match oidc_setting(config, REDIRECT_URI) {
        Some(redirect_uri) => redirect_uri.to_string(),
        None => format!("{}{}", origin.trim_end_matches('/'), CALLBACK_PATH),
    }
}

pub fn authorization_url(
    config: &AssistConfig,
    state: &str,
    redirect_uri: &str,
) -> Result<Url, AssistError> {
    let mut url = Url::parse(required_setting(config, AUTHORIZATION_ENDPOINT)?)?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", required_setting(config, CLIENT_ID)?)
        .append_pair(
            "scope",
            oidc_setting(config, SCOPES).unwrap_or(DEFAULT_SCOPES),
        )
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("state", state);
    Ok(url)
}

pub fn logout_url(config: &AssistConfig) -> String {
    oidc_setting(config, LOGOUT_URL).unwrap_or("/").to_string()
}
