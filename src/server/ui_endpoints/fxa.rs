use crate::error::AssistError;
use crate::server::config::AssistConfig;
use crate::server::oidc::{authorization_url, logout_url, redirect_uri};
use crate::server::sessions::{cookie_for_session, session_from_request, COOKIE_FOR_LOGOUT};
use crate::server::utils::query_param;
use actix_web::{get, http::header, route, web, HttpRequest, HttpResponse};
use log::debug;
use uuid::Uuid;

/// Starts sign-in at the identity provider. Whether the visitor asked to
/// become a contributor is kept in the session for after the callback.
#[get("/fxa/authenticate")]
pub async fn fxa_authenticate(
    req: HttpRequest,
    assist_config: web::Data<AssistConfig>,
) -> Result<HttpResponse, AssistError> {
    let mut session = session_from_request(&req, &assist_config.authentication);
    session.is_contributor = query_param(&req, "is_contributor").as_deref() == Some("True");
    let state = Uuid::new_v4().simple().to_string();
    session.oidc_state = Some(state.clone());

    let origin = {
        let connection_info = req.connection_info();
        format!("{}://{}", connection_info.scheme(), connection_info.host())
    };
    let url = authorization_url(
        &assist_config,
        &state,
        &redirect_uri(&assist_config, &origin),
    )?;
    debug!("Redirecting to identity provider at {}", url.origin().ascii_serialization());

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, url.to_string()))
        .insert_header((
            header::SET_COOKIE,
            cookie_for_session(&session, &assist_config.authentication)?,
        ))
        .finish())
}

#[route("/fxa/logout", method = "GET", method = "POST")]
pub async fn fxa_logout(assist_config: web::Data<AssistConfig>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, logout_url(&assist_config)))
        .insert_header((header::SET_COOKIE, COOKIE_FOR_LOGOUT))
        .finish()
}
