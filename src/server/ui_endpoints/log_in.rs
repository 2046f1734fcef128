use crate::assist_db::db_interfaces::AssistDb;
use crate::error::AssistError;
use crate::server::config::AssistConfig;
use crate::server::sessions::{session_exists_cookie, COOKIE_FOR_LOGOUT};
use crate::server::ui_endpoints::auth::{current_viewer, profile_url, redirect};
use crate::server::ui_endpoints::templates::{base_context, ok_response};
use crate::server::utils::{query_param, safe_next_url};
use actix_web::{get, http::header, post, web, HttpRequest, HttpResponse};
use log::debug;

fn auth_page(req: &HttpRequest) -> Result<HttpResponse, AssistError> {
    let next_url = safe_next_url(query_param(req, "next")).unwrap_or_else(|| "/".to_string());
    let mut context = base_context(None);
    context.insert("next_url", &next_url);
    ok_response("auth.html", &context)
}

#[get("/users/auth")]
pub async fn user_auth(
    req: HttpRequest,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
) -> Result<HttpResponse, AssistError> {
    let viewer = current_viewer(&req, &assist_config, assist_db.get_ref().as_ref()).await?;
    if viewer.user.is_some() {
        let next_url = safe_next_url(query_param(&req, "next")).unwrap_or_else(|| "/".to_string());
        return Ok(redirect(&next_url));
    }
    auth_page(&req)
}

#[get("/users/login")]
pub async fn login_redirect(req: HttpRequest) -> HttpResponse {
    HttpResponse::MovedPermanently()
        .insert_header((
            header::LOCATION,
            format!("/users/auth?{}", req.query_string()),
        ))
        .finish()
}

/// The legacy sign-in form. Credentials are checked by the identity
/// provider, so only already signed-in users get past this page.
#[post("/users/login")]
pub async fn login(
    req: HttpRequest,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
) -> Result<HttpResponse, AssistError> {
    let viewer = current_viewer(&req, &assist_config, assist_db.get_ref().as_ref()).await?;
    match viewer.user {
        Some(user) => Ok(HttpResponse::Found()
            .insert_header((
                header::LOCATION,
                format!("{}?fpa=1", profile_url(&user.username)),
            ))
            .insert_header((
                header::SET_COOKIE,
                session_exists_cookie(&assist_config.authentication),
            ))
            .finish()),
        None => auth_page(&req),
    }
}

#[post("/users/logout")]
pub async fn logout(req: HttpRequest) -> HttpResponse {
    debug!("Signing out");
    let next_url = safe_next_url(query_param(&req, "next")).unwrap_or_else(|| "/".to_string());
    HttpResponse::Found()
        .insert_header((header::LOCATION, next_url))
        .insert_header((header::SET_COOKIE, COOKIE_FOR_LOGOUT))
        .finish()
}
