use crate::assist_db::db_interfaces::AssistDb;
use crate::assist_db::models::InstantiatedUser;
use crate::error::AssistError;
use crate::server::config::AssistConfig;
use crate::server::sessions::{session_from_request, Session};
use actix_web::{http::header, HttpRequest, HttpResponse};

/// The session of a request and the active user it belongs to, if any.
pub struct Viewer {
    pub session: Session,
    pub user: Option<InstantiatedUser>,
}

pub async fn signed_in_user(
    session: &Session,
    assist_db: &dyn AssistDb,
) -> Result<Option<InstantiatedUser>, AssistError> {
    let Some(user_id) = session.user_id else {
        return Ok(None);
    };
    match assist_db.get_user_by_id(user_id).await {
        Ok(user) if user.is_active => Ok(Some(user)),
        Ok(_) | Err(AssistError::RecordNotFound { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

pub async fn current_viewer(
    req: &HttpRequest,
    assist_config: &AssistConfig,
    assist_db: &dyn AssistDb,
) -> Result<Viewer, AssistError> {
    let session = session_from_request(req, &assist_config.authentication);
    let user = signed_in_user(&session, assist_db).await?;
    Ok(Viewer { session, user })
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn redirect_to_login(req: &HttpRequest) -> HttpResponse {
    let current_url = req.uri().to_string();
    redirect(&format!(
        "/users/auth?next={}",
        urlencoding::encode(&current_url)
    ))
}

pub fn profile_url(username: &str) -> String {
    format!("/user/{}", urlencoding::encode(username))
}

/// Resolves to the signed-in user, or to the response that sends an
/// anonymous visitor to the sign-in page.
macro_rules! require_login {
    ($req:expr, $viewer:expr) => {
        match $viewer.user.clone() {
            Some(user) => user,
            None => return Ok($crate::server::ui_endpoints::auth::redirect_to_login(&$req)),
        }
    };
}

pub(crate) use require_login;
