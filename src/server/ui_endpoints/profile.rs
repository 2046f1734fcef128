use crate::assist_db::db_interfaces::AssistDb;
use crate::assist_db::models::InstantiatedUser;
use crate::error::AssistError;
use crate::server::config::AssistConfig;
use crate::server::sessions::COOKIE_FOR_LOGOUT;
use crate::server::ui_endpoints::auth::{current_viewer, profile_url, redirect, require_login};
use crate::server::ui_endpoints::avatar::avatar_url;
use crate::server::ui_endpoints::templates::{base_context, ok_response, render};
use crate::server::utils::query_param;
use crate::users::avatars::{delete_avatar, AvatarStorage};
use actix_web::{get, http::header, post, web, HttpRequest, HttpResponse};
use log::info;
use serde::Deserialize;
use uuid::Uuid;

pub const DEACTIVATIONS_PER_PAGE: i64 = 25;

fn require_deactivate_permission(user: &InstantiatedUser) -> Result<(), AssistError> {
    if user.can_deactivate_users {
        Ok(())
    } else {
        Err(AssistError::PermissionDenied {
            message: "You are not allowed to deactivate users".to_string(),
        })
    }
}

#[get("/user/{username}")]
pub async fn profile(
    req: HttpRequest,
    path: web::Path<String>,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
) -> Result<HttpResponse, AssistError> {
    let assist_db = assist_db.get_ref().as_ref();
    // Browsers turn '+' into ' ', and usernames never contain spaces.
    let username = path.into_inner().replace(' ', "+");

    let user = match assist_db.get_user_by_username(&username).await {
        Ok(user) => user,
        Err(AssistError::RecordNotFound { .. }) => {
            let id = username
                .parse::<i32>()
                .map_err(|_| AssistError::not_found("user", &username))?;
            let user = assist_db.get_user_by_id(id).await?;
            return Ok(redirect(&profile_url(&user.username)));
        }
        Err(err) => return Err(err),
    };

    let viewer = current_viewer(&req, &assist_config, assist_db).await?;
    let viewer_can_deactivate = viewer
        .user
        .as_ref()
        .is_some_and(|viewer| viewer.can_deactivate_users);
    if !user.is_active && !viewer_can_deactivate {
        return Err(AssistError::not_found("user", &username));
    }

    let profile = assist_db.get_or_create_profile(user.id).await?;
    let is_owner = viewer.user.as_ref().is_some_and(|viewer| viewer.id == user.id);
    let display_name = if profile.name.is_empty() {
        user.username.clone()
    } else {
        profile.name.clone()
    };

    let mut context = base_context(viewer.user.as_ref());
    context.insert("user", &user);
    context.insert("profile", &profile);
    context.insert("display_name", &display_name);
    context.insert("email", &profile.public_email.then_some(&user.email));
    context.insert("avatar_url", &profile.avatar.as_deref().map(avatar_url));
    context.insert("avatar_size", &assist_config.avatars.size);
    context.insert("is_owner", &is_owner);
    context.insert(
        "can_change_profile",
        &viewer.user.as_ref().is_some_and(|viewer| viewer.can_change_profiles),
    );
    context.insert("edit_url", &format!("/users/edit/{}", urlencoding::encode(&user.username)));
    context.insert(
        "can_deactivate",
        &(viewer_can_deactivate && user.is_active && !is_owner),
    );
    context.insert(
        "first_profile_visit",
        &(is_owner && query_param(&req, "fpa").as_deref() == Some("1")),
    );
    ok_response("profile.html", &context)
}

#[post("/users/close_account")]
pub async fn close_account(
    req: HttpRequest,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
    storage: web::Data<AvatarStorage>,
) -> Result<HttpResponse, AssistError> {
    let assist_db = assist_db.get_ref().as_ref();
    let viewer = current_viewer(&req, &assist_config, assist_db).await?;
    let mut user = require_login!(req, viewer);

    let mut user_profile = assist_db.get_or_create_profile(user.id).await?;
    delete_avatar(&storage, &mut user_profile)?;
    user_profile.clear();
    user_profile.fxa_uid = Some(format!("{}-{}", user.id, Uuid::new_v4()));
    assist_db.update_profile(&user_profile).await?;

    user.username = format!("user{}", user.id);
    user.email = format!("{}@example.com", user.id);
    user.is_active = false;
    assist_db.update_user(&user).await?;
    info!("Closed account of user {}", user.id);

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header((header::SET_COOKIE, COOKIE_FOR_LOGOUT))
        .body(render("close_account.html", &base_context(None))?))
}

#[derive(Deserialize)]
pub struct DeactivateRequest {
    user_id: i32,
}

#[post("/users/deactivate")]
pub async fn deactivate(
    req: HttpRequest,
    form: web::Form<DeactivateRequest>,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
) -> Result<HttpResponse, AssistError> {
    let assist_db = assist_db.get_ref().as_ref();
    let viewer = current_viewer(&req, &assist_config, assist_db).await?;
    let moderator = require_login!(req, viewer);
    require_deactivate_permission(&moderator)?;

    let mut user = assist_db.get_user_by_id(form.user_id).await?;
    if !user.is_active {
        return Err(AssistError::not_found("user", user.id));
    }
    user.is_active = false;
    assist_db.update_user(&user).await?;
    assist_db.create_deactivation(user.id, moderator.id).await?;
    info!("User {} deactivated by {}", user.id, moderator.id);

    Ok(redirect(&profile_url(&user.username)))
}

#[get("/users/deactivation_log")]
pub async fn deactivation_log(
    req: HttpRequest,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
) -> Result<HttpResponse, AssistError> {
    let assist_db = assist_db.get_ref().as_ref();
    let viewer = current_viewer(&req, &assist_config, assist_db).await?;
    let moderator = require_login!(req, viewer);
    require_deactivate_permission(&moderator)?;

    let page = query_param(&req, "page")
        .and_then(|page| page.parse::<i64>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1);
    // One extra row tells whether there is a next page.
    let mut deactivations = assist_db
        .list_deactivations(
            DEACTIVATIONS_PER_PAGE + 1,
            (page - 1) * DEACTIVATIONS_PER_PAGE,
        )
        .await?;
    let has_next = deactivations.len() as i64 > DEACTIVATIONS_PER_PAGE;
    deactivations.truncate(DEACTIVATIONS_PER_PAGE as usize);

    let mut context = base_context(Some(&moderator));
    context.insert("deactivations", &deactivations);
    context.insert("page", &page);
    context.insert("has_next", &has_next);
    ok_response("deactivation_log.html", &context)
}
