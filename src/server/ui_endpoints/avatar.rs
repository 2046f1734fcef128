use crate::assist_db::db_interfaces::AssistDb;
use crate::assist_db::models::{InstantiatedUser, Profile};
use crate::error::AssistError;
use crate::forms::avatar::AvatarForm;
use crate::forms::{Form, FormErrors};
use crate::server::config::AssistConfig;
use crate::server::ui_endpoints::auth::{current_viewer, redirect, require_login};
use crate::server::ui_endpoints::templates::{base_context, ok_response};
use crate::server::utils::read_multipart;
use crate::users::avatars::{delete_avatar, replace_avatar, AvatarStorage, Thumbnailer};
use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use std::fs;

const AVATAR_MEDIA_PREFIX: &str = "/media/avatars/";

pub fn avatar_url(name: &str) -> String {
    format!("{AVATAR_MEDIA_PREFIX}{}", urlencoding::encode(name))
}

/// Profiles managed by the identity provider take their avatar from it.
async fn editable_profile(
    user: &InstantiatedUser,
    assist_db: &dyn AssistDb,
) -> Result<Profile, AssistError> {
    let profile = assist_db.get_or_create_profile(user.id).await?;
    if profile.is_fxa_migrated {
        return Err(AssistError::not_found("avatar", user.id));
    }
    Ok(profile)
}

fn edit_avatar_page(
    user: &InstantiatedUser,
    profile: &Profile,
    form: &AvatarForm,
    errors: &FormErrors,
) -> Result<HttpResponse, AssistError> {
    let mut context = base_context(Some(user));
    context.insert("avatar_url", &profile.avatar.as_deref().map(avatar_url));
    context.insert("help_text", &form.help_text());
    context.insert("errors", errors.get("avatar"));
    ok_response("edit_avatar.html", &context)
}

fn avatar_form(assist_config: &AssistConfig) -> AvatarForm {
    AvatarForm {
        max_file_size: assist_config.avatars.max_file_size,
        avatar_size: assist_config.avatars.size,
    }
}

#[get("/users/edit/avatar")]
pub async fn edit_avatar(
    req: HttpRequest,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
) -> Result<HttpResponse, AssistError> {
    let assist_db = assist_db.get_ref().as_ref();
    let viewer = current_viewer(&req, &assist_config, assist_db).await?;
    let user = require_login!(req, viewer);
    let profile = editable_profile(&user, assist_db).await?;
    edit_avatar_page(&user, &profile, &avatar_form(&assist_config), &FormErrors::default())
}

#[post("/users/edit/avatar")]
pub async fn edit_avatar_submit(
    req: HttpRequest,
    payload: Multipart,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
    storage: web::Data<AvatarStorage>,
    thumbnailer: web::Data<Box<dyn Thumbnailer>>,
) -> Result<HttpResponse, AssistError> {
    let assist_db = assist_db.get_ref().as_ref();
    let viewer = current_viewer(&req, &assist_config, assist_db).await?;
    let user = require_login!(req, viewer);
    let mut profile = editable_profile(&user, assist_db).await?;

    let form = avatar_form(&assist_config);
    let input = match read_multipart(payload, form.max_file_size).await {
        Ok(input) => input,
        Err(AssistError::FileTooLarge { message }) => {
            let mut errors = FormErrors::default();
            errors.add("avatar", message);
            return edit_avatar_page(&user, &profile, &form, &errors);
        }
        Err(err) => return Err(err),
    };
    let cleaned = match form.validate(&input) {
        Ok(cleaned) => cleaned,
        Err(errors) => return edit_avatar_page(&user, &profile, &form, &errors),
    };
    let upload = cleaned.file("avatar").ok_or_else(|| AssistError::Other {
        message: "avatar missing from a valid upload".to_string(),
    })?;

    replace_avatar(
        &storage,
        thumbnailer.get_ref().as_ref(),
        &mut profile,
        upload,
        assist_config.avatars.size,
    )?;
    assist_db.update_profile(&profile).await?;
    Ok(redirect("/users/edit"))
}

#[get("/users/avatar/delete")]
pub async fn confirm_avatar_delete(
    req: HttpRequest,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
) -> Result<HttpResponse, AssistError> {
    let assist_db = assist_db.get_ref().as_ref();
    let viewer = current_viewer(&req, &assist_config, assist_db).await?;
    let user = require_login!(req, viewer);
    let profile = editable_profile(&user, assist_db).await?;

    let mut context = base_context(Some(&user));
    context.insert("avatar_url", &profile.avatar.as_deref().map(avatar_url));
    ok_response("confirm_avatar_delete.html", &context)
}

#[post("/users/avatar/delete")]
pub async fn delete_avatar_submit(
    req: HttpRequest,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
    storage: web::Data<AvatarStorage>,
) -> Result<HttpResponse, AssistError> {
    let assist_db = assist_db.get_ref().as_ref();
    let viewer = current_viewer(&req, &assist_config, assist_db).await?;
    let user = require_login!(req, viewer);
    let mut profile = editable_profile(&user, assist_db).await?;

    if profile.avatar.is_some() {
        delete_avatar(&storage, &mut profile)?;
        assist_db.update_profile(&profile).await?;
    }
    Ok(redirect("/users/edit"))
}

#[get("/media/avatars/{name}")]
pub async fn avatar_file(
    path: web::Path<String>,
    storage: web::Data<AvatarStorage>,
) -> Result<HttpResponse, AssistError> {
    let name = path.into_inner();
    if name.starts_with('.') || name.contains(['/', '\\']) || !storage.exists(&name) {
        return Err(AssistError::not_found("avatar", name));
    }
    Ok(HttpResponse::Ok()
        .content_type("image/png")
        .body(fs::read(storage.path(&name))?))
}
