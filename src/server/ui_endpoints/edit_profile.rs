use crate::assist_db::db_interfaces::AssistDb;
use crate::assist_db::models::{InstantiatedUser, Profile};
use crate::error::AssistError;
use crate::forms::profile::ProfileForm;
use crate::forms::{Form, FormErrors, FormInput};
use crate::server::config::AssistConfig;
use crate::server::sessions::cookie_for_session;
use crate::server::ui_endpoints::auth::{current_viewer, profile_url, require_login, Viewer};
use crate::server::ui_endpoints::templates::{base_context, field_views, ok_response};
use actix_web::{get, http::header, post, web, HttpRequest, HttpResponse};
use log::info;
use std::collections::{BTreeMap, HashMap};

/// Whose profile is being edited: the viewer's own, or, for moderators
/// who can change profiles, someone else's.
async fn profile_owner(
    viewer: &InstantiatedUser,
    username: Option<&str>,
    assist_db: &dyn AssistDb,
) -> Result<InstantiatedUser, AssistError> {
    match username {
        Some(username) if username != viewer.username => {
            let user = assist_db.get_user_by_username(username).await?;
            if !viewer.can_change_profiles {
                return Err(AssistError::PermissionDenied {
                    message: format!("You are not allowed to edit the profile of {username}"),
                });
            }
            Ok(user)
        }
        _ => Ok(viewer.clone()),
    }
}

fn edit_profile_page(
    viewer: &Viewer,
    owner: &InstantiatedUser,
    profile: &Profile,
    form: &ProfileForm,
    values: &BTreeMap<String, String>,
    errors: &FormErrors,
) -> Result<HttpResponse, AssistError> {
    let is_owner = viewer.user.as_ref().is_some_and(|viewer| viewer.id == owner.id);
    let action = if is_owner {
        "/users/edit".to_string()
    } else {
        format!("/users/edit/{}", urlencoding::encode(&owner.username))
    };

    let mut context = base_context(viewer.user.as_ref());
    context.insert("username", &owner.username);
    context.insert("profile", profile);
    context.insert("is_owner", &is_owner);
    context.insert("action", &action);
    context.insert("fields", &field_views(&form.fields(), values, errors));
    context.insert("involvement_years", &form.involvement_years());
    ok_response("edit_profile.html", &context)
}

async fn show_edit_profile(
    req: HttpRequest,
    username: Option<String>,
    assist_config: &AssistConfig,
    assist_db: &dyn AssistDb,
) -> Result<HttpResponse, AssistError> {
    let viewer = current_viewer(&req, assist_config, assist_db).await?;
    let user = require_login!(req, viewer);
    let owner = profile_owner(&user, username.as_deref(), assist_db).await?;
    let profile = assist_db.get_or_create_profile(owner.id).await?;

    let form = ProfileForm::for_profile(&profile);
    let values = form.initial(&profile);
    edit_profile_page(&viewer, &owner, &profile, &form, &values, &FormErrors::default())
}

async fn submit_edit_profile(
    req: HttpRequest,
    username: Option<String>,
    submitted: HashMap<String, String>,
    assist_config: &AssistConfig,
    assist_db: &dyn AssistDb,
) -> Result<HttpResponse, AssistError> {
    let viewer = current_viewer(&req, assist_config, assist_db).await?;
    let user = require_login!(req, viewer);
    let owner = profile_owner(&user, username.as_deref(), assist_db).await?;
    let mut profile = assist_db.get_or_create_profile(owner.id).await?;

    let form = ProfileForm::for_profile(&profile);
    let input = FormInput::from(submitted);
    let cleaned = match form.validate(&input) {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            let values: BTreeMap<String, String> = input.values.into_iter().collect();
            return edit_profile_page(&viewer, &owner, &profile, &form, &values, &errors);
        }
    };

    form.apply(&cleaned, &mut profile);
    assist_db.update_profile(&profile).await?;
    info!("User {} updated the profile of user {}", user.id, owner.id);

    let mut response = HttpResponse::Found();
    response.insert_header((header::LOCATION, profile_url(&owner.username)));
    let timezone_changed = viewer.session.timezone.as_deref() != Some(profile.timezone.as_str());
    if owner.id == user.id && timezone_changed {
        let mut session = viewer.session.clone();
        session.timezone = Some(profile.timezone.clone());
        response.insert_header((
            header::SET_COOKIE,
            cookie_for_session(&session, &assist_config.authentication)?,
        ));
    }
    Ok(response.finish())
}

#[get("/users/edit")]
pub async fn edit_my_profile(
    req: HttpRequest,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
) -> Result<HttpResponse, AssistError> {
    show_edit_profile(req, None, &assist_config, assist_db.get_ref().as_ref()).await
}

#[post("/users/edit")]
pub async fn edit_my_profile_submit(
    req: HttpRequest,
    form: web::Form<HashMap<String, String>>,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
) -> Result<HttpResponse, AssistError> {
    submit_edit_profile(
        req,
        None,
        form.into_inner(),
        &assist_config,
        assist_db.get_ref().as_ref(),
    )
    .await
}

#[get("/users/edit/{username}")]
pub async fn edit_profile(
    req: HttpRequest,
    path: web::Path<String>,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
) -> Result<HttpResponse, AssistError> {
    show_edit_profile(
        req,
        Some(path.into_inner()),
        &assist_config,
        assist_db.get_ref().as_ref(),
    )
    .await
}

#[post("/users/edit/{username}")]
pub async fn edit_profile_submit(
    req: HttpRequest,
    path: web::Path<String>,
    form: web::Form<HashMap<String, String>>,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
) -> Result<HttpResponse, AssistError> {
    submit_edit_profile(
        req,
        Some(path.into_inner()),
        form.into_inner(),
        &assist_config,
        assist_db.get_ref().as_ref(),
    )
    .await
}
