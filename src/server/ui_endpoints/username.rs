use crate::assist_db::db_interfaces::AssistDb;
use crate::assist_db::models::InstantiatedUser;
use crate::error::AssistError;
use crate::forms::username::{username_field, UsernameForm};
use crate::forms::{Form, FormErrors, FormInput};
use crate::server::config::AssistConfig;
use crate::server::ui_endpoints::auth::{current_viewer, profile_url, redirect, require_login};
use crate::server::ui_endpoints::templates::{base_context, field_views, ok_response};
use crate::users::blacklist::BlacklistCache;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use log::info;
use std::collections::{BTreeMap, HashMap};

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

fn edit_username_page(
    user: &InstantiatedUser,
    username: &str,
    errors: &FormErrors,
) -> Result<HttpResponse, AssistError> {
    let values = BTreeMap::from([("username".to_string(), username.to_string())]);
    let mut context = base_context(Some(user));
    context.insert("fields", &field_views(&[username_field()], &values, errors));
    ok_response("edit_username.html", &context)
}

#[get("/users/edit/username")]
pub async fn edit_username(
    req: HttpRequest,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
) -> Result<HttpResponse, AssistError> {
    let assist_db = assist_db.get_ref().as_ref();
    let viewer = current_viewer(&req, &assist_config, assist_db).await?;
    let user = require_login!(req, viewer);
    edit_username_page(&user, &user.username, &FormErrors::default())
}

#[post("/users/edit/username")]
pub async fn edit_username_submit(
    req: HttpRequest,
    form: web::Form<HashMap<String, String>>,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
    blacklist: web::Data<BlacklistCache>,
) -> Result<HttpResponse, AssistError> {
    let assist_db = assist_db.get_ref().as_ref();
    let viewer = current_viewer(&req, &assist_config, assist_db).await?;
    let mut user = require_login!(req, viewer);

    let input = FormInput::from(form.into_inner());
    let submitted = input.values.get("username").cloned().unwrap_or_default();
    let words = blacklist.get()?;
    let cleaned = match (UsernameForm { blacklist: &words }).validate(&input) {
        Ok(cleaned) => cleaned,
        Err(errors) => return edit_username_page(&user, &submitted, &errors),
    };

    let username = cleaned.text("username");
    if username != user.username {
        match assist_db.get_user_by_username(&username).await {
            Ok(_) => {
                let mut errors = FormErrors::default();
                errors.add("username", USERNAME_TAKEN.to_string());
                return edit_username_page(&user, &submitted, &errors);
            }
            Err(AssistError::RecordNotFound { .. }) => {}
            Err(err) => return Err(err),
        }
        info!("User {} renamed from {} to {}", user.id, user.username, username);
        user.username = username;
        assist_db.update_user(&user).await?;
    }
    Ok(redirect(&profile_url(&user.username)))
}
