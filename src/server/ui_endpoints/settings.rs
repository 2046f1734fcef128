use crate::assist_db::db_interfaces::AssistDb;
use crate::assist_db::models::InstantiatedUser;
use crate::error::AssistError;
use crate::forms::settings::{SettingsForm, SETTINGS_FIELDS};
use crate::forms::{Form, FormErrors, FormInput};
use crate::server::config::AssistConfig;
use crate::server::ui_endpoints::auth::{current_viewer, redirect, require_login};
use crate::server::ui_endpoints::templates::{base_context, field_views, ok_response};
use crate::server::utils::query_param;
use crate::users::settings::{initial_toggles, load_initial, save_for_user};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use std::collections::{BTreeMap, HashMap};

fn edit_settings_page(
    user: &InstantiatedUser,
    values: &BTreeMap<String, String>,
    errors: &FormErrors,
    saved: bool,
) -> Result<HttpResponse, AssistError> {
    let mut context = base_context(Some(user));
    let mut fields = field_views(&SettingsForm.fields(), values, errors);
    for field in &mut fields {
        if let Some((_, label)) = SETTINGS_FIELDS.iter().find(|(name, _)| *name == field.name) {
            field.label = label.to_string();
        }
    }
    context.insert("fields", &fields);
    context.insert("saved", &saved);
    ok_response("edit_settings.html", &context)
}

#[get("/users/settings")]
pub async fn edit_settings(
    req: HttpRequest,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
) -> Result<HttpResponse, AssistError> {
    let assist_db = assist_db.get_ref().as_ref();
    let viewer = current_viewer(&req, &assist_config, assist_db).await?;
    let user = require_login!(req, viewer);

    let stored = load_initial(assist_db, user.id).await?;
    let values: BTreeMap<String, String> = initial_toggles(&stored)
        .into_iter()
        .filter(|(_, checked)| *checked)
        .map(|(name, _)| (name, "on".to_string()))
        .collect();
    let saved = query_param(&req, "saved").is_some();
    edit_settings_page(&user, &values, &FormErrors::default(), saved)
}

#[post("/users/settings")]
pub async fn edit_settings_submit(
    req: HttpRequest,
    form: web::Form<HashMap<String, String>>,
    assist_config: web::Data<AssistConfig>,
    assist_db: web::Data<Box<dyn AssistDb>>,
) -> Result<HttpResponse, AssistError> {
    let assist_db = assist_db.get_ref().as_ref();
    let viewer = current_viewer(&req, &assist_config, assist_db).await?;
    let user = require_login!(req, viewer);

    let input = FormInput::from(form.into_inner());
    match SettingsForm.validate(&input) {
        Ok(cleaned) => {
            save_for_user(assist_db, user.id, &cleaned).await?;
            Ok(redirect("/users/settings?saved=1"))
        }
        Err(errors) => {
            let values: BTreeMap<String, String> = input.values.into_iter().collect();
            edit_settings_page(&user, &values, &errors, false)
        }
    }
}
