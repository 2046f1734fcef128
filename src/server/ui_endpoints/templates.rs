use crate::assist_db::models::InstantiatedUser;
use crate::error::AssistError;
use crate::forms::{FieldKind, FieldSpec, FormErrors};
use actix_web::HttpResponse;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tera::{Context, Tera};

static TEMPLATES: OnceLock<Result<Tera, tera::Error>> = OnceLock::new();

fn build_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("templates/base.html")),
        ("form_fields.html", include_str!("templates/form_fields.html")),
        ("auth.html", include_str!("templates/auth.html")),
        ("profile.html", include_str!("templates/profile.html")),
        ("edit_profile.html", include_str!("templates/edit_profile.html")),
        ("edit_avatar.html", include_str!("templates/edit_avatar.html")),
        (
            "confirm_avatar_delete.html",
            include_str!("templates/confirm_avatar_delete.html"),
        ),
        ("edit_settings.html", include_str!("templates/edit_settings.html")),
        ("edit_username.html", include_str!("templates/edit_username.html")),
        ("close_account.html", include_str!("templates/close_account.html")),
        (
            "deactivation_log.html",
            include_str!("templates/deactivation_log.html"),
        ),
    ])?;
    Ok(tera)
}

pub fn render(template_name: &str, context: &Context) -> Result<String, AssistError> {
    match TEMPLATES.get_or_init(build_templates) {
        Ok(tera) => Ok(tera.render(template_name, context)?),
        Err(err) => Err(AssistError::Other {
            message: format!("Unable to load templates: {err}"),
        }),
    }
}

pub fn ok_response(template_name: &str, context: &Context) -> Result<HttpResponse, AssistError> {
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render(template_name, context)?))
}

/// Context shared by every page: who is signed in.
pub fn base_context(viewer: Option<&InstantiatedUser>) -> Context {
    let mut context = Context::new();
    context.insert("viewer", &viewer.map(|user| user.username.as_str()));
    context
}

#[derive(Debug, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: String,
    pub input_type: &'static str,
    pub value: String,
    pub checked: bool,
    pub errors: Vec<String>,
}

fn label_for(name: &str) -> String {
    let label = name.replace('_', " ");
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => label,
    }
}

/// Pairs each field with its current value and errors for rendering.
pub fn field_views(
    fields: &[FieldSpec],
    values: &BTreeMap<String, String>,
    errors: &FormErrors,
) -> Vec<FieldView> {
    fields
        .iter()
        .map(|field| {
            let value = values.get(field.name).cloned().unwrap_or_default();
            let input_type = match field.kind {
                FieldKind::Text => "text",
                FieldKind::Url => "url",
                FieldKind::Boolean => "checkbox",
                FieldKind::Date => "month",
                FieldKind::Image => "file",
            };
            FieldView {
                name: field.name,
                label: label_for(field.name),
                input_type,
                checked: field.kind == FieldKind::Boolean && !value.is_empty(),
                value,
                errors: errors.get(field.name).to_vec(),
            }
        })
        .collect()
}
