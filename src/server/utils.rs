use crate::error::AssistError;
use crate::forms::{FormInput, UploadedFile};
use crate::users::avatars::check_file_size;
use actix_multipart::Multipart;
use actix_web::HttpRequest;
use futures_util::StreamExt;

pub fn get_optional_header(
    req: &HttpRequest,
    header_name: &str,
) -> Result<Option<String>, AssistError> {
    match req.headers().get(header_name) {
        Some(header) => match header.to_str() {
            Ok(header_value) => Ok(Some(header_value.to_string())),
            Err(err) => Err(AssistError::Other {
                message: err.to_string(),
            }),
        },
        None => Ok(None),
    }
}

pub fn get_cookie(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    let cookies = get_optional_header(req, "Cookie").ok()??;
    cookies
        .split(';')
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.to_string())
}

pub fn query_param(req: &HttpRequest, name: &str) -> Option<String> {
    url::form_urlencoded::parse(req.query_string().as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Only same-site paths are followed after sign-in and sign-out.
pub fn safe_next_url(next: Option<String>) -> Option<String> {
    next.filter(|next| next.starts_with('/') && !next.starts_with("//"))
}

/// Collects a multipart body into text values and uploaded files. Reading
/// stops with `FileTooLarge` as soon as one field exceeds `max_field_size`.
pub async fn read_multipart(
    mut payload: Multipart,
    max_field_size: u64,
) -> Result<FormInput, AssistError> {
    let mut input = FormInput::new();
    while let Some(field) = payload.next().await {
        let mut field = field?;
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        let file_name = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(String::from);
        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            check_file_size((data.len() + chunk.len()) as u64, max_field_size)?;
            data.extend_from_slice(&chunk);
        }

        match file_name {
            Some(file_name) => {
                input.files.insert(
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        data,
                    },
                );
            }
            None => {
                input
                    .values
                    .insert(name, String::from_utf8_lossy(&data).into_owned());
            }
        }
    }
    Ok(input)
}
