use crate::forms::{CleanedValue, FieldKind, FieldMessages, FieldSpec, Form};
use crate::users::username_validation::check_username;
use regex::Regex;
use std::sync::OnceLock;

pub const USERNAME_MIN_LENGTH: usize = 4;
pub const USERNAME_MAX_LENGTH: usize = 30;
pub const USERNAME_REQUIRED: &str = "Username is required.";
pub const USERNAME_SHORT: &str = "Username is too short ({show_value} characters). \
     It must be at least {limit_value} characters.";
pub const USERNAME_LONG: &str = "Username is too long ({show_value} characters). \
     It must be {limit_value} characters or less.";
pub const USERNAME_INVALID: &str =
    "Username may contain only English letters, numbers and ./-/_ characters.";

fn username_characters() -> &'static Regex {
    static USERNAME_CHARACTERS: OnceLock<Regex> = OnceLock::new();
    USERNAME_CHARACTERS
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid username regex"))
}

pub fn username_field() -> FieldSpec {
    FieldSpec::new("username", FieldKind::Text)
        .required()
        .min_length(USERNAME_MIN_LENGTH)
        .max_length(USERNAME_MAX_LENGTH)
        .messages(FieldMessages {
            required: Some(USERNAME_REQUIRED),
            min_length: Some(USERNAME_SHORT),
            max_length: Some(USERNAME_LONG),
        })
}

/// Changes the username of the signed-in account.
pub struct UsernameForm<'a> {
    pub blacklist: &'a [String],
}

impl Form for UsernameForm<'_> {
    fn fields(&self) -> Vec<FieldSpec> {
        vec![username_field()]
    }

    fn clean_field(&self, name: &str, value: CleanedValue) -> Result<CleanedValue, String> {
        if name == "username" {
            let username = value.as_text().unwrap_or_default();
            if !username_characters().is_match(username) {
                return Err(USERNAME_INVALID.to_string());
            }
            check_username(username, self.blacklist)?;
        }
        Ok(value)
    }
}
