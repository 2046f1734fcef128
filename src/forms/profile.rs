use crate::assist_db::models::Profile;
use crate::forms::{CleanedData, CleanedValue, FieldKind, FieldSpec, Form};
use chrono::{Datelike, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const FACEBOOK_URL_PATTERN: &str = r"^https?://(?:www\.)?facebook\.com/(\w|\.)+";
pub const FACEBOOK_URL_MESSAGE: &str = "Please enter a facebook.com URL.";
pub const FIRST_INVOLVEMENT_YEAR: i32 = 1998;

fn facebook_url() -> &'static Regex {
    static FACEBOOK_URL: OnceLock<Regex> = OnceLock::new();
    FACEBOOK_URL.get_or_init(|| Regex::new(FACEBOOK_URL_PATTERN).expect("valid facebook regex"))
}

fn base_profile_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("name", FieldKind::Text).max_length(255),
        FieldSpec::new("bio", FieldKind::Text),
        FieldSpec::new("public_email", FieldKind::Boolean),
        FieldSpec::new("website", FieldKind::Url).max_length(255),
        FieldSpec::new("twitter", FieldKind::Url).max_length(255),
        FieldSpec::new("facebook", FieldKind::Url).max_length(255),
        FieldSpec::new("community_profile", FieldKind::Url).max_length(255),
        FieldSpec::new("irc_handle", FieldKind::Text).max_length(255),
        FieldSpec::new("country", FieldKind::Text).max_length(2),
        FieldSpec::new("city", FieldKind::Text).max_length(255),
        FieldSpec::new("timezone", FieldKind::Text).max_length(42),
        FieldSpec::new("locale", FieldKind::Text).max_length(7),
        FieldSpec::new("involved_from", FieldKind::Date),
    ]
}

/// Profiles that sign in through the identity provider get their email
/// from it, so they have no public email toggle.
pub fn profile_fields(is_fxa_migrated: bool) -> Vec<FieldSpec> {
    base_profile_fields()
        .into_iter()
        .filter(|field| !(is_fxa_migrated && field.name == "public_email"))
        .collect()
}

pub struct ProfileForm {
    is_fxa_migrated: bool,
    current_year: i32,
}

impl ProfileForm {
    pub fn new(is_fxa_migrated: bool, current_year: i32) -> Self {
        ProfileForm {
            is_fxa_migrated,
            current_year,
        }
    }

    pub fn for_profile(profile: &Profile) -> Self {
        Self::new(profile.is_fxa_migrated, Utc::now().year())
    }

    pub fn involvement_years(&self) -> Vec<i32> {
        (FIRST_INVOLVEMENT_YEAR..=self.current_year).collect()
    }

    /// Copies cleaned values onto `profile`. Fields missing from the form,
    /// like the public email toggle of migrated profiles, keep their value.
    pub fn apply(&self, cleaned: &CleanedData, profile: &mut Profile) {
        profile.name = cleaned.text("name");
        profile.bio = cleaned.text("bio");
        if cleaned.contains_key("public_email") {
            profile.public_email = cleaned.bool("public_email");
        }
        profile.website = cleaned.text("website");
        profile.twitter = cleaned.text("twitter");
        profile.facebook = cleaned.text("facebook");
        profile.community_profile = cleaned.text("community_profile");
        profile.irc_handle = cleaned.text("irc_handle");
        profile.country = cleaned.text("country");
        profile.city = cleaned.text("city");
        profile.timezone = cleaned.text("timezone");
        profile.locale = cleaned.text("locale");
        profile.involved_from = cleaned.date("involved_from");
    }

    /// Values shown when the form is first rendered for `profile`.
    pub fn initial(&self, profile: &Profile) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        let mut insert = |name: &str, value: &str| {
            values.insert(name.to_string(), value.to_string());
        };
        insert("name", &profile.name);
        insert("bio", &profile.bio);
        if !self.is_fxa_migrated && profile.public_email {
            insert("public_email", "on");
        }
        insert("website", &profile.website);
        insert("twitter", &profile.twitter);
        insert("facebook", &profile.facebook);
        insert("community_profile", &profile.community_profile);
        insert("irc_handle", &profile.irc_handle);
        insert("country", &profile.country);
        insert("city", &profile.city);
        insert("timezone", &profile.timezone);
        insert("locale", &profile.locale);
        if let Some(involved_from) = profile.involved_from {
            insert("involved_from", &involved_from.format("%Y-%m").to_string());
        }
        values
    }
}

impl Form for ProfileForm {
    fn fields(&self) -> Vec<FieldSpec> {
        profile_fields(self.is_fxa_migrated)
    }

    fn clean_field(&self, name: &str, value: CleanedValue) -> Result<CleanedValue, String> {
        match name {
            "facebook" => {
                let facebook = value.as_text().unwrap_or_default();
                if !facebook.is_empty() && !facebook_url().is_match(facebook) {
                    return Err(FACEBOOK_URL_MESSAGE.to_string());
                }
                Ok(value)
            }
            "involved_from" => {
                let years = FIRST_INVOLVEMENT_YEAR..=self.current_year;
                match value.as_date() {
                    Some(date) if !years.contains(&date.year()) => Err(format!(
                        "Enter a year between {} and {}.",
                        FIRST_INVOLVEMENT_YEAR, self.current_year
                    )),
                    _ => Ok(value),
                }
            }
            _ => Ok(value),
        }
    }
}
