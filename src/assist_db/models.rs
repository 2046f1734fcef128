use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub can_change_profiles: bool,
    pub can_deactivate_users: bool,
}

impl User {
    pub fn new(username: &str, email: &str) -> User {
        User {
            username: username.to_string(),
            email: email.to_string(),
            is_active: true,
            can_change_profiles: false,
            can_deactivate_users: false,
        }
    }
}

#[derive(Clone, Debug, FromRow, Serialize, Deserialize, PartialEq)]
pub struct InstantiatedUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub can_change_profiles: bool,
    pub can_deactivate_users: bool,
}

#[derive(Clone, Debug, Default, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub user_id: i32,
    pub name: String,
    pub bio: String,
    pub public_email: bool,
    pub website: String,
    pub twitter: String,
    pub facebook: String,
    pub community_profile: String,
    pub irc_handle: String,
    pub country: String,
    pub city: String,
    pub timezone: String,
    pub locale: String,
    pub involved_from: Option<NaiveDate>,
    pub avatar: Option<String>,
    pub is_fxa_migrated: bool,
    pub fxa_uid: Option<String>,
}

impl Profile {
    pub fn new(user_id: i32) -> Profile {
        Profile {
            user_id,
            ..Default::default()
        }
    }

    /// Wipes everything the user entered about themselves. The avatar file
    /// itself is removed by the caller.
    pub fn clear(&mut self) {
        *self = Profile {
            user_id: self.user_id,
            is_fxa_migrated: self.is_fxa_migrated,
            fxa_uid: self.fxa_uid.take(),
            locale: std::mem::take(&mut self.locale),
            timezone: std::mem::take(&mut self.timezone),
            ..Default::default()
        };
    }
}

#[derive(Clone, Debug, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Setting {
    pub user_id: i32,
    pub name: String,
    pub value: String,
}

#[derive(Debug, FromRow, Serialize, Deserialize)]
pub struct Deactivation {
    pub id: i32,
    pub user_id: i32,
    pub moderator_id: i32,
    pub date: NaiveDateTime,
}

#[derive(Debug, FromRow, Serialize, Deserialize)]
pub struct DeactivationLogEntry {
    pub id: i32,
    pub username: String,
    pub moderator_username: String,
    pub date: NaiveDateTime,
}
