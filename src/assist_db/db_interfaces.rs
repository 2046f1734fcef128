use crate::assist_db::models::{
    Deactivation, DeactivationLogEntry, InstantiatedUser, Profile, Setting, User,
};
use crate::error::AssistError;
use async_trait::async_trait;
use dyn_clone::{clone_trait_object, DynClone};
use sqlx::{
    migrate,
    postgres::PgPoolOptions,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Postgres, Sqlite,
};
use std::str::FromStr;

// AssistDb is the storage interface for accounts, profiles, settings and
// moderation records. `sqlx` needs static types for pools and query
// execution, so the trait is implemented once per database with the
// shared body generated by `implement_assist_db`.
#[async_trait]
pub trait AssistDb: DynClone + Send + Sync {
    async fn create_user(&self, user: &User) -> Result<InstantiatedUser, AssistError>;
    async fn get_user_by_id(&self, id: i32) -> Result<InstantiatedUser, AssistError>;
    async fn get_user_by_username(&self, username: &str) -> Result<InstantiatedUser, AssistError>;
    async fn update_user(&self, user: &InstantiatedUser) -> Result<(), AssistError>;
    async fn get_profile(&self, user_id: i32) -> Result<Profile, AssistError>;
    async fn get_or_create_profile(&self, user_id: i32) -> Result<Profile, AssistError>;
    async fn update_profile(&self, profile: &Profile) -> Result<(), AssistError>;
    async fn upsert_setting(&self, user_id: i32, name: &str, value: &str)
        -> Result<(), AssistError>;
    async fn list_settings(&self, user_id: i32) -> Result<Vec<Setting>, AssistError>;
    async fn create_deactivation(
        &self,
        user_id: i32,
        moderator_id: i32,
    ) -> Result<Deactivation, AssistError>;
    async fn list_deactivations(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DeactivationLogEntry>, AssistError>;
}

clone_trait_object!(AssistDb);

#[macro_export]
macro_rules! implement_assist_db {
    ($db_type: ident) => {
        #[async_trait]
        impl AssistDb for $db_type {
            async fn create_user(&self, user: &User) -> Result<InstantiatedUser, AssistError> {
                let user: InstantiatedUser = sqlx::query_as(
                    r#"
INSERT INTO account ( username, email, is_active, can_change_profiles, can_deactivate_users )
VALUES ( $1, $2, $3, $4, $5 )
RETURNING id, username, email, is_active, can_change_profiles, can_deactivate_users
                "#,
                )
                .bind(&user.username)
                .bind(&user.email)
                .bind(user.is_active)
                .bind(user.can_change_profiles)
                .bind(user.can_deactivate_users)
                .fetch_one(&self.pool)
                .await
                .or_else(|err| match err {
                    sqlx::Error::Database(db_error)
                        if db_error.message().contains("UNIQUE")
                            || db_error.message().contains("unique constraint") =>
                    {
                        Err(AssistError::Other {
                            message: "User already exists".to_string(),
                        })
                    }
                    _ => Err(AssistError::from(err)),
                })?;

                Ok(user)
            }

            async fn get_user_by_id(&self, id: i32) -> Result<InstantiatedUser, AssistError> {
                let user: InstantiatedUser = sqlx::query_as(
                    r#"
SELECT id, username, email, is_active, can_change_profiles, can_deactivate_users
FROM account
WHERE id = $1
        "#,
                )
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .or_else(|err| match err {
                    sqlx::Error::RowNotFound => Err(AssistError::not_found("user", id)),
                    _ => Err(AssistError::from(err)),
                })?;

                Ok(user)
            }

            async fn get_user_by_username(
                &self,
                username: &str,
            ) -> Result<InstantiatedUser, AssistError> {
                let user: InstantiatedUser = sqlx::query_as(
                    r#"
SELECT id, username, email, is_active, can_change_profiles, can_deactivate_users
FROM account
WHERE username = $1
        "#,
                )
                .bind(username)
                .fetch_one(&self.pool)
                .await
                .or_else(|err| match err {
                    sqlx::Error::RowNotFound => Err(AssistError::not_found("user", username)),
                    _ => Err(AssistError::from(err)),
                })?;

                Ok(user)
            }

            async fn update_user(&self, user: &InstantiatedUser) -> Result<(), AssistError> {
                let result = sqlx::query(
                    r#"
UPDATE account
SET username = $1, email = $2, is_active = $3
WHERE id = $4
        "#,
                )
                .bind(&user.username)
                .bind(&user.email)
                .bind(user.is_active)
                .bind(user.id)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(AssistError::not_found("user", user.id));
                }
                Ok(())
            }

            async fn get_profile(&self, user_id: i32) -> Result<Profile, AssistError> {
                let profile: Profile = sqlx::query_as(
                    r#"
SELECT
    user_id, name, bio, public_email, website, twitter, facebook,
    community_profile, irc_handle, country, city, timezone, locale,
    involved_from, avatar, is_fxa_migrated, fxa_uid
FROM profile
WHERE user_id = $1
        "#,
                )
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .or_else(|err| match err {
                    sqlx::Error::RowNotFound => Err(AssistError::not_found("profile", user_id)),
                    _ => Err(AssistError::from(err)),
                })?;

                Ok(profile)
            }

            async fn get_or_create_profile(&self, user_id: i32) -> Result<Profile, AssistError> {
                sqlx::query(
                    r#"
INSERT INTO profile ( user_id )
VALUES ( $1 )
ON CONFLICT ( user_id ) DO NOTHING
        "#,
                )
                .bind(user_id)
                .execute(&self.pool)
                .await?;

                self.get_profile(user_id).await
            }

            async fn update_profile(&self, profile: &Profile) -> Result<(), AssistError> {
                let result = sqlx::query(
                    r#"
UPDATE profile
SET
    name = $1,
    bio = $2,
    public_email = $3,
    website = $4,
    twitter = $5,
    facebook = $6,
    community_profile = $7,
    irc_handle = $8,
    country = $9,
    city = $10,
    timezone = $11,
    locale = $12,
    involved_from = $13,
    avatar = $14,
    is_fxa_migrated = $15,
    fxa_uid = $16
WHERE user_id = $17
        "#,
                )
                .bind(&profile.name)
                .bind(&profile.bio)
                .bind(profile.public_email)
                .bind(&profile.website)
                .bind(&profile.twitter)
                .bind(&profile.facebook)
                .bind(&profile.community_profile)
                .bind(&profile.irc_handle)
                .bind(&profile.country)
                .bind(&profile.city)
                .bind(&profile.timezone)
                .bind(&profile.locale)
                .bind(profile.involved_from)
                .bind(&profile.avatar)
                .bind(profile.is_fxa_migrated)
                .bind(&profile.fxa_uid)
                .bind(profile.user_id)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(AssistError::not_found("profile", profile.user_id));
                }
                Ok(())
            }

            async fn upsert_setting(
                &self,
                user_id: i32,
                name: &str,
                value: &str,
            ) -> Result<(), AssistError> {
                sqlx::query(
                    r#"
INSERT INTO setting ( user_id, name, value )
VALUES ( $1, $2, $3 )
ON CONFLICT ( user_id, name ) DO UPDATE SET value = excluded.value
        "#,
                )
                .bind(user_id)
                .bind(name)
                .bind(value)
                .execute(&self.pool)
                .await?;

                Ok(())
            }

            async fn list_settings(&self, user_id: i32) -> Result<Vec<Setting>, AssistError> {
                let settings: Vec<Setting> = sqlx::query_as(
                    r#"
SELECT user_id, name, value
FROM setting
WHERE user_id = $1
ORDER BY name
        "#,
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

                Ok(settings)
            }

            async fn create_deactivation(
                &self,
                user_id: i32,
                moderator_id: i32,
            ) -> Result<Deactivation, AssistError> {
                let deactivation: Deactivation = sqlx::query_as(
                    r#"
INSERT INTO deactivation ( user_id, moderator_id, date )
VALUES ( $1, $2, $3 )
RETURNING id, user_id, moderator_id, date
                "#,
                )
                .bind(user_id)
                .bind(moderator_id)
                .bind(chrono::Utc::now().naive_utc())
                .fetch_one(&self.pool)
                .await?;

                Ok(deactivation)
            }

            async fn list_deactivations(
                &self,
                limit: i64,
                offset: i64,
            ) -> Result<Vec<DeactivationLogEntry>, AssistError> {
                let entries: Vec<DeactivationLogEntry> = sqlx::query_as(
                    r#"
SELECT
    deactivation.id,
    deactivated.username AS username,
    moderator.username AS moderator_username,
    deactivation.date
FROM deactivation
JOIN account AS deactivated ON deactivation.user_id = deactivated.id
JOIN account AS moderator ON deactivation.moderator_id = moderator.id
ORDER BY deactivation.date DESC, deactivation.id DESC
LIMIT $1 OFFSET $2
        "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;

                Ok(entries)
            }
        }
    };
}

#[derive(Clone)]
struct SqliteAssistDb {
    pub pool: Pool<Sqlite>,
}

impl SqliteAssistDb {
    pub async fn connect(url: String) -> Result<SqliteAssistDb, AssistError> {
        let connection_options = SqliteConnectOptions::from_str(&url)
            .map_err(|err| AssistError::ConfigurationError {
                message: format!("Unable to interpret SQLite connection uri: {err}"),
            })?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await?;
        migrate!("./migrations/sqlite").run(&pool).await?;
        Ok(Self { pool })
    }
}

implement_assist_db!(SqliteAssistDb);

#[derive(Clone)]
struct PostgresAssistDb {
    pub pool: Pool<Postgres>,
}

impl PostgresAssistDb {
    pub async fn connect(url: String) -> Result<PostgresAssistDb, AssistError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(&url)
            .await?;
        migrate!("./migrations/postgres").run(&pool).await?;
        Ok(Self { pool })
    }
}

implement_assist_db!(PostgresAssistDb);

pub async fn connect_to_assist_db(url: String) -> Result<Box<dyn AssistDb>, AssistError> {
    if url.starts_with("sqlite") {
        Ok(Box::new(SqliteAssistDb::connect(url).await?))
    } else if url.starts_with("postgres") {
        Ok(Box::new(PostgresAssistDb::connect(url).await?))
    } else {
        Err(AssistError::ConfigurationError {
            message: format!(
                "Database type for {} is not supported (currently only SQLite and PostgreSQL)",
                url
            ),
        })
    }
}
