mod auth;
mod avatar;
mod edit_profile;
mod fxa;
mod log_in;
mod profile;
mod settings;
mod templates;
mod username;

pub use auth::{profile_url, signed_in_user};
pub use avatar::{
    avatar_file as avatar_file_endpoint, confirm_avatar_delete as confirm_avatar_delete_endpoint,
    delete_avatar_submit as delete_avatar_submit_endpoint, edit_avatar as edit_avatar_endpoint,
    edit_avatar_submit as edit_avatar_submit_endpoint,
};
pub use edit_profile::{
    edit_my_profile as edit_my_profile_endpoint,
    edit_my_profile_submit as edit_my_profile_submit_endpoint,
    edit_profile as edit_profile_endpoint, edit_profile_submit as edit_profile_submit_endpoint,
};
pub use fxa::{fxa_authenticate as fxa_authenticate_endpoint, fxa_logout as fxa_logout_endpoint};
pub use log_in::{
    login as login_endpoint, login_redirect as login_redirect_endpoint,
    logout as logout_endpoint, user_auth as user_auth_endpoint,
};
pub use profile::{
    close_account as close_account_endpoint, deactivate as deactivate_endpoint,
    deactivation_log as deactivation_log_endpoint, profile as profile_endpoint,
    DEACTIVATIONS_PER_PAGE,
};
pub use settings::{
    edit_settings as edit_settings_endpoint, edit_settings_submit as edit_settings_submit_endpoint,
};
pub use username::{
    edit_username as edit_username_endpoint, edit_username_submit as edit_username_submit_endpoint,
    USERNAME_TAKEN,
};
