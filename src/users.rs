pub mod avatars;
pub mod blacklist;
pub mod settings;
pub mod username_validation;
