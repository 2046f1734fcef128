use crate::assist_db::db_interfaces::connect_to_assist_db;
use crate::server::config::read_config;
use crate::server::ui_endpoints;
use crate::users::avatars::{AvatarStorage, ImageThumbnailer, Thumbnailer};
use crate::users::blacklist::BlacklistCache;
use actix_web::{middleware, web, App, HttpServer};
use dyn_clone::clone_box;
use log::info;
use std::fs;
use std::path::Path;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(ui_endpoints::user_auth_endpoint)
        .service(ui_endpoints::login_redirect_endpoint)
        .service(ui_endpoints::login_endpoint)
        .service(ui_endpoints::logout_endpoint)
        .service(ui_endpoints::profile_endpoint)
        .service(ui_endpoints::close_account_endpoint)
        .service(ui_endpoints::deactivate_endpoint)
        .service(ui_endpoints::deactivation_log_endpoint)
        .service(ui_endpoints::edit_settings_endpoint)
        .service(ui_endpoints::edit_settings_submit_endpoint)
        .service(ui_endpoints::edit_my_profile_endpoint)
        .service(ui_endpoints::edit_my_profile_submit_endpoint)
        // The fixed /users/edit/... pages go before the per-username one.
        .service(ui_endpoints::edit_avatar_endpoint)
        .service(ui_endpoints::edit_avatar_submit_endpoint)
        .service(ui_endpoints::edit_username_endpoint)
        .service(ui_endpoints::edit_username_submit_endpoint)
        .service(ui_endpoints::edit_profile_endpoint)
        .service(ui_endpoints::edit_profile_submit_endpoint)
        .service(ui_endpoints::confirm_avatar_delete_endpoint)
        .service(ui_endpoints::delete_avatar_submit_endpoint)
        .service(ui_endpoints::avatar_file_endpoint)
        .service(ui_endpoints::fxa_authenticate_endpoint)
        .service(ui_endpoints::fxa_logout_endpoint);
}

pub async fn run_server(config_path: &Path) -> std::io::Result<()> {
    env_logger::init();

    let assist_conf = read_config(config_path)
        .unwrap_or_else(|e| panic!("unable to read assist.toml configuration file: {e}"));
    let storage = AvatarStorage::new(&assist_conf.avatars.media_path);
    fs::create_dir_all(storage.root()).expect("unable to create avatar directory");
    let assist_db = connect_to_assist_db(assist_conf.database_url.clone())
        .await
        .expect("unable to connect to assist database");

    // Shared by every worker so the word list is read once per expiry.
    let blacklist = web::Data::new(BlacklistCache::from_file(
        &assist_conf.users.username_blacklist,
        assist_conf.users.blacklist_ttl(),
    ));
    let thumbnailer: web::Data<Box<dyn Thumbnailer>> = web::Data::new(Box::new(ImageThumbnailer));

    info!("Starting server {}:{}...", assist_conf.host, assist_conf.port);
    let assist_conf_for_server = assist_conf.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(clone_box(&*assist_db)))
            .app_data(web::Data::new(assist_conf_for_server.clone()))
            .app_data(web::Data::new(storage.clone()))
            .app_data(blacklist.clone())
            .app_data(thumbnailer.clone())
            .configure(config)
    })
    .bind((assist_conf.host, assist_conf.port))?
    .run()
    .await
}
