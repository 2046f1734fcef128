use assist::assist_db::db_interfaces::{connect_to_assist_db, AssistDb};
use assist::assist_db::models::{InstantiatedUser, User};
use assist::server::config::{default_server_config, AssistConfig};
use assist::server::sessions::{encrypt_session, Session};
use std::fs;
use tempfile::TempDir;

pub const BLACKLIST: &str = "badword\nfoo\n";

// Everything a test server needs, rooted in a scratch directory that is
// removed when the environment is dropped.
pub struct TestEnv {
    pub dir: TempDir,
    pub config: AssistConfig,
    pub db: Box<dyn AssistDb>,
}

impl TestEnv {
    pub async fn new() -> TestEnv {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut AssistConfig)) -> TestEnv {
        let dir = tempfile::tempdir().expect("unable to create scratch directory");
        let mut config = default_server_config();
        config.database_url = format!("sqlite://{}/assist.sqlite", dir.path().display());
        config.avatars.media_path = dir.path().join("media");
        config.users.username_blacklist = dir.path().join("username-blacklist.txt");
        fs::write(&config.users.username_blacklist, BLACKLIST).expect("unable to write blacklist");
        customize(&mut config);

        let db = connect_to_assist_db(config.database_url.clone())
            .await
            .expect("unable to connect to test database");
        TestEnv { dir, config, db }
    }

    pub async fn create_user(&self, username: &str) -> InstantiatedUser {
        self.db
            .create_user(&User::new(username, &format!("{username}@example.org")))
            .await
            .expect("unable to create user")
    }

    pub async fn create_moderator(&self, username: &str) -> InstantiatedUser {
        let user = User {
            can_change_profiles: true,
            can_deactivate_users: true,
            ..User::new(username, &format!("{username}@example.org"))
        };
        self.db.create_user(&user).await.expect("unable to create moderator")
    }

    /// A `Cookie` header value signing in as `user_id`.
    pub fn session_cookie(&self, user_id: i32) -> String {
        let token = encrypt_session(&Session::for_user(user_id), &self.config.authentication)
            .expect("unable to encrypt session");
        format!("session={token}")
    }
}

// Builds the full application around a `TestEnv`, with the same shared
// state the server runner installs.
#[macro_export]
macro_rules! test_app {
    ($env:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(dyn_clone::clone_box(&*$env.db)))
                .app_data(actix_web::web::Data::new($env.config.clone()))
                .app_data(actix_web::web::Data::new(
                    assist::users::avatars::AvatarStorage::new(&$env.config.avatars.media_path),
                ))
                .app_data(actix_web::web::Data::new(
                    assist::users::blacklist::BlacklistCache::from_file(
                        &$env.config.users.username_blacklist,
                        $env.config.users.blacklist_ttl(),
                    ),
                ))
                .app_data(actix_web::web::Data::<
                    Box<dyn assist::users::avatars::Thumbnailer>,
                >::new(Box::new(
                    assist::users::avatars::ImageThumbnailer,
                )))
                .configure(assist::server::server_runner::config),
        )
        .await
    };
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([20, 120, 220, 255]));
    let mut bytes: Vec<u8> = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("unable to encode png");
    bytes
}

// Pixels from a small LCG so the encoded PNG stays large.
pub fn noisy_png(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 2024;
    let img = image::RgbaImage::from_fn(width, height, |_, _| {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        let [r, g, b, _] = state.to_be_bytes();
        image::Rgba([r, g, b, 255])
    });
    let mut bytes: Vec<u8> = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("unable to encode png");
    bytes
}

pub const BOUNDARY: &str = "assist-test-boundary";

pub fn multipart_file(field: &str, file_name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
         filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}
