mod utils;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, StatusCode};
use actix_web::test;
use assist::forms::profile::FACEBOOK_URL_MESSAGE;
use assist::server::sessions::{decrypt_session, SESSION_COOKIE, SESSION_EXISTS_COOKIE};
use assist::server::ui_endpoints::USERNAME_TAKEN;
use assist::users::username_validation::INAPPROPRIATE_USERNAME_MESSAGE;
use std::fs;
use std::path::Path;
use utils::{multipart_file, noisy_png, png, TestEnv, BOUNDARY};

fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .expect("response has no Location header")
        .to_str()
        .unwrap()
        .to_string()
}

fn set_cookies<B>(resp: &ServiceResponse<B>) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

async fn body_text<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

#[actix_web::test]
async fn test_login_required_pages_redirect_to_auth() {
    let env = TestEnv::new().await;
    let app = test_app!(env);

    for uri in ["/users/settings", "/users/edit", "/users/edit/avatar"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{uri}");
        assert_eq!(
            location(&resp),
            format!("/users/auth?next={}", urlencoding::encode(uri))
        );
    }
}

#[actix_web::test]
async fn test_auth_and_legacy_login() {
    let env = TestEnv::new().await;
    let jane = env.create_user("jane").await;
    let app = test_app!(env);

    let req = test::TestRequest::get()
        .uri("/users/auth?next=/users/settings")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("%2Fusers%2Fsettings"));

    // Signed-in visitors skip the sign-in page.
    let req = test::TestRequest::get()
        .uri("/users/auth?next=/users/settings")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/users/settings");

    let req = test::TestRequest::get()
        .uri("/users/login?next=/user/jane")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&resp), "/users/auth?next=/user/jane");

    let req = test::TestRequest::post()
        .uri("/users/login")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/user/jane?fpa=1");
    assert!(set_cookies(&resp)
        .iter()
        .any(|cookie| cookie.starts_with(&format!("{SESSION_EXISTS_COOKIE}=1"))));

    let req = test::TestRequest::post().uri("/users/login").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/users/logout?next=//elsewhere.example")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/");
    assert!(set_cookies(&resp)[0].contains("Max-Age=0"));
}

#[actix_web::test]
async fn test_profile_lookup() {
    let env = TestEnv::new().await;
    let jane = env.create_user("jane").await;
    let mut gone = env.create_user("gone").await;
    gone.is_active = false;
    env.db.update_user(&gone).await.unwrap();
    let moderator = env.create_moderator("mod").await;
    let app = test_app!(env);

    let req = test::TestRequest::get().uri("/user/jane").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("<h1>jane</h1>"));

    let req = test::TestRequest::get()
        .uri(&format!("/user/{}", jane.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/user/jane");

    for uri in ["/user/nobody", "/user/9999", "/user/gone"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    // Moderators still see deactivated accounts.
    let req = test::TestRequest::get()
        .uri("/user/gone")
        .insert_header(("Cookie", env.session_cookie(moderator.id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_settings_are_saved_once_per_name() {
    let env = TestEnv::new().await;
    let jane = env.create_user("jane").await;
    let app = test_app!(env);

    // Every toggle starts out on.
    let req = test::TestRequest::get()
        .uri("/users/settings")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains(r#"name="forums_watch_new_thread" checked"#));
    assert!(body.contains("Send emails for private messages"));

    let req = test::TestRequest::post()
        .uri("/users/settings")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .set_form([("forums_watch_new_thread", "on")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/users/settings?saved=1");

    let settings = env.db.list_settings(jane.id).await.unwrap();
    assert_eq!(settings.len(), 6);
    let value_of = |settings: &[assist::assist_db::models::Setting], name: &str| {
        settings
            .iter()
            .find(|setting| setting.name == name)
            .map(|setting| setting.value.clone())
    };
    assert_eq!(value_of(&settings, "forums_watch_new_thread").as_deref(), Some("True"));
    assert_eq!(value_of(&settings, "email_private_messages").as_deref(), Some("False"));

    let req = test::TestRequest::post()
        .uri("/users/settings")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .set_form([("email_private_messages", "on")])
        .to_request();
    test::call_service(&app, req).await;

    let settings = env.db.list_settings(jane.id).await.unwrap();
    assert_eq!(settings.len(), 6);
    assert_eq!(value_of(&settings, "forums_watch_new_thread").as_deref(), Some("False"));
    assert_eq!(value_of(&settings, "email_private_messages").as_deref(), Some("True"));

    let req = test::TestRequest::get()
        .uri("/users/settings?saved=1")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Your settings have been saved."));
    assert!(body.contains(r#"name="email_private_messages" checked"#));
    assert!(!body.contains(r#"name="forums_watch_new_thread" checked"#));
}

#[actix_web::test]
async fn test_edit_profile() {
    let env = TestEnv::new().await;
    let jane = env.create_user("jane").await;
    let app = test_app!(env);

    let req = test::TestRequest::post()
        .uri("/users/edit")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .set_form([("facebook", "https://example.com/someuser")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(FACEBOOK_URL_MESSAGE));
    assert_eq!(env.db.get_profile(jane.id).await.unwrap().facebook, "");

    let req = test::TestRequest::post()
        .uri("/users/edit")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .set_form([
            ("name", "Jane Doe"),
            ("facebook", "https://facebook.com/someuser"),
            ("website", "example.org/jane"),
            ("timezone", "Europe/Paris"),
            ("public_email", "on"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/user/jane");

    // The new timezone is carried in the session.
    let cookie = set_cookies(&resp)
        .into_iter()
        .find(|cookie| cookie.starts_with(&format!("{SESSION_COOKIE}=")))
        .expect("session cookie was not updated");
    let token = cookie
        .split(';')
        .next()
        .unwrap()
        .trim_start_matches(&format!("{SESSION_COOKIE}="))
        .to_string();
    let session = decrypt_session(&token, &env.config.authentication).unwrap();
    assert_eq!(session.user_id, Some(jane.id));
    assert_eq!(session.timezone.as_deref(), Some("Europe/Paris"));

    let profile = env.db.get_profile(jane.id).await.unwrap();
    assert_eq!(profile.name, "Jane Doe");
    assert_eq!(profile.facebook, "https://facebook.com/someuser");
    assert_eq!(profile.website, "http://example.org/jane");
    assert!(profile.public_email);

    let req = test::TestRequest::get().uri("/user/jane").to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Jane Doe"));
    assert!(body.contains("jane@example.org"));
}

#[actix_web::test]
async fn test_migrated_profiles_keep_their_email_setting() {
    let env = TestEnv::new().await;
    let jane = env.create_user("jane").await;
    let mut profile = env.db.get_or_create_profile(jane.id).await.unwrap();
    profile.is_fxa_migrated = true;
    env.db.update_profile(&profile).await.unwrap();
    let app = test_app!(env);

    let req = test::TestRequest::get()
        .uri("/users/edit")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(!body.contains(r#"name="public_email""#));

    let req = test::TestRequest::post()
        .uri("/users/edit")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .set_form([("name", "Jane"), ("public_email", "on")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let profile = env.db.get_profile(jane.id).await.unwrap();
    assert_eq!(profile.name, "Jane");
    assert!(!profile.public_email);

    // Avatars come from the identity provider.
    let req = test::TestRequest::get()
        .uri("/users/edit/avatar")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_editing_someone_elses_profile() {
    let env = TestEnv::new().await;
    let jane = env.create_user("jane").await;
    let john = env.create_user("john").await;
    let moderator = env.create_moderator("mod").await;
    let app = test_app!(env);

    let req = test::TestRequest::get()
        .uri("/users/edit/jane")
        .insert_header(("Cookie", env.session_cookie(john.id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/users/edit/nobody")
        .insert_header(("Cookie", env.session_cookie(moderator.id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Editing yourself by name needs no permission.
    let req = test::TestRequest::get()
        .uri("/users/edit/john")
        .insert_header(("Cookie", env.session_cookie(john.id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/users/edit/jane")
        .insert_header(("Cookie", env.session_cookie(moderator.id)))
        .set_form([("bio", "Edited by a moderator"), ("timezone", "UTC")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/user/jane");
    // The moderator's own session is left alone.
    assert!(set_cookies(&resp).is_empty());
    assert_eq!(
        env.db.get_profile(jane.id).await.unwrap().bio,
        "Edited by a moderator"
    );
}

#[actix_web::test]
async fn test_avatar_upload_and_delete() {
    let env = TestEnv::new().await;
    let jane = env.create_user("jane").await;
    let app = test_app!(env);

    let req = test::TestRequest::post()
        .uri("/users/edit/avatar")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_file("avatar", "me.png", &png(300, 100)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/users/edit");

    let name = env.db.get_profile(jane.id).await.unwrap().avatar.unwrap();
    assert!(name.ends_with("-me.png.png"), "{name}");
    let stored = env.config.avatars.media_path.join("avatars").join(&name);
    let thumbnail = image::open(&stored).unwrap();
    assert_eq!((thumbnail.width(), thumbnail.height()), (200, 200));
    assert!(stored.starts_with(env.dir.path()));

    let req = test::TestRequest::get()
        .uri(&format!("/media/avatars/{name}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/users/avatar/delete")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/users/avatar/delete")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(env.db.get_profile(jane.id).await.unwrap().avatar, None);
    assert!(!stored.exists());
}

#[actix_web::test]
async fn test_oversized_avatar_is_rejected() {
    let env = TestEnv::with_config(|config| config.avatars.max_file_size = 10).await;
    let jane = env.create_user("jane").await;
    let app = test_app!(env);

    let req = test::TestRequest::post()
        .uri("/users/edit/avatar")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_file("avatar", "me.png", &png(64, 64)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp)
        .await
        .contains("Please upload an image smaller than 10 bytes."));
    assert_eq!(env.db.get_profile(jane.id).await.unwrap().avatar, None);
}

fn stored_avatars(media_path: &Path) -> Vec<String> {
    match fs::read_dir(media_path.join("avatars")) {
        Ok(entries) => entries
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[actix_web::test]
async fn test_avatar_body_over_the_limit_is_not_stored() {
    let env = TestEnv::with_config(|config| config.avatars.max_file_size = 1024).await;
    let jane = env.create_user("jane").await;
    let app = test_app!(env);

    let data = noisy_png(256, 256);
    assert!(data.len() > 64 * 1024);
    let req = test::TestRequest::post()
        .uri("/users/edit/avatar")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_file("avatar", "me.png", &data))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp)
        .await
        .contains("Please upload an image smaller than 1.0 KB."));
    assert_eq!(env.db.get_profile(jane.id).await.unwrap().avatar, None);
    assert!(stored_avatars(&env.config.avatars.media_path).is_empty());
}

#[actix_web::test]
async fn test_corrupted_avatar_keeps_the_current_one() {
    let env = TestEnv::new().await;
    let jane = env.create_user("jane").await;
    let app = test_app!(env);

    let upload = |data: Vec<u8>| {
        test::TestRequest::post()
            .uri("/users/edit/avatar")
            .insert_header(("Cookie", env.session_cookie(jane.id)))
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_file("avatar", "me.png", &data))
            .to_request()
    };

    let resp = test::call_service(&app, upload(png(64, 64))).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let name = env.db.get_profile(jane.id).await.unwrap().avatar.unwrap();

    let mut corrupted = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    corrupted.resize(64, 0);
    let resp = test::call_service(&app, upload(corrupted)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Upload a valid image."));

    assert_eq!(
        env.db.get_profile(jane.id).await.unwrap().avatar.as_deref(),
        Some(name.as_str())
    );
    assert_eq!(stored_avatars(&env.config.avatars.media_path), vec![name]);
}

#[actix_web::test]
async fn test_change_username() {
    let env = TestEnv::new().await;
    let jane = env.create_user("jane").await;
    env.create_user("taken").await;
    let app = test_app!(env);

    let attempts = [
        ("foo.bar", INAPPROPRIATE_USERNAME_MESSAGE),
        ("taken", USERNAME_TAKEN),
        ("a b c d", "Username may contain only English letters"),
        ("abc", "Username is too short (3 characters)"),
    ];
    for (username, message) in attempts {
        let req = test::TestRequest::post()
            .uri("/users/edit/username")
            .insert_header(("Cookie", env.session_cookie(jane.id)))
            .set_form([("username", username)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{username}");
        assert!(body_text(resp).await.contains(message), "{username}");
    }

    let req = test::TestRequest::post()
        .uri("/users/edit/username")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .set_form([("username", "jane.doe")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/user/jane.doe");
    assert_eq!(env.db.get_user_by_id(jane.id).await.unwrap().username, "jane.doe");
}

#[actix_web::test]
async fn test_deactivation() {
    let env = TestEnv::new().await;
    let jane = env.create_user("jane").await;
    let john = env.create_user("john").await;
    let moderator = env.create_moderator("mod").await;
    let app = test_app!(env);

    let req = test::TestRequest::post()
        .uri("/users/deactivate")
        .insert_header(("Cookie", env.session_cookie(john.id)))
        .set_form([("user_id", jane.id.to_string())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/users/deactivate")
        .insert_header(("Cookie", env.session_cookie(moderator.id)))
        .set_form([("user_id", jane.id.to_string())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/user/jane");
    assert!(!env.db.get_user_by_id(jane.id).await.unwrap().is_active);

    // Already deactivated.
    let req = test::TestRequest::post()
        .uri("/users/deactivate")
        .insert_header(("Cookie", env.session_cookie(moderator.id)))
        .set_form([("user_id", jane.id.to_string())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/users/deactivation_log")
        .insert_header(("Cookie", env.session_cookie(moderator.id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains(r#"<a href="/user/jane">jane</a>"#));
    assert!(!body.contains("Next"));

    let req = test::TestRequest::get()
        .uri("/users/deactivation_log")
        .insert_header(("Cookie", env.session_cookie(john.id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_deactivation_log_pages() {
    let env = TestEnv::new().await;
    let moderator = env.create_moderator("mod").await;
    for i in 0..30 {
        let user = env.create_user(&format!("user_{i:02}")).await;
        env.db.create_deactivation(user.id, moderator.id).await.unwrap();
    }
    let app = test_app!(env);

    let req = test::TestRequest::get()
        .uri("/users/deactivation_log")
        .insert_header(("Cookie", env.session_cookie(moderator.id)))
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert_eq!(body.matches("<tr>").count(), 1 + 25);
    assert!(body.contains("?page=2"));

    let req = test::TestRequest::get()
        .uri("/users/deactivation_log?page=2")
        .insert_header(("Cookie", env.session_cookie(moderator.id)))
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert_eq!(body.matches("<tr>").count(), 1 + 5);
    assert!(body.contains("?page=1"));
}

#[actix_web::test]
async fn test_close_account() {
    let env = TestEnv::new().await;
    let jane = env.create_user("jane").await;
    let mut profile = env.db.get_or_create_profile(jane.id).await.unwrap();
    profile.name = "Jane Doe".to_string();
    profile.timezone = "Europe/Paris".to_string();
    env.db.update_profile(&profile).await.unwrap();
    let app = test_app!(env);

    let req = test::TestRequest::post()
        .uri("/users/close_account")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(set_cookies(&resp)[0].contains("Max-Age=0"));

    let user = env.db.get_user_by_id(jane.id).await.unwrap();
    assert_eq!(user.username, format!("user{}", jane.id));
    assert_eq!(user.email, format!("{}@example.com", jane.id));
    assert!(!user.is_active);

    let profile = env.db.get_profile(jane.id).await.unwrap();
    assert_eq!(profile.name, "");
    assert_eq!(profile.timezone, "Europe/Paris");
    assert!(profile
        .fxa_uid
        .unwrap()
        .starts_with(&format!("{}-", jane.id)));

    // The old session no longer signs anyone in.
    let req = test::TestRequest::get()
        .uri("/users/settings")
        .insert_header(("Cookie", env.session_cookie(jane.id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn test_identity_provider_handoff() {
    let env = TestEnv::new().await;
    let app = test_app!(env);

    let req = test::TestRequest::get()
        .uri("/fxa/authenticate?is_contributor=True")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let target = url::Url::parse(&location(&resp)).unwrap();
    assert_eq!(
        target.as_str().split('?').next(),
        Some("https://accounts.example.org/authorization")
    );
    let query: Vec<(String, String)> = target.query_pairs().into_owned().collect();
    assert!(query.contains(&("response_type".to_string(), "code".to_string())));
    assert!(query.contains(&("client_id".to_string(), "assist".to_string())));
    let state = query
        .iter()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.clone())
        .unwrap();

    let cookie = set_cookies(&resp).remove(0);
    let token = cookie
        .split(';')
        .next()
        .unwrap()
        .trim_start_matches(&format!("{SESSION_COOKIE}="))
        .to_string();
    let session = decrypt_session(&token, &env.config.authentication).unwrap();
    assert!(session.is_contributor);
    assert_eq!(session.oidc_state, Some(state));

    for req in [
        test::TestRequest::get().uri("/fxa/logout").to_request(),
        test::TestRequest::post().uri("/fxa/logout").to_request(),
    ] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "https://accounts.example.org/logout");
    }
}
