use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use contact_portal::data::database::{Database, Store};
use contact_portal::presentation::flash::FLASH_COOKIE;
use contact_portal::presentation::handlers::AppState;
use contact_portal::presentation::middleware::RequestTracing;
use contact_portal::presentation::routes;
use contact_portal::presentation::session::{SESSION_COOKIE, SessionKeys};
use std::sync::Arc;

macro_rules! setup_auth_test {
    () => {{
        let accounts = Arc::new(Database::open_in_memory(Store::Accounts).unwrap());
        let contacts = Arc::new(Database::open_in_memory(Store::Contacts).unwrap());
        let sessions = SessionKeys::new("test-secret-key-for-auth-tests", 3600, false);
        let state = web::Data::new(AppState::new(accounts.clone(), contacts, sessions));

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .wrap(RequestTracing)
                .configure(routes::configure),
        )
        .await;

        (app, accounts)
    }};
}

macro_rules! signup {
    ($app:expr, $username:expr, $email:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/signup")
            .set_form([
                ("username", $username),
                ("firstname", "Test"),
                ("lastname", "User"),
                ("email", $email),
                ("password", $password),
            ])
            .to_request();
        test::call_service(&$app, req).await
    }};
}

macro_rules! login {
    ($app:expr, $username:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/login")
            .set_form([("username", $username), ("password", $password)])
            .to_request();
        test::call_service(&$app, req).await
    }};
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> Option<String> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn cookie<B>(resp: &actix_web::dev::ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

fn body_text(bytes: web::Bytes) -> String {
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[actix_web::test]
async fn test_full_signup_login_logout_flow() {
    let (app, _accounts) = setup_auth_test!();

    // Anonymous home redirects to login
    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some("/login"));

    // Signup redirects to login with a flash
    let resp = signup!(app, "alice", "alice@example.com", "password123");
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some("/login"));
    let flash = cookie(&resp, FLASH_COOKIE).expect("flash cookie");

    // Login page shows the flash once and clears it
    let req = test::TestRequest::get().uri("/login").cookie(flash).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = cookie(&resp, FLASH_COOKIE).expect("flash removal");
    assert_eq!(cleared.value(), "");
    let body = body_text(test::read_body(resp).await);
    assert!(body.contains("Account created. Please log in."));

    // Login sets the session and redirects home
    let resp = login!(app, "alice", "password123");
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some("/"));
    let session = cookie(&resp, SESSION_COOKIE).expect("session cookie");
    assert_eq!(session.http_only(), Some(true));

    let req = test::TestRequest::get().uri("/").cookie(session.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(test::read_body(resp).await);
    assert!(body.contains("Welcome, alice!"));

    // Logout removes the session cookie
    let req = test::TestRequest::get().uri("/logout").cookie(session).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some("/login"));
    let removed = cookie(&resp, SESSION_COOKIE).expect("session removal");
    assert_eq!(removed.value(), "");
    assert_eq!(
        removed.max_age(),
        Some(actix_web::cookie::time::Duration::ZERO)
    );
    assert!(cookie(&resp, FLASH_COOKIE).is_some());

    // Without the cookie the home page is gone again
    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn test_signup_duplicate_username() {
    let (app, _accounts) = setup_auth_test!();

    let resp = signup!(app, "bob", "bob@example.com", "pass1");
    assert_eq!(resp.status(), StatusCode::FOUND);

    let resp = signup!(app, "bob", "other@example.com", "pass2");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(test::read_body(resp).await);
    assert!(body.contains("Username already taken. Please choose a different one."));
}

#[actix_web::test]
async fn test_signup_duplicate_email() {
    let (app, accounts) = setup_auth_test!();

    signup!(app, "carol", "shared@example.com", "pass1");
    let resp = signup!(app, "carol2", "shared@example.com", "pass2");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(test::read_body(resp).await);
    assert!(body.contains("Email is already in use. Please use a different one."));

    let count: i64 = accounts
        .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
        .unwrap();
    assert_eq!(count, 1);
}

#[actix_web::test]
async fn test_signup_validation_keeps_input() {
    let (app, _accounts) = setup_auth_test!();

    let resp = signup!(app, "dave", "not-an-email", "secretpw");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(test::read_body(resp).await);
    assert!(body.contains("Please enter a valid email address."));
    assert!(body.contains(r#"value="dave""#));
    assert!(!body.contains("secretpw"));
}

#[actix_web::test]
async fn test_login_wrong_password() {
    let (app, _accounts) = setup_auth_test!();

    signup!(app, "erin", "erin@example.com", "correct");
    let resp = login!(app, "erin", "wrong");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(cookie(&resp, SESSION_COOKIE).is_none());
    let body = body_text(test::read_body(resp).await);
    assert!(body.contains("Invalid credentials, please try again."));
    assert!(body.contains(r#"value="erin""#));
}

#[actix_web::test]
async fn test_login_nonexistent_user() {
    let (app, _accounts) = setup_auth_test!();

    let resp = login!(app, "nobody", "password");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(cookie(&resp, SESSION_COOKIE).is_none());
    let body = body_text(test::read_body(resp).await);
    assert!(body.contains("Invalid credentials, please try again."));
}

#[actix_web::test]
async fn test_forged_session_cookie_is_ignored() {
    let (app, _accounts) = setup_auth_test!();

    let forged = SessionKeys::new("some-other-secret", 3600, false)
        .issue("admin")
        .unwrap();
    let req = test::TestRequest::get().uri("/").cookie(forged).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some("/login"));

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(Cookie::new(SESSION_COOKIE, "garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn test_password_not_stored_in_plain_text() {
    let (app, accounts) = setup_auth_test!();

    let password = "sensitive_password_123";
    signup!(app, "frank", "frank@example.com", password);

    let stored: String = accounts
        .with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT password FROM users WHERE username = ?1",
                ["frank"],
                |r| r.get(0),
            )?)
        })
        .unwrap();
    assert_ne!(stored, password);
    assert!(stored.starts_with("$argon2id$"));

    // But login should still work
    let resp = login!(app, "frank", password);
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(cookie(&resp, SESSION_COOKIE).is_some());
}

#[actix_web::test]
async fn test_accounts_store_is_separate_from_contacts() {
    let (app, accounts) = setup_auth_test!();

    signup!(app, "grace", "grace@example.com", "pw");

    let has_contacts: i64 = accounts
        .with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'contacts'",
                [],
                |r| r.get(0),
            )?)
        })
        .unwrap();
    assert_eq!(has_contacts, 0);
}

#[actix_web::test]
async fn test_login_with_padded_username_as_typed_at_signup() {
    let (app, _accounts) = setup_auth_test!();

    let resp = signup!(app, "alice ", "alice@example.com", "password123");
    assert_eq!(resp.status(), StatusCode::FOUND);

    let resp = login!(app, "alice ", "password123");
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some("/"));
    let session = cookie(&resp, SESSION_COOKIE).expect("session cookie");

    let req = test::TestRequest::get().uri("/").cookie(session).to_request();
    let resp = test::call_service(&app, req).await;
    let body = body_text(test::read_body(resp).await);
    assert!(body.contains("Welcome, alice!"));
}

#[actix_web::test]
async fn test_signup_write_failure_rolls_back_with_generic_flash() {
    let (app, accounts) = setup_auth_test!();
    accounts
        .with_conn(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_users BEFORE INSERT ON users
                 BEGIN SELECT RAISE(ABORT, 'users table is read-only'); END;",
            )?;
            Ok(())
        })
        .unwrap();

    let resp = signup!(app, "kim", "kim@example.com", "pw");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(cookie(&resp, FLASH_COOKIE).is_none());
    let body = body_text(test::read_body(resp).await);
    assert!(body.contains("Error! Account not created. Please try again."));
    assert!(!body.contains("read-only"));
    assert!(body.contains(r#"value="kim""#));

    let count: i64 = accounts
        .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
        .unwrap();
    assert_eq!(count, 0);
}
