use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{Value, json};

#[path = "support/mod.rs"]
mod support;
use support::{ADMIN_EMAIL, TEST_PASSWORD, TestApp, bearer};

use reelshelf_server::routes::paths::v1;

#[tokio::test]
async fn health_is_public() -> Result<()> {
    let app = TestApp::new().await?;
    let response = app.server.get(v1::HEALTH).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn registration_starts_unconfirmed_with_default_role() -> Result<()> {
    let app = TestApp::new().await?;
    let body = app.register("Alice@Example.com", "alice").await;

    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["confirmed"], false);
    assert_eq!(body["role"], "User");
    assert_eq!(body["remaining_quota"], 7);
    assert_eq!(body["permissions"], json!(["BORROW", "RETURN"]));
    assert_eq!(app.notifier.count(), 1);
    Ok(())
}

#[tokio::test]
async fn admin_address_registers_as_administrator() -> Result<()> {
    let app = TestApp::new().await?;
    let body = app.register(ADMIN_EMAIL, "admin").await;

    assert_eq!(body["role"], "Administrator");
    assert_eq!(
        body["permissions"],
        json!(["BORROW", "RETURN", "MODERATE_MOVIE", "ADMINISTER"])
    );
    Ok(())
}

#[tokio::test]
async fn invalid_and_duplicate_registrations_are_rejected() -> Result<()> {
    let app = TestApp::new().await?;
    app.register("alice@example.com", "alice").await;

    let duplicate = app
        .server
        .post(v1::auth::REGISTER)
        .json(&json!({
            "email": "ALICE@example.com",
            "username": "alice2",
            "password": TEST_PASSWORD,
        }))
        .await;
    duplicate.assert_status(StatusCode::CONFLICT);

    let bad_email = app
        .server
        .post(v1::auth::REGISTER)
        .json(&json!({
            "email": "not-an-email",
            "username": "bob",
            "password": TEST_PASSWORD,
        }))
        .await;
    bad_email.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = bad_email.json();
    assert_eq!(body["error"]["status"], 400);

    let short_password = app
        .server
        .post(v1::auth::REGISTER)
        .json(&json!({
            "email": "bob@example.com",
            "username": "bob",
            "password": "short",
        }))
        .await;
    short_password.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn login_issues_bearer_token() -> Result<()> {
    let app = TestApp::new().await?;
    app.register("alice@example.com", "alice").await;

    let response = app
        .server
        .post(v1::auth::TOKEN)
        .json(&json!({ "email": "alice@example.com", "password": TEST_PASSWORD }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["expiration"], 3600);

    let token = body["token"].as_str().unwrap();
    let me = app
        .server
        .get(v1::users::CURRENT)
        .add_header("Authorization", bearer(token))
        .await;
    me.assert_status_ok();
    assert_eq!(me.json::<Value>()["user"]["username"], "alice");
    Ok(())
}

#[tokio::test]
async fn bad_credentials_and_tokens_are_unauthorized() -> Result<()> {
    let app = TestApp::new().await?;
    app.register("alice@example.com", "alice").await;

    app.server
        .post(v1::auth::TOKEN)
        .json(&json!({ "email": "alice@example.com", "password": "wrong password" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .post(v1::auth::TOKEN)
        .json(&json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .get(v1::users::CURRENT)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .get(v1::users::CURRENT)
        .add_header("Authorization", bearer("garbage.token"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn confirmation_marks_account_confirmed() -> Result<()> {
    let app = TestApp::new().await?;
    app.register("alice@example.com", "alice").await;
    let token = app.login("alice@example.com", TEST_PASSWORD).await;
    let confirm = app.notifier.last_token_for("alice@example.com").unwrap();

    let response = app
        .server
        .post(v1::auth::CONFIRM)
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "token": confirm }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["confirmed"], true);

    // Resending for a confirmed account sends nothing new.
    let before = app.notifier.count();
    app.server
        .post(v1::auth::CONFIRM_RESEND)
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status(StatusCode::ACCEPTED);
    assert_eq!(app.notifier.count(), before);
    Ok(())
}

#[tokio::test]
async fn confirmation_token_is_bound_to_its_account() -> Result<()> {
    let app = TestApp::new().await?;
    app.register("alice@example.com", "alice").await;
    app.register("bob@example.com", "bob").await;
    let alice_confirm = app.notifier.last_token_for("alice@example.com").unwrap();
    let bob = app.login("bob@example.com", TEST_PASSWORD).await;

    let response = app
        .server
        .post(v1::auth::CONFIRM)
        .add_header("Authorization", bearer(&bob))
        .json(&json!({ "token": alice_confirm }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let tampered = app
        .server
        .post(v1::auth::CONFIRM)
        .add_header("Authorization", bearer(&bob))
        .json(&json!({ "token": "definitely.not-a-token" }))
        .await;
    tampered.assert_status(StatusCode::BAD_REQUEST);

    let me = app
        .server
        .get(v1::users::CURRENT)
        .add_header("Authorization", bearer(&bob))
        .await;
    assert_eq!(me.json::<Value>()["user"]["confirmed"], false);
    Ok(())
}

#[tokio::test]
async fn password_change_requires_old_password() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.confirmed_user("alice@example.com", "alice").await;

    app.server
        .post(v1::auth::PASSWORD_CHANGE)
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "old_password": "wrong password", "new_password": "brand new secret" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .post(v1::auth::PASSWORD_CHANGE)
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "old_password": TEST_PASSWORD, "new_password": "brand new secret" }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.login("alice@example.com", "brand new secret").await;
    Ok(())
}

#[tokio::test]
async fn password_reset_flow() -> Result<()> {
    let app = TestApp::new().await?;
    app.register("alice@example.com", "alice").await;
    let sent = app.notifier.count();

    app.server
        .post(v1::auth::PASSWORD_RESET_REQUEST)
        .json(&json!({ "email": "nobody@example.com" }))
        .await
        .assert_status(StatusCode::ACCEPTED);
    assert_eq!(app.notifier.count(), sent);

    app.server
        .post(v1::auth::PASSWORD_RESET_REQUEST)
        .json(&json!({ "email": "alice@example.com" }))
        .await
        .assert_status(StatusCode::ACCEPTED);
    let reset = app.notifier.last_token_for("alice@example.com").unwrap();

    app.server
        .post(v1::auth::PASSWORD_RESET)
        .json(&json!({
            "email": "alice@example.com",
            "token": "bogus",
            "new_password": "reset password 1",
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .post(v1::auth::PASSWORD_RESET)
        .json(&json!({
            "email": "alice@example.com",
            "token": reset,
            "new_password": "reset password 1",
        }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.login("alice@example.com", "reset password 1").await;
    Ok(())
}

#[tokio::test]
async fn email_change_applies_the_new_address() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.confirmed_user("alice@example.com", "alice").await;
    app.register("bob@example.com", "bob").await;

    app.server
        .post(v1::auth::EMAIL_CHANGE_REQUEST)
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "new_email": "bob@example.com", "password": TEST_PASSWORD }))
        .await
        .assert_status(StatusCode::CONFLICT);

    app.server
        .post(v1::auth::EMAIL_CHANGE_REQUEST)
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "new_email": "alice@new.example.com", "password": TEST_PASSWORD }))
        .await
        .assert_status(StatusCode::ACCEPTED);
    let change = app
        .notifier
        .last_token_for("alice@new.example.com")
        .expect("notice goes to the new address");

    let response = app
        .server
        .post(v1::auth::EMAIL_CHANGE)
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "token": change }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["email"], "alice@new.example.com");

    app.login("alice@new.example.com", TEST_PASSWORD).await;
    Ok(())
}

#[tokio::test]
async fn profiles_are_visible_only_to_their_owner() -> Result<()> {
    let app = TestApp::new().await?;
    let alice = app.confirmed_user("alice@example.com", "alice").await;
    app.register("bob@example.com", "bob").await;

    let own = app
        .server
        .get("/api/v1/users/alice")
        .add_header("Authorization", bearer(&alice))
        .await;
    own.assert_status_ok();
    assert_eq!(own.json::<Value>()["username"], "alice");

    app.server
        .get("/api/v1/users/bob")
        .add_header("Authorization", bearer(&alice))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    Ok(())
}
