mod common;

use chrono::{Duration, Utc};
use std::error::Error;
use task_core::{RefreshToken, Role};

use api::AuthError;
use api::auth::jwt::hash_refresh_token;
use common::manager;
use db::repositories::RefreshTokenRepository;

#[tokio::test]
async fn register_then_authenticate() -> Result<(), Box<dyn Error>> {
    let m = manager().await?;

    let session = m.auth.register("alice", "pw-alice-123", "alice@example.com").await?;
    assert_eq!(session.username, "alice");
    assert_eq!(session.roles, vec![Role::User]);

    let claims = m.auth.verify_access_token(&session.access_token)?;
    assert_eq!(claims.sub, session.user_id.to_string());
    assert_eq!(claims.name, "alice");
    assert_eq!(claims.roles, vec!["user"]);

    let again = m.auth.authenticate("alice", "pw-alice-123").await?;
    assert_eq!(again.user_id, session.user_id);
    assert_ne!(again.refresh_token, session.refresh_token);

    assert!(matches!(
        m.auth.authenticate("alice", "wrong").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        m.auth.authenticate("nobody", "pw-alice-123").await,
        Err(AuthError::InvalidCredentials)
    ));
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_is_rejected() -> Result<(), Box<dyn Error>> {
    let m = manager().await?;

    m.auth.register("bob", "first-password", "bob@example.com").await?;
    let second = m.auth.register("bob", "second-password", "other@example.com").await;
    assert!(matches!(second, Err(AuthError::UsernameTaken(name)) if name == "bob"));
    Ok(())
}

#[tokio::test]
async fn refresh_rotates_the_token() -> Result<(), Box<dyn Error>> {
    let m = manager().await?;
    let first = m.auth.register("carol", "carol-password", "carol@example.com").await?;

    let second = m.auth.refresh(&first.refresh_token).await?;
    assert_eq!(second.user_id, first.user_id);
    assert_ne!(second.refresh_token, first.refresh_token);

    // A rotated token cannot be replayed.
    assert!(matches!(
        m.auth.refresh(&first.refresh_token).await,
        Err(AuthError::Unauthorized)
    ));
    m.auth.refresh(&second.refresh_token).await?;

    assert!(matches!(m.auth.refresh("made-up").await, Err(AuthError::Unauthorized)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_refreshes_of_one_token_open_one_session() -> Result<(), Box<dyn Error>> {
    let m = manager().await?;
    let session = m.auth.register("zed", "zed-password", "zed@example.com").await?;

    let (first, second) = tokio::join!(
        m.auth.refresh(&session.refresh_token),
        m.auth.refresh(&session.refresh_token)
    );
    assert_eq!(
        [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
        1,
        "a refresh token is single-use"
    );

    let rotated = first.or(second)?;
    assert_eq!(rotated.user_id, session.user_id);
    assert!(matches!(
        m.auth.refresh(&session.refresh_token).await,
        Err(AuthError::Unauthorized)
    ));
    m.auth.refresh(&rotated.refresh_token).await?;
    Ok(())
}

#[tokio::test]
async fn expired_refresh_token_is_consumed_and_rejected() -> Result<(), Box<dyn Error>> {
    let m = manager().await?;
    let session = m.auth.register("dave", "dave-password", "dave@example.com").await?;
    let tokens = RefreshTokenRepository::new(m.db.clone());

    let hash = hash_refresh_token("stale-token");
    tokens
        .create(&RefreshToken::new(
            hash.clone(),
            session.user_id,
            Utc::now() - Duration::minutes(1),
        ))
        .await?;

    assert!(matches!(m.auth.refresh("stale-token").await, Err(AuthError::Unauthorized)));
    assert!(tokens.get_by_hash(&hash).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn only_token_hashes_are_stored() -> Result<(), Box<dyn Error>> {
    let m = manager().await?;
    let session = m.auth.register("erin", "erin-password", "erin@example.com").await?;
    let tokens = RefreshTokenRepository::new(m.db.clone());

    assert!(tokens.get_by_hash(&session.refresh_token).await?.is_none());
    let stored = tokens
        .get_by_hash(&hash_refresh_token(&session.refresh_token))
        .await?
        .ok_or("refresh token hash missing")?;
    assert_eq!(stored.user_id, session.user_id);

    m.auth.logout(&session.refresh_token).await?;
    assert!(matches!(
        m.auth.refresh(&session.refresh_token).await,
        Err(AuthError::Unauthorized)
    ));
    Ok(())
}

#[tokio::test]
async fn tampered_access_token_is_unauthorized() -> Result<(), Box<dyn Error>> {
    let m = manager().await?;
    let session = m.auth.register("frank", "frank-password", "frank@example.com").await?;

    let tampered = format!("{}x", session.access_token);
    assert!(matches!(
        m.auth.verify_access_token(&tampered),
        Err(AuthError::Unauthorized)
    ));
    Ok(())
}
