//! Signed session tokens.
//!
//! Role and user id are never taken from request parameters: `login` looks a
//! user up by email (there are no passwords to check; hashing is out of
//! scope) and issues an HS256 token carrying both. Every protected handler
//! verifies the token and works from the resulting [`Session`].

use crate::entities::enums::Role;
use crate::entities::{User, UserColumn, user};
use crate::errors::{Error, Result};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Token lifetime in days.
const TOKEN_TTL_DAYS: u64 = 7;

/// JWT claims: subject user id, server-derived role, expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub role: Role,
    pub exp: usize,
}

/// Verified caller identity, derived from a valid token.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub user_id: i64,
    pub role: Role,
}

/// Issues a signed session token for a user.
pub fn issue_token(user: &user::Model, secret: &str) -> Result<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::Config {
            message: format!("System clock before Unix epoch: {e}"),
        })?
        .as_secs() as usize;

    let claims = Claims {
        sub: user.id,
        role: user.role,
        exp: now + (TOKEN_TTL_DAYS * 24 * 60 * 60) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(Into::into)
}

/// Verifies a session token and returns the caller's [`Session`].
///
/// # Errors
/// Returns [`Error::Unauthorized`] for missing/expired/tampered tokens.
pub fn verify_token(token: &str, secret: &str) -> Result<Session> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| {
        debug!("Token verification failed: {e}");
        Error::Unauthorized {
            message: "Invalid or expired session token".to_string(),
        }
    })?;

    Ok(Session {
        user_id: data.claims.sub,
        role: data.claims.role,
    })
}

/// Looks a user up by email and issues a token.
///
/// Lookup-only by design: password hashing is an explicit non-goal, but the
/// role embedded in the token always comes from the user row, never from
/// the caller.
pub async fn login(
    db: &DatabaseConnection,
    email: &str,
    secret: &str,
) -> Result<(String, user::Model)> {
    let user = User::find()
        .filter(UserColumn::Email.eq(email))
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            ident: email.to_string(),
        })?;

    let token = issue_token(&user, secret)?;
    Ok((token, user))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_token_round_trip() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Ana", "ana@example.com", Role::Client).await?;

        let token = issue_token(&user, "secret")?;
        let session = verify_token(&token, "secret")?;

        assert_eq!(session.user_id, user.id);
        assert_eq!(session.role, Role::Client);
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Ana", "ana@example.com", Role::Admin).await?;

        let token = issue_token(&user, "secret")?;
        let result = verify_token(&token, "other-secret");
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let result = verify_token("not-a-token", "secret");
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_login_unknown_email() -> Result<()> {
        let db = setup_test_db().await?;
        let result = login(&db, "ghost@example.com", "secret").await;
        assert!(matches!(result, Err(Error::UserNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_login_issues_usable_token() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "Dana", "dana@example.com", Role::Staff).await?;

        let (token, user) = login(&db, "dana@example.com", "secret").await?;
        let session = verify_token(&token, "secret")?;
        assert_eq!(session.user_id, user.id);
        assert!(session.role.is_staff());
        Ok(())
    }
}
