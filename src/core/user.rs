//! User business logic.

use crate::auth::Session;
use crate::core::access;
use crate::entities::{User, UserColumn, enums::Role, user};
use crate::errors::{Error, Result};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Creates a user. Email is the login identity and must be unique.
pub async fn create_user<C>(
    db: &C,
    name: String,
    email: String,
    role: Role,
    organization: Option<String>,
) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "User name cannot be empty".to_string(),
        });
    }
    if !email.contains('@') {
        return Err(Error::Config {
            message: format!("Invalid email address: {email}"),
        });
    }

    let user = user::ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email.trim().to_lowercase()),
        role: Set(role),
        organization: Set(organization),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = user.insert(db).await?;
    Ok(result)
}

/// Finds a user by primary key.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by login email.
pub async fn get_user_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(UserColumn::Email.eq(email))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every user, ordered by name. Staff only.
pub async fn list_users(db: &DatabaseConnection, session: &Session) -> Result<Vec<user::Model>> {
    access::require_staff(session, "Listing users")?;
    User::find()
        .order_by_asc(UserColumn::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_user_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_user(&db, "  ".to_string(), "a@b.c".to_string(), Role::Client, None)
            .await;
        assert!(matches!(result, Err(Error::Config { .. })));

        let result =
            create_user(&db, "Ana".to_string(), "not-an-email".to_string(), Role::Client, None)
                .await;
        assert!(matches!(result, Err(Error::Config { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_email_normalized_and_looked_up() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_user(
            &db,
            "Ana".to_string(),
            "Ana@Example.COM ".to_string(),
            Role::Client,
            None,
        )
        .await;
        let user = user?;
        assert_eq!(user.email, "ana@example.com");

        let found = get_user_by_email(&db, "ana@example.com").await?;
        assert_eq!(found.unwrap().id, user.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_users_staff_only() -> Result<()> {
        let db = setup_test_db().await?;
        let staff = create_test_user(&db, "Dana", "dana@example.com", Role::Staff).await?;
        let client = create_test_user(&db, "Ana", "ana@example.com", Role::Client).await?;

        let listed = list_users(&db, &session_for(&staff)).await?;
        assert_eq!(listed.len(), 2);

        let result = list_users(&db, &session_for(&client)).await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
        Ok(())
    }
}
