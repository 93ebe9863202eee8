//! Role-scoped visibility rules shared by every list-style read.
//!
//! Admin and staff see everything. Clients and partners see conversations
//! they participate in; shipments and documents inherit visibility from
//! their owning conversation.

use crate::auth::Session;
use crate::entities::conversation;
use crate::errors::{Error, Result};

/// Whether the caller may read a conversation (and, transitively, the
/// shipment and documents attached to it).
#[must_use]
pub fn can_view_conversation(session: &Session, conversation: &conversation::Model) -> bool {
    session.role.is_staff() || conversation.has_participant(session.user_id)
}

/// Fails with [`Error::Unauthorized`] unless the caller holds a staff role.
pub fn require_staff(session: &Session, operation: &str) -> Result<()> {
    if session.role.is_staff() {
        Ok(())
    } else {
        Err(Error::Unauthorized {
            message: format!("{operation} requires an admin or staff role"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::enums::{ConversationKind, Role};
    use chrono::Utc;

    fn conversation_with(participants: &[i64]) -> conversation::Model {
        conversation::Model {
            id: 1,
            title: "t".to_string(),
            kind: ConversationKind::Client,
            participant_ids: serde_json::json!(participants),
            last_message_at: Utc::now(),
            created_at: Utc::now(),
        }
    }

    fn session(user_id: i64, role: Role) -> Session {
        Session { user_id, role }
    }

    #[test]
    fn test_staff_see_everything() {
        let convo = conversation_with(&[10, 11]);
        assert!(can_view_conversation(&session(99, Role::Admin), &convo));
        assert!(can_view_conversation(&session(99, Role::Staff), &convo));
    }

    #[test]
    fn test_participants_see_their_conversations() {
        let convo = conversation_with(&[10, 11]);
        assert!(can_view_conversation(&session(10, Role::Client), &convo));
        assert!(can_view_conversation(&session(11, Role::Partner), &convo));
        assert!(!can_view_conversation(&session(12, Role::Client), &convo));
    }

    #[test]
    fn test_malformed_participants_fail_closed() {
        let mut convo = conversation_with(&[]);
        convo.participant_ids = serde_json::json!("not-an-array");
        assert!(!can_view_conversation(&session(10, Role::Client), &convo));
        assert!(can_view_conversation(&session(10, Role::Admin), &convo));
    }

    #[test]
    fn test_require_staff() {
        assert!(require_staff(&session(1, Role::Staff), "listing").is_ok());
        assert!(matches!(
            require_staff(&session(1, Role::Client), "listing"),
            Err(Error::Unauthorized { .. })
        ));
    }
}
