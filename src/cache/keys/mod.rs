/// 缓存键模块
/// 每类实体使用独立前缀，删除一个键不会影响其他实体
pub mod note_keys;
pub mod session_keys;
pub mod user_keys;

pub use note_keys::{note_key, user_notes_key};
pub use session_keys::{session_key, user_sessions_key};
pub use user_keys::{user_key, user_login_key};

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn keys_follow_the_documented_layout() {
        let id = Uuid::parse_str("6b30e5df-5add-42e1-be60-62b6f98afab1").unwrap();

        assert_eq!(session_key(id), format!("session:{id}"));
        assert_eq!(user_sessions_key(id), format!("session:user:{id}"));
        assert_eq!(note_key(id), format!("note:{id}"));
        assert_eq!(user_notes_key(id), format!("note:user:{id}"));
        assert_eq!(user_key(id), format!("user:{id}"));
        assert_eq!(user_login_key("alice"), "user:login:alice");
    }

    #[test]
    fn entity_kinds_never_share_a_key() {
        let id = Uuid::new_v4();
        let keys = [
            session_key(id),
            user_sessions_key(id),
            note_key(id),
            user_notes_key(id),
            user_key(id),
            user_login_key(&id.to_string()),
        ];

        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn collection_keys_cannot_alias_an_entity_key() {
        // an entity key's suffix is always a uuid, which never starts with "user:"
        let user_id = Uuid::new_v4();
        let collection = user_notes_key(user_id);
        let suffix = collection.strip_prefix("note:").unwrap();
        assert!(Uuid::parse_str(suffix).is_err());

        let logins = user_login_key("bob");
        let suffix = logins.strip_prefix("user:").unwrap();
        assert!(Uuid::parse_str(suffix).is_err());
    }
}
