use uuid::Uuid;

/// 单个会话记录键前缀
const SESSION_PREFIX: &str = "session:";

/// 用户会话列表键前缀
const USER_SESSIONS_PREFIX: &str = "session:user:";

/// 单个会话的哈希键
pub fn session_key(session_id: Uuid) -> String {
    format!("{}{}", SESSION_PREFIX, session_id)
}

/// 用户会话 ID 列表键，最新的在表头
pub fn user_sessions_key(user_id: Uuid) -> String {
    format!("{}{}", USER_SESSIONS_PREFIX, user_id)
}
