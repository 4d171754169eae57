/// 缓存数据模型
/// 会话以 Redis 哈希存储，笔记与用户以 JSON 快照存储
pub mod session;

pub use session::{session_fields, session_from_fields};
