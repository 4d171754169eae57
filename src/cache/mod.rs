// 缓存模块
// 包含键空间约定、会话存储以及笔记/用户的读穿透缓存

pub mod keys;
pub mod models;
pub mod operations;

// 重新导出常用类型，方便其他模块使用
pub use operations::{
    CachedNoteRepository, CachedUserRepository, DEFAULT_TTL, RedisSessionRepository,
};
