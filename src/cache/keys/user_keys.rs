use uuid::Uuid;

/// 用户缓存键前缀
const USER_PREFIX: &str = "user:";

/// 用户登录名缓存键前缀
const USER_LOGIN_PREFIX: &str = "user:login:";

/// 按 ID 缓存的用户
pub fn user_key(user_id: Uuid) -> String {
    format!("{}{}", USER_PREFIX, user_id)
}

/// 按登录名缓存的用户，登录名须已规范化
pub fn user_login_key(login: &str) -> String {
    format!("{}{}", USER_LOGIN_PREFIX, login)
}
