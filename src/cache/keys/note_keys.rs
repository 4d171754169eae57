use uuid::Uuid;

const NOTE_PREFIX: &str = "note:";

const USER_NOTES_PREFIX: &str = "note:user:";

/// 单条笔记的缓存键
pub fn note_key(note_id: Uuid) -> String {
    format!("{}{}", NOTE_PREFIX, note_id)
}

/// 用户全部笔记的缓存键
pub fn user_notes_key(user_id: Uuid) -> String {
    format!("{}{}", USER_NOTES_PREFIX, user_id)
}
