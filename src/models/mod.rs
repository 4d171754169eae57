pub mod note;
pub mod session;
pub mod user;

pub use note::{Note, NotePatch, NoteRepository};
pub use session::{MAX_SESSIONS, SESSION_TTL, Session, SessionRepository};
pub use user::{DEFAULT_ROLE, User, UserRepository, normalize_login};
