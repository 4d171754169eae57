pub mod note;
pub mod user;

pub use note::PgNoteRepository;
pub use user::PgUserRepository;
