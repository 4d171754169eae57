mod common;

use chrono::Duration;
use common::unique_login;
use notes_backend::{Error, Repositories};
use notes_backend::database::{PgNoteRepository, PgUserRepository};
use notes_backend::models::{Note, NotePatch, NoteRepository, User, UserRepository};
use uuid::Uuid;

#[tokio::test]
async fn user_crud() {
    let Some(pool) = common::pg_pool().await else {
        return;
    };
    let users = PgUserRepository::new(pool);
    let mut user = User::new(&unique_login("erin"), "secret");

    users.create(&user).await.unwrap();
    assert_eq!(users.fetch(user.id).await.unwrap(), user);
    assert_eq!(
        users.fetch_by_login(&user.login.to_uppercase()).await.unwrap(),
        user
    );

    user.login = unique_login("erin");
    user.role = "admin".to_string();
    users.update(&user).await.unwrap();
    assert_eq!(users.fetch(user.id).await.unwrap(), user);

    users.delete(user.id).await.unwrap();
    assert!(matches!(users.fetch(user.id).await, Err(Error::UserNotExists)));
    assert!(matches!(users.delete(user.id).await, Err(Error::UserNotExists)));
}

#[tokio::test]
async fn login_is_unique_regardless_of_case() {
    let Some(pool) = common::pg_pool().await else {
        return;
    };
    let users = PgUserRepository::new(pool);
    let login = unique_login("frank");
    let first = User::new(&login, "one");
    users.create(&first).await.unwrap();

    let err = users
        .create(&User::new(&login.to_uppercase(), "two"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UserExists(ref l) if *l == login));

    users.delete(first.id).await.unwrap();
}

#[tokio::test]
async fn writes_to_missing_rows_report_not_exists() {
    let Some(pool) = common::pg_pool().await else {
        return;
    };
    let users = PgUserRepository::new(pool.clone());
    let notes = PgNoteRepository::new(pool);

    let ghost = User::new(&unique_login("ghost"), "secret");
    assert!(matches!(users.update(&ghost).await, Err(Error::UserNotExists)));

    let patch = NotePatch::new(Uuid::new_v4(), "t", "c");
    assert!(matches!(notes.update(&patch).await, Err(Error::NoteNotExists)));
    assert!(matches!(
        notes.delete(Uuid::new_v4()).await,
        Err(Error::NoteNotExists)
    ));
}

#[tokio::test]
async fn note_crud_and_ordering() {
    let Some(pool) = common::pg_pool().await else {
        return;
    };
    let users = PgUserRepository::new(pool.clone());
    let notes = PgNoteRepository::new(pool);

    let author = User::new(&unique_login("gina"), "secret");
    users.create(&author).await.unwrap();
    assert!(notes.fetch_all(author.id).await.unwrap().is_empty());

    let mut first = Note::new(author.id, "first", "a");
    let mut second = Note::new(author.id, "second", "b");
    // inserted out of order on purpose
    second.created_at = first.created_at + Duration::seconds(1);
    second.updated_at = second.created_at;
    notes.create(&second).await.unwrap();
    notes.create(&first).await.unwrap();

    assert_eq!(notes.fetch(first.id).await.unwrap(), first);
    assert_eq!(
        notes.fetch_all(author.id).await.unwrap(),
        vec![first.clone(), second.clone()]
    );

    let patch = NotePatch::new(first.id, "first, edited", "aa");
    notes.update(&patch).await.unwrap();
    first.apply(&patch);
    assert_eq!(notes.fetch(first.id).await.unwrap(), first);

    notes.delete(second.id).await.unwrap();
    assert!(matches!(notes.fetch(second.id).await, Err(Error::NoteNotExists)));

    notes.delete(first.id).await.unwrap();
    users.delete(author.id).await.unwrap();
}

#[tokio::test]
async fn author_with_notes_cannot_be_deleted_directly() {
    let Some(pool) = common::pg_pool().await else {
        return;
    };
    let users = PgUserRepository::new(pool.clone());
    let notes = PgNoteRepository::new(pool);

    let author = User::new(&unique_login("hank"), "secret");
    users.create(&author).await.unwrap();
    let note = Note::new(author.id, "title", "content");
    notes.create(&note).await.unwrap();

    // notes are never removed behind the cache's back
    let err = users.delete(author.id).await.unwrap_err();
    assert!(matches!(err, Error::Database { .. }), "{err}");
    assert_eq!(notes.fetch(note.id).await.unwrap(), note);

    notes.delete(note.id).await.unwrap();
    users.delete(author.id).await.unwrap();
}

#[tokio::test]
async fn delete_user_removes_notes_through_the_cache() {
    let Some(pool) = common::pg_pool().await else {
        return;
    };
    let Some(redis) = common::redis_client().await else {
        return;
    };
    let repositories = Repositories::new(pool, redis);

    let author = User::new(&unique_login("iris"), "secret");
    repositories.users.create(&author).await.unwrap();
    let note = Note::new(author.id, "title", "content");
    repositories.notes.create(&note).await.unwrap();
    assert_eq!(repositories.notes.fetch_all(author.id).await.unwrap(), vec![note.clone()]);

    repositories.delete_user(author.id).await.unwrap();

    assert!(matches!(
        repositories.notes.fetch(note.id).await,
        Err(Error::NoteNotExists)
    ));
    assert!(repositories.notes.fetch_all(author.id).await.unwrap().is_empty());
    assert!(matches!(
        repositories.users.fetch(author.id).await,
        Err(Error::UserNotExists)
    ));
}
