use rusqlite::{params, Connection};
use uuid::Uuid;
use vestnik_core::db::migrations::latest_version;
use vestnik_core::db::open_db_in_memory;
use vestnik_core::model::actor::User;
use vestnik_core::model::note::Note;
use vestnik_core::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use vestnik_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use vestnik_core::service::note_service::{NoteInput, NoteService};
use vestnik_core::service::{FieldError, FlowError};
use vestnik_core::{Actor, RepoError};

#[test]
fn create_and_get_roundtrip() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "Автор");
    let mut repo = SqliteNoteRepository::try_new(&mut conn).unwrap();

    let note = Note::new("Заголовок", "Текст заметки", "zagolovok", author.uuid);
    let id = repo.insert_if_slug_unique(&note).unwrap();
    assert_eq!(id, note.uuid);

    let loaded = repo.get_by_slug("zagolovok").unwrap().unwrap();
    assert_eq!(loaded.uuid, note.uuid);
    assert_eq!(loaded.title, "Заголовок");
    assert_eq!(loaded.author_uuid, author.uuid);
    assert!(loaded.created_at > 0);
    assert_eq!(loaded.created_at, loaded.updated_at);
}

#[test]
fn insert_rejects_taken_slug_and_writes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "Автор");
    let mut repo = SqliteNoteRepository::try_new(&mut conn).unwrap();

    let first = Note::new("Первая", "a", "dup", author.uuid);
    repo.insert_if_slug_unique(&first).unwrap();

    let second = Note::new("Вторая", "b", "dup", author.uuid);
    let err = repo.insert_if_slug_unique(&second).unwrap_err();
    assert!(matches!(err, RepoError::SlugTaken(slug) if slug == "dup"));
    assert_eq!(repo.count().unwrap(), 1);
    assert_eq!(repo.get_by_slug("dup").unwrap().unwrap().uuid, first.uuid);
}

#[test]
fn update_replaces_fields_and_keeps_author() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "Автор");
    let created = insert_note(&mut conn, "Старая", "staraya", &author);

    let mut repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut updated = created.clone();
    updated.title = "Новая".to_string();
    updated.body = "Другой текст".to_string();
    updated.slug = "novaya".to_string();
    repo.update_if_slug_unique(&updated).unwrap();

    assert!(repo.get_by_slug("staraya").unwrap().is_none());
    let loaded = repo.get_by_slug("novaya").unwrap().unwrap();
    assert_eq!(loaded.uuid, created.uuid);
    assert_eq!(loaded.title, "Новая");
    assert_eq!(loaded.author_uuid, author.uuid);
    assert_eq!(loaded.created_at, created.created_at);
    assert!(loaded.updated_at >= created.updated_at);
}

#[test]
fn update_rejects_slug_taken_by_another_note() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "Автор");
    insert_note(&mut conn, "Первая", "pervaya", &author);
    let second = insert_note(&mut conn, "Вторая", "vtoraya", &author);

    let mut repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut moved = second.clone();
    moved.slug = "pervaya".to_string();
    let err = repo.update_if_slug_unique(&moved).unwrap_err();
    assert!(matches!(err, RepoError::SlugTaken(slug) if slug == "pervaya"));
    assert_eq!(repo.get_by_slug("vtoraya").unwrap().unwrap().uuid, second.uuid);
}

#[test]
fn update_keeping_own_slug_is_not_a_collision() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "Автор");
    let note = insert_note(&mut conn, "Первая", "pervaya", &author);

    let mut repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut renamed = note.clone();
    renamed.title = "Переименована".to_string();
    repo.update_if_slug_unique(&renamed).unwrap();

    let loaded = repo.get_by_slug("pervaya").unwrap().unwrap();
    assert_eq!(loaded.title, "Переименована");
}

#[test]
fn update_missing_note_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "Автор");
    let mut repo = SqliteNoteRepository::try_new(&mut conn).unwrap();

    let ghost = Note::new("Нет такой", "x", "ghost", author.uuid);
    let err = repo.update_if_slug_unique(&ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == ghost.uuid));
}

#[test]
fn delete_removes_note_and_reports_missing() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "Автор");
    let note = insert_note(&mut conn, "Временная", "vremennaya", &author);

    let mut repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    repo.delete(note.uuid).unwrap();
    assert!(repo.get_by_slug("vremennaya").unwrap().is_none());

    let err = repo.delete(note.uuid).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == note.uuid));

    let err = repo.delete(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn find_by_owner_lists_only_own_notes_oldest_first() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = seed_user(&conn, "Автор");
    let other = seed_user(&conn, "Читатель");

    let late = insert_note(&mut conn, "Поздняя", "pozdnyaya", &owner);
    let early = insert_note(&mut conn, "Ранняя", "rannyaya", &owner);
    insert_note(&mut conn, "Чужая", "chuzhaya", &other);
    pin_created_at(&conn, "pozdnyaya", 2_000);
    pin_created_at(&conn, "rannyaya", 1_000);

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let notes = repo.find_by_owner(owner.uuid).unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].uuid, early.uuid);
    assert_eq!(notes[1].uuid, late.uuid);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let mut conn = Connection::open_in_memory().unwrap();

    let result = SqliteNoteRepository::try_new(&mut conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_notes_table() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteNoteRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("notes"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_notes_column() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE notes (
            uuid TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteNoteRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "notes",
            column: "author_uuid"
        })
    ));
}

#[test]
fn service_create_derives_slug_and_reads_back() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "Автор");
    let actor = Actor::authenticated(author.uuid);
    let mut service = NoteService::new(SqliteNoteRepository::try_new(&mut conn).unwrap());

    let input = NoteInput {
        title: "Какой-то заголовок".to_string(),
        body: "Текст".to_string(),
        slug: None,
    };
    let note = service.create(&actor, &input).unwrap();
    assert_eq!(note.slug, "kakoj-to-zagolovok");
    assert_eq!(note.author_uuid, author.uuid);
    assert!(note.created_at > 0);
}

#[test]
fn service_rejects_taken_slug_with_field_message() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "Автор");
    let actor = Actor::authenticated(author.uuid);
    let mut service = NoteService::new(SqliteNoteRepository::try_new(&mut conn).unwrap());

    let input = NoteInput {
        title: "Какой-то заголовок".to_string(),
        body: "Текст".to_string(),
        slug: None,
    };
    service.create(&actor, &input).unwrap();

    let err = service.create(&actor, &input).unwrap_err();
    match err {
        FlowError::Rejected(errors) => assert_eq!(
            errors,
            vec![FieldError {
                field: "slug",
                message:
                    "kakoj-to-zagolovok - такой slug уже существует, придумайте уникальное значение!"
                        .to_string(),
            }]
        ),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn service_hides_foreign_notes() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = seed_user(&conn, "Автор");
    let reader = seed_user(&conn, "Читатель");
    insert_note(&mut conn, "Заметка", "zametka", &owner);
    let service = NoteService::new(SqliteNoteRepository::try_new(&mut conn).unwrap());

    service
        .get_for(&Actor::authenticated(owner.uuid), "zametka")
        .unwrap();

    let err = service
        .get_for(&Actor::authenticated(reader.uuid), "zametka")
        .unwrap_err();
    assert!(matches!(err, FlowError::NotFound));

    let err = service.get_for(&Actor::Anonymous, "zametka").unwrap_err();
    assert!(matches!(err, FlowError::AuthRequired));
}

fn seed_user(conn: &Connection, username: &str) -> User {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .create(username)
        .unwrap()
}

fn insert_note(conn: &mut Connection, title: &str, slug: &str, author: &User) -> Note {
    let mut repo = SqliteNoteRepository::try_new(conn).unwrap();
    let note = Note::new(title, "Текст заметки", slug, author.uuid);
    repo.insert_if_slug_unique(&note).unwrap();
    repo.get_by_slug(slug).unwrap().unwrap()
}

fn pin_created_at(conn: &Connection, slug: &str, created_at: i64) {
    conn.execute(
        "UPDATE notes SET created_at = ?2 WHERE slug = ?1;",
        params![slug, created_at],
    )
    .unwrap();
}
