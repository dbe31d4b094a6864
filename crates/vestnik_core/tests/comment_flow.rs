use rusqlite::{params, Connection};
use uuid::Uuid;
use vestnik_core::db::open_db_in_memory;
use vestnik_core::repo::comment_repo::{CommentRepository, SqliteCommentRepository};
use vestnik_core::repo::news_repo::{NewsRepository, SqliteNewsRepository};
use vestnik_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use vestnik_core::service::{FieldError, FlowError};
use vestnik_core::{Actor, Comment, CommentService, NewsItem, RepoError, User};

#[test]
fn create_requires_authentication() {
    let conn = open_db_in_memory().unwrap();
    let news = seed_news(&conn, "Новость", 1_700_000_000_000);
    let service = comment_service(&conn);

    let err = service
        .create(&Actor::Anonymous, news.uuid, "Первый!")
        .unwrap_err();
    assert!(matches!(err, FlowError::AuthRequired));
    assert_eq!(comment_count(&conn), 0);
}

#[test]
fn create_requires_existing_news() {
    let conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "Автор");
    let service = comment_service(&conn);

    let err = service
        .create(&Actor::authenticated(author.uuid), Uuid::new_v4(), "Текст")
        .unwrap_err();
    assert!(matches!(err, FlowError::NotFound));
    assert_eq!(comment_count(&conn), 0);
}

#[test]
fn banned_words_reject_submission_with_fixed_warning() {
    let conn = open_db_in_memory().unwrap();
    let news = seed_news(&conn, "Новость", 1_700_000_000_000);
    let author = seed_user(&conn, "Читатель");
    let actor = Actor::authenticated(author.uuid);
    let service = comment_service(&conn);

    for body in ["Ты редиска!", "Какой негодяй", "предискаверия"] {
        let err = service.create(&actor, news.uuid, body).unwrap_err();
        match err {
            FlowError::Rejected(errors) => assert_eq!(
                errors,
                vec![FieldError {
                    field: "body",
                    message: "Не ругайтесь!".to_string(),
                }]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(comment_count(&conn), 0);
}

#[test]
fn clean_comment_is_stored_and_filter_is_case_sensitive() {
    let conn = open_db_in_memory().unwrap();
    let news = seed_news(&conn, "Новость", 1_700_000_000_000);
    let author = seed_user(&conn, "Читатель");
    let actor = Actor::authenticated(author.uuid);
    let service = comment_service(&conn);

    let stored = service.create(&actor, news.uuid, "Просто текст").unwrap();
    assert_eq!(stored.news_uuid, news.uuid);
    assert_eq!(stored.author_uuid, author.uuid);
    assert_eq!(stored.body, "Просто текст");
    assert!(stored.created_at > 0);

    // Matching is case-sensitive, so the capitalized form passes.
    service.create(&actor, news.uuid, "Редиска").unwrap();
    assert_eq!(comment_count(&conn), 2);
}

#[test]
fn only_the_author_can_update_a_comment() {
    let conn = open_db_in_memory().unwrap();
    let news = seed_news(&conn, "Новость", 1_700_000_000_000);
    let author = seed_user(&conn, "Автор");
    let stranger = seed_user(&conn, "Читатель");
    let comment = seed_comment(&conn, &news, &author, "Первый!");
    let service = comment_service(&conn);

    let err = service
        .update(&Actor::authenticated(stranger.uuid), comment.uuid, "Мое")
        .unwrap_err();
    assert!(matches!(err, FlowError::NotFound));

    let err = service
        .update(&Actor::Anonymous, comment.uuid, "Мое")
        .unwrap_err();
    assert!(matches!(err, FlowError::AuthRequired));

    let updated = service
        .update(&Actor::authenticated(author.uuid), comment.uuid, "Поправил")
        .unwrap();
    assert_eq!(updated.body, "Поправил");

    let err = service
        .update(&Actor::authenticated(author.uuid), comment.uuid, "негодяй")
        .unwrap_err();
    assert!(matches!(err, FlowError::Rejected(_)));
    let unchanged = service
        .get_for(&Actor::authenticated(author.uuid), comment.uuid)
        .unwrap();
    assert_eq!(unchanged.body, "Поправил");
}

#[test]
fn only_the_author_can_delete_a_comment() {
    let conn = open_db_in_memory().unwrap();
    let news = seed_news(&conn, "Новость", 1_700_000_000_000);
    let author = seed_user(&conn, "Автор");
    let stranger = seed_user(&conn, "Читатель");
    let comment = seed_comment(&conn, &news, &author, "Первый!");
    let service = comment_service(&conn);

    let err = service
        .delete(&Actor::authenticated(stranger.uuid), comment.uuid)
        .unwrap_err();
    assert!(matches!(err, FlowError::NotFound));
    assert_eq!(comment_count(&conn), 1);

    let removed = service
        .delete(&Actor::authenticated(author.uuid), comment.uuid)
        .unwrap();
    assert_eq!(removed.uuid, comment.uuid);
    assert_eq!(removed.news_uuid, news.uuid);
    assert_eq!(comment_count(&conn), 0);

    let err = service
        .delete(&Actor::authenticated(author.uuid), comment.uuid)
        .unwrap_err();
    assert!(matches!(err, FlowError::NotFound));
}

#[test]
fn listing_is_oldest_first_with_stable_ties() {
    let conn = open_db_in_memory().unwrap();
    let news = seed_news(&conn, "Новость", 1_700_000_000_000);
    let other_news = seed_news(&conn, "Другая", 1_700_000_001_000);
    let author = seed_user(&conn, "Автор");
    let repo = SqliteCommentRepository::try_new(&conn).unwrap();

    let tie_a = comment_with_fixed_id("00000000-0000-4000-8000-000000000001", &news, &author);
    let tie_b = comment_with_fixed_id("00000000-0000-4000-8000-000000000002", &news, &author);
    let oldest = comment_with_fixed_id("00000000-0000-4000-8000-000000000003", &news, &author);
    let foreign = comment_with_fixed_id("00000000-0000-4000-8000-000000000004", &other_news, &author);
    for comment in [&tie_b, &tie_a, &oldest, &foreign] {
        repo.insert(comment).unwrap();
    }
    pin_comment_created_at(&conn, oldest.uuid, 500);
    pin_comment_created_at(&conn, tie_a.uuid, 1_000);
    pin_comment_created_at(&conn, tie_b.uuid, 1_000);

    let listed = repo.list_for_news(news.uuid).unwrap();
    let ids: Vec<Uuid> = listed.into_iter().map(|comment| comment.uuid).collect();
    assert_eq!(ids, vec![oldest.uuid, tie_a.uuid, tie_b.uuid]);
}

#[test]
fn deleting_news_cascades_to_its_comments() {
    let conn = open_db_in_memory().unwrap();
    let news = seed_news(&conn, "Новость", 1_700_000_000_000);
    let kept = seed_news(&conn, "Другая", 1_700_000_001_000);
    let author = seed_user(&conn, "Автор");
    seed_comment(&conn, &news, &author, "Первый!");
    seed_comment(&conn, &news, &author, "Второй!");
    let survivor = seed_comment(&conn, &kept, &author, "Останусь");

    conn.execute("DELETE FROM news WHERE uuid = ?1;", [news.uuid.to_string()])
        .unwrap();

    let repo = SqliteCommentRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count().unwrap(), 1);
    assert_eq!(repo.get(survivor.uuid).unwrap().unwrap().uuid, survivor.uuid);
}

#[test]
fn repo_mutations_on_missing_comment_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCommentRepository::try_new(&conn).unwrap();

    let ghost = Uuid::new_v4();
    let err = repo.update_body(ghost, "x").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == ghost));
    let err = repo.delete(ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == ghost));
}

#[test]
fn duplicate_username_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    seed_user(&conn, "Автор");

    let err = SqliteUserRepository::try_new(&conn)
        .unwrap()
        .create("Автор")
        .unwrap_err();
    assert!(matches!(err, RepoError::UsernameTaken(name) if name == "Автор"));
}

fn seed_user(conn: &Connection, username: &str) -> User {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .create(username)
        .unwrap()
}

fn seed_news(conn: &Connection, title: &str, published_at: i64) -> NewsItem {
    let repo = SqliteNewsRepository::try_new(conn).unwrap();
    let item = NewsItem::new(title, "Текст новости.", published_at);
    repo.insert(&item).unwrap();
    repo.get(item.uuid).unwrap().unwrap()
}

fn seed_comment(conn: &Connection, news: &NewsItem, author: &User, body: &str) -> Comment {
    let repo = SqliteCommentRepository::try_new(conn).unwrap();
    let comment = Comment::new(news.uuid, author.uuid, body);
    repo.insert(&comment).unwrap();
    repo.get(comment.uuid).unwrap().unwrap()
}

fn comment_service(
    conn: &Connection,
) -> CommentService<SqliteCommentRepository<'_>, SqliteNewsRepository<'_>> {
    CommentService::new(
        SqliteCommentRepository::try_new(conn).unwrap(),
        SqliteNewsRepository::try_new(conn).unwrap(),
    )
}

fn comment_count(conn: &Connection) -> i64 {
    SqliteCommentRepository::try_new(conn)
        .unwrap()
        .count()
        .unwrap()
}

fn comment_with_fixed_id(id: &str, news: &NewsItem, author: &User) -> Comment {
    let mut comment = Comment::new(news.uuid, author.uuid, "Комментарий");
    comment.uuid = Uuid::parse_str(id).unwrap();
    comment
}

fn pin_comment_created_at(conn: &Connection, id: Uuid, created_at: i64) {
    conn.execute(
        "UPDATE comments SET created_at = ?2 WHERE uuid = ?1;",
        params![id.to_string(), created_at],
    )
    .unwrap();
}
