//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `vestnik_core` linkage.
//! - Walk one request of each application against an in-memory store.

use vestnik_core::db::open_db_in_memory;
use vestnik_core::repo::news_repo::{NewsRepository, SqliteNewsRepository};
use vestnik_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use vestnik_core::web::{news_app, notes_app};
use vestnik_core::{Actor, FormData, NewsConfig, NewsItem, Request};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = std::env::temp_dir().join("vestnik-logs");
    if let Err(err) = vestnik_core::init_logging(
        vestnik_core::default_log_level(),
        &log_dir.to_string_lossy(),
    ) {
        eprintln!("logging disabled: {err}");
    }

    println!("vestnik_core ping={}", vestnik_core::ping());
    println!("vestnik_core version={}", vestnik_core::core_version());

    let mut conn = open_db_in_memory()?;
    let reader = SqliteUserRepository::try_new(&conn)?.create("Читатель")?;
    let news = NewsItem::new("Заголовок дня", "Текст новости.", 1_700_000_000_000);
    SqliteNewsRepository::try_new(&conn)?.insert(&news)?;

    let config = NewsConfig::default();
    let actor = Actor::authenticated(reader.uuid);

    let home = news_app::handle(&conn, &config, &Request::get("/", Actor::Anonymous))?;
    println!("news home status={}", home.status());

    let form = FormData::from_pairs(&[("body", "Первый!")]);
    let request = Request::post(format!("/news/{}/", news.uuid), actor, form);
    let posted = news_app::handle(&conn, &config, &request)?;
    println!("comment post status={}", posted.status());

    let form = FormData::from_pairs(&[("title", "Какой-то заголовок"), ("body", "Текст заметки")]);
    let created = notes_app::handle(&mut conn, &Request::post("/add/", actor, form))?;
    println!("note post status={}", created.status());

    let listing = notes_app::handle(&mut conn, &Request::get("/notes/", actor))?;
    println!("notes list status={}", listing.status());

    Ok(())
}
