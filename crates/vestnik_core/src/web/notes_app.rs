//! Notes application dispatcher.
//!
//! # Responsibility
//! - Route personal-notes requests: listing, detail, add/edit/delete
//!   forms, success page, shared auth pages.
//!
//! # Invariants
//! - Successful note mutations redirect to the success page.
//! - Slug rejections re-render the form with the `slug` field message;
//!   nothing is persisted.
//! - Foreign notes answer as missing on every route.

use crate::repo::note_repo::SqliteNoteRepository;
use crate::service::note_service::{NoteInput, NoteService};
use crate::service::{FieldError, FlowError};
use crate::web::request::{FormData, Method, Request};
use crate::web::response::{FormContext, FormKind, ObjectList, Page, RenderContext, Response};
use crate::web::routes::{notes_routes, RouteMatch};
use crate::web::{gate_route, login_redirect_response, AppError, AppResult};
use log::{error, info};
use rusqlite::Connection;

/// Handles one notes-application request.
///
/// Policy outcomes come back as `Ok`; only infrastructure failures are
/// `Err`. Emits one `request` log event per call.
pub fn handle(conn: &mut Connection, request: &Request) -> AppResult<Response> {
    let matched = notes_routes().resolve(&request.path);
    let route_name = matched.as_ref().map_or("unmatched", |m| m.route.name);

    let result = match &matched {
        None => Ok(Response::NotFound),
        Some(m) => dispatch(conn, request, m),
    };

    match &result {
        Ok(response) => info!(
            "event=request module=web app=notes method={} route={route_name} status={}",
            request.method,
            response.status()
        ),
        Err(err) => error!(
            "event=request module=web app=notes method={} route={route_name} status=error error={err}",
            request.method
        ),
    }

    result
}

fn dispatch(
    conn: &mut Connection,
    request: &Request,
    matched: &RouteMatch<'_>,
) -> AppResult<Response> {
    if let Some(response) = gate_route(&request.actor, matched.route.rule, &request.path) {
        return Ok(response);
    }

    match (matched.route.name, request.method) {
        ("home", Method::Get) => Ok(Response::page(Page::NotesHome)),
        ("list", Method::Get) => list_notes(conn, request),
        ("add", Method::Get) => Ok(form_page(Vec::new())),
        ("add", Method::Post) => create_note(conn, request),
        ("success", Method::Get) => Ok(Response::page(Page::NotesSuccess)),
        ("detail", Method::Get) => owner_note_page(conn, request, matched, Page::NoteDetail),
        ("edit", Method::Get) => owner_note_page(conn, request, matched, Page::NoteForm),
        ("edit", Method::Post) => update_note(conn, request, matched),
        ("delete", Method::Get) => owner_note_page(conn, request, matched, Page::NoteDelete),
        ("delete", Method::Post) => delete_note(conn, request, matched),
        ("login", Method::Get) => Ok(Response::page(Page::Login)),
        ("logout", Method::Get) => Ok(Response::page(Page::Logout)),
        ("signup", Method::Get) => Ok(Response::page(Page::Signup)),
        _ => Ok(Response::NotFound),
    }
}

fn note_service(conn: &mut Connection) -> AppResult<NoteService<SqliteNoteRepository<'_>>> {
    Ok(NoteService::new(SqliteNoteRepository::try_new(conn)?))
}

fn list_notes(conn: &mut Connection, request: &Request) -> AppResult<Response> {
    match note_service(conn)?.list_notes(&request.actor) {
        Ok(notes) => Ok(Response::Render {
            page: Page::NotesList,
            context: RenderContext {
                object_list: Some(ObjectList::Notes(notes)),
                ..Default::default()
            },
        }),
        Err(FlowError::AuthRequired) => Ok(login_redirect_response(&request.path)),
        Err(FlowError::Repo(err)) => Err(err.into()),
        Err(_) => Ok(Response::NotFound),
    }
}

fn create_note(conn: &mut Connection, request: &Request) -> AppResult<Response> {
    let input = note_input(&request.form);
    match note_service(conn)?.create(&request.actor, &input) {
        Ok(_) => success_redirect(),
        Err(FlowError::AuthRequired) => Ok(login_redirect_response(&request.path)),
        Err(FlowError::Rejected(errors)) => Ok(form_page(errors)),
        Err(FlowError::Repo(err)) => Err(err.into()),
        Err(FlowError::NotFound) => Ok(Response::NotFound),
    }
}

fn owner_note_page(
    conn: &mut Connection,
    request: &Request,
    matched: &RouteMatch<'_>,
    page: Page,
) -> AppResult<Response> {
    let slug = match matched.arg.as_deref() {
        Some(slug) => slug,
        None => return Ok(Response::NotFound),
    };

    match note_service(conn)?.get_for(&request.actor, slug) {
        Ok(note) => {
            let form = (page == Page::NoteForm).then(|| FormContext::fresh(FormKind::Note));
            Ok(Response::Render {
                page,
                context: RenderContext {
                    object_list: Some(ObjectList::Notes(vec![note])),
                    form,
                    ..Default::default()
                },
            })
        }
        Err(FlowError::AuthRequired) => Ok(login_redirect_response(&request.path)),
        Err(FlowError::Repo(err)) => Err(err.into()),
        Err(_) => Ok(Response::NotFound),
    }
}

fn update_note(
    conn: &mut Connection,
    request: &Request,
    matched: &RouteMatch<'_>,
) -> AppResult<Response> {
    let slug = match matched.arg.as_deref() {
        Some(slug) => slug,
        None => return Ok(Response::NotFound),
    };

    let input = note_input(&request.form);
    match note_service(conn)?.update(&request.actor, slug, &input) {
        Ok(_) => success_redirect(),
        Err(FlowError::AuthRequired) => Ok(login_redirect_response(&request.path)),
        Err(FlowError::NotFound) => Ok(Response::NotFound),
        Err(FlowError::Rejected(errors)) => Ok(form_page(errors)),
        Err(FlowError::Repo(err)) => Err(err.into()),
    }
}

fn delete_note(
    conn: &mut Connection,
    request: &Request,
    matched: &RouteMatch<'_>,
) -> AppResult<Response> {
    let slug = match matched.arg.as_deref() {
        Some(slug) => slug,
        None => return Ok(Response::NotFound),
    };

    match note_service(conn)?.delete(&request.actor, slug) {
        Ok(()) => success_redirect(),
        Err(FlowError::AuthRequired) => Ok(login_redirect_response(&request.path)),
        Err(FlowError::Repo(err)) => Err(err.into()),
        Err(_) => Ok(Response::NotFound),
    }
}

fn form_page(errors: Vec<FieldError>) -> Response {
    let form = if errors.is_empty() {
        FormContext::fresh(FormKind::Note)
    } else {
        FormContext::rejected(FormKind::Note, errors)
    };
    Response::Render {
        page: Page::NoteForm,
        context: RenderContext {
            form: Some(form),
            ..Default::default()
        },
    }
}

fn note_input(form: &FormData) -> NoteInput {
    NoteInput {
        title: form.get("title").unwrap_or_default().to_string(),
        body: form.get("body").unwrap_or_default().to_string(),
        slug: form.get("slug").map(str::to_string),
    }
}

fn success_redirect() -> AppResult<Response> {
    let location = notes_routes()
        .reverse("success", None)
        .ok_or(AppError::Route("success"))?;
    Ok(Response::Redirect { location })
}
