//! News application dispatcher.
//!
//! # Responsibility
//! - Route news-board requests: front page, detail with comments, comment
//!   create/edit/delete, shared auth pages.
//!
//! # Invariants
//! - Comment mutations redirect to the detail page `#comments` anchor.
//! - Banned-word rejections re-render the detail page with the `body`
//!   field warning; nothing is persisted.
//! - The comment form appears in the detail context only for
//!   authenticated actors.

use crate::model::actor::Actor;
use crate::model::news::NewsId;
use crate::repo::comment_repo::SqliteCommentRepository;
use crate::repo::news_repo::SqliteNewsRepository;
use crate::service::comment_service::CommentService;
use crate::service::news_service::{NewsConfig, NewsDetail, NewsService};
use crate::service::{FieldError, FlowError};
use crate::web::request::{Method, Request};
use crate::web::response::{FormContext, FormKind, ObjectList, Page, RenderContext, Response};
use crate::web::routes::{news_routes, RouteMatch};
use crate::web::{gate_route, login_redirect_response, AppError, AppResult};
use log::{error, info};
use rusqlite::Connection;
use uuid::Uuid;

/// Handles one news-application request.
///
/// Policy outcomes come back as `Ok`; only infrastructure failures are
/// `Err`. Emits one `request` log event per call.
pub fn handle(conn: &Connection, config: &NewsConfig, request: &Request) -> AppResult<Response> {
    let matched = news_routes().resolve(&request.path);
    let route_name = matched.as_ref().map_or("unmatched", |m| m.route.name);

    let result = match &matched {
        None => Ok(Response::NotFound),
        Some(m) => dispatch(conn, config, request, m),
    };

    match &result {
        Ok(response) => info!(
            "event=request module=web app=news method={} route={route_name} status={}",
            request.method,
            response.status()
        ),
        Err(err) => error!(
            "event=request module=web app=news method={} route={route_name} status=error error={err}",
            request.method
        ),
    }

    result
}

fn dispatch(
    conn: &Connection,
    config: &NewsConfig,
    request: &Request,
    matched: &RouteMatch<'_>,
) -> AppResult<Response> {
    if let Some(response) = gate_route(&request.actor, matched.route.rule, &request.path) {
        return Ok(response);
    }

    match (matched.route.name, request.method) {
        ("home", Method::Get) => home(conn, config),
        ("detail", Method::Get) => detail(conn, request, matched),
        ("detail", Method::Post) => create_comment(conn, request, matched),
        ("edit", Method::Get) => comment_page(conn, request, matched, Page::CommentEdit),
        ("edit", Method::Post) => update_comment(conn, request, matched),
        ("delete", Method::Get) => comment_page(conn, request, matched, Page::CommentDelete),
        ("delete", Method::Post) => delete_comment(conn, request, matched),
        ("login", Method::Get) => Ok(Response::page(Page::Login)),
        ("logout", Method::Get) => Ok(Response::page(Page::Logout)),
        ("signup", Method::Get) => Ok(Response::page(Page::Signup)),
        _ => Ok(Response::NotFound),
    }
}

fn news_service(
    conn: &Connection,
) -> AppResult<NewsService<SqliteNewsRepository<'_>, SqliteCommentRepository<'_>>> {
    Ok(NewsService::new(
        SqliteNewsRepository::try_new(conn)?,
        SqliteCommentRepository::try_new(conn)?,
    ))
}

fn comment_service(
    conn: &Connection,
) -> AppResult<CommentService<SqliteCommentRepository<'_>, SqliteNewsRepository<'_>>> {
    Ok(CommentService::new(
        SqliteCommentRepository::try_new(conn)?,
        SqliteNewsRepository::try_new(conn)?,
    ))
}

fn home(conn: &Connection, config: &NewsConfig) -> AppResult<Response> {
    let items = news_service(conn)?.front_page(Some(config.front_page_limit))?;
    Ok(Response::Render {
        page: Page::NewsHome,
        context: RenderContext {
            object_list: Some(ObjectList::News(items)),
            ..Default::default()
        },
    })
}

fn detail(conn: &Connection, request: &Request, matched: &RouteMatch<'_>) -> AppResult<Response> {
    let id = match parse_arg_uuid(matched) {
        Some(id) => id,
        None => return Ok(Response::NotFound),
    };

    match news_service(conn)?.detail(id) {
        Ok(view) => Ok(detail_response(view, &request.actor, Vec::new())),
        Err(FlowError::Repo(err)) => Err(err.into()),
        Err(_) => Ok(Response::NotFound),
    }
}

fn create_comment(
    conn: &Connection,
    request: &Request,
    matched: &RouteMatch<'_>,
) -> AppResult<Response> {
    let id = match parse_arg_uuid(matched) {
        Some(id) => id,
        None => return Ok(Response::NotFound),
    };
    let body = request.form.get("body").unwrap_or_default();

    match comment_service(conn)?.create(&request.actor, id, body) {
        Ok(comment) => comments_redirect(comment.news_uuid),
        Err(FlowError::AuthRequired) => Ok(login_redirect_response(&request.path)),
        Err(FlowError::NotFound) => Ok(Response::NotFound),
        Err(FlowError::Rejected(errors)) => match news_service(conn)?.detail(id) {
            Ok(view) => Ok(detail_response(view, &request.actor, errors)),
            Err(FlowError::Repo(err)) => Err(err.into()),
            Err(_) => Ok(Response::NotFound),
        },
        Err(FlowError::Repo(err)) => Err(err.into()),
    }
}

fn comment_page(
    conn: &Connection,
    request: &Request,
    matched: &RouteMatch<'_>,
    page: Page,
) -> AppResult<Response> {
    let id = match parse_arg_uuid(matched) {
        Some(id) => id,
        None => return Ok(Response::NotFound),
    };

    match comment_service(conn)?.get_for(&request.actor, id) {
        Ok(_) => {
            let form = (page == Page::CommentEdit).then(|| FormContext::fresh(FormKind::Comment));
            Ok(Response::Render {
                page,
                context: RenderContext {
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

fn update_comment(
    conn: &Connection,
    request: &Request,
    matched: &RouteMatch<'_>,
) -> AppResult<Response> {
    let id = match parse_arg_uuid(matched) {
        Some(id) => id,
        None => return Ok(Response::NotFound),
    };
    let body = request.form.get("body").unwrap_or_default();

    match comment_service(conn)?.update(&request.actor, id, body) {
        Ok(comment) => comments_redirect(comment.news_uuid),
        Err(FlowError::AuthRequired) => Ok(login_redirect_response(&request.path)),
        Err(FlowError::NotFound) => Ok(Response::NotFound),
        Err(FlowError::Rejected(errors)) => Ok(Response::Render {
            page: Page::CommentEdit,
            context: RenderContext {
                form: Some(FormContext::rejected(FormKind::Comment, errors)),
                ..Default::default()
            },
        }),
        Err(FlowError::Repo(err)) => Err(err.into()),
    }
}

fn delete_comment(
    conn: &Connection,
    request: &Request,
    matched: &RouteMatch<'_>,
) -> AppResult<Response> {
    let id = match parse_arg_uuid(matched) {
        Some(id) => id,
        None => return Ok(Response::NotFound),
    };

    match comment_service(conn)?.delete(&request.actor, id) {
        Ok(comment) => comments_redirect(comment.news_uuid),
        Err(FlowError::AuthRequired) => Ok(login_redirect_response(&request.path)),
        Err(FlowError::Repo(err)) => Err(err.into()),
        Err(_) => Ok(Response::NotFound),
    }
}

fn detail_response(view: NewsDetail, actor: &Actor, errors: Vec<FieldError>) -> Response {
    let form = if actor.is_anonymous() {
        None
    } else if errors.is_empty() {
        Some(FormContext::fresh(FormKind::Comment))
    } else {
        Some(FormContext::rejected(FormKind::Comment, errors))
    };

    Response::Render {
        page: Page::NewsDetail,
        context: RenderContext {
            news: Some(view),
            form,
            ..Default::default()
        },
    }
}

fn comments_redirect(news_uuid: NewsId) -> AppResult<Response> {
    let path = news_routes()
        .reverse("detail", Some(&news_uuid.to_string()))
        .ok_or(AppError::Route("detail"))?;
    Ok(Response::Redirect {
        location: format!("{path}#comments"),
    })
}

fn parse_arg_uuid(matched: &RouteMatch<'_>) -> Option<Uuid> {
    matched
        .arg
        .as_deref()
        .and_then(|value| Uuid::parse_str(value).ok())
}
