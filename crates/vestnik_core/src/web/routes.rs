//! Static route tables with pure reversal and resolution.
//!
//! # Responsibility
//! - Map symbolic route names to path patterns and GET access rules.
//! - Reverse names to concrete paths and resolve paths back to routes.
//!
//! # Invariants
//! - A pattern contains at most one `<param>` segment.
//! - `reverse` then `resolve` round-trips for every route.
//! - Login redirects carry the original path verbatim in `next`.

use crate::policy::access::AccessRule;

/// Path of the shared login page.
pub const LOGIN_PATH: &str = "/auth/login/";

/// Builds the login redirect target preserving the requested path.
pub fn login_redirect(next: &str) -> String {
    format!("{LOGIN_PATH}?next={next}")
}

/// One named route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Symbolic name, unique within its table.
    pub name: &'static str,
    /// Path pattern with at most one `<param>` segment.
    pub pattern: &'static str,
    /// Access rule applied to GET requests on this route.
    pub rule: AccessRule,
}

/// Per-application route table.
#[derive(Debug)]
pub struct RouteTable {
    /// Application name, used in request log events.
    pub app: &'static str,
    routes: &'static [Route],
}

/// A resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'table> {
    pub route: &'table Route,
    /// Captured `<param>` value, when the pattern has one.
    pub arg: Option<String>,
}

impl RouteTable {
    /// Iterates the routes in declaration order.
    pub fn routes(&self) -> impl Iterator<Item = &'static Route> {
        self.routes.iter()
    }

    /// Builds the concrete path for a named route.
    ///
    /// Returns `None` for an unknown name or a parameter arity mismatch.
    pub fn reverse(&self, name: &str, arg: Option<&str>) -> Option<String> {
        let route = self.routes.iter().find(|route| route.name == name)?;
        match (split_pattern(route.pattern), arg) {
            ((prefix, None), None) => Some(prefix.to_string()),
            ((prefix, Some(suffix)), Some(value)) if !value.is_empty() => {
                Some(format!("{prefix}{value}{suffix}"))
            }
            _ => None,
        }
    }

    /// Matches a concrete path against the table, first declaration wins.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        for route in self.routes {
            match split_pattern(route.pattern) {
                (exact, None) => {
                    if path == exact {
                        return Some(RouteMatch { route, arg: None });
                    }
                }
                (prefix, Some(suffix)) => {
                    if let Some(value) = capture_param(path, prefix, suffix) {
                        return Some(RouteMatch {
                            route,
                            arg: Some(value.to_string()),
                        });
                    }
                }
            }
        }
        None
    }
}

/// Splits a pattern into the part before `<param>` and the part after.
fn split_pattern(pattern: &'static str) -> (&'static str, Option<&'static str>) {
    match (pattern.find('<'), pattern.find('>')) {
        (Some(open), Some(close)) if open < close => {
            (&pattern[..open], Some(&pattern[close + 1..]))
        }
        _ => (pattern, None),
    }
}

fn capture_param<'path>(path: &'path str, prefix: &str, suffix: &str) -> Option<&'path str> {
    let rest = path.strip_prefix(prefix)?;
    let value = rest.strip_suffix(suffix)?;
    if value.is_empty() || value.contains('/') {
        return None;
    }
    Some(value)
}

const AUTH_ROUTES: [Route; 3] = [
    Route {
        name: "login",
        pattern: LOGIN_PATH,
        rule: AccessRule::Public,
    },
    Route {
        name: "logout",
        pattern: "/auth/logout/",
        rule: AccessRule::Public,
    },
    Route {
        name: "signup",
        pattern: "/auth/signup/",
        rule: AccessRule::Public,
    },
];

static NEWS_TABLE: RouteTable = RouteTable {
    app: "news",
    routes: &[
        Route {
            name: "home",
            pattern: "/",
            rule: AccessRule::Public,
        },
        Route {
            name: "detail",
            pattern: "/news/<id>/",
            rule: AccessRule::Public,
        },
        Route {
            name: "edit",
            pattern: "/edit_comment/<id>/",
            rule: AccessRule::Owner,
        },
        Route {
            name: "delete",
            pattern: "/delete_comment/<id>/",
            rule: AccessRule::Owner,
        },
        AUTH_ROUTES[0],
        AUTH_ROUTES[1],
        AUTH_ROUTES[2],
    ],
};

static NOTES_TABLE: RouteTable = RouteTable {
    app: "notes",
    routes: &[
        Route {
            name: "home",
            pattern: "/",
            rule: AccessRule::Public,
        },
        Route {
            name: "list",
            pattern: "/notes/",
            rule: AccessRule::Authenticated,
        },
        Route {
            name: "add",
            pattern: "/add/",
            rule: AccessRule::Authenticated,
        },
        Route {
            name: "success",
            pattern: "/done/",
            rule: AccessRule::Authenticated,
        },
        Route {
            name: "detail",
            pattern: "/note/<slug>/",
            rule: AccessRule::Owner,
        },
        Route {
            name: "edit",
            pattern: "/edit/<slug>/",
            rule: AccessRule::Owner,
        },
        Route {
            name: "delete",
            pattern: "/delete/<slug>/",
            rule: AccessRule::Owner,
        },
        AUTH_ROUTES[0],
        AUTH_ROUTES[1],
        AUTH_ROUTES[2],
    ],
};

/// Route table of the news application.
pub fn news_routes() -> &'static RouteTable {
    &NEWS_TABLE
}

/// Route table of the notes application.
pub fn notes_routes() -> &'static RouteTable {
    &NOTES_TABLE
}
