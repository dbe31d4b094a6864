//! Inbound request model.
//!
//! # Responsibility
//! - Carry method, path, actor identity and submitted form fields.
//!
//! # Invariants
//! - The actor is established by the embedding framework; the core never
//!   reads credentials from the form.

use crate::model::actor::Actor;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Supported request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// Submitted form fields, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: BTreeMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds form data from literal field/value pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut form = Self::new();
        for (field, value) in pairs {
            form.set(*field, *value);
        }
        form
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// One inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Requested path, absolute, as the framework received it.
    pub path: String,
    pub actor: Actor,
    pub form: FormData,
}

impl Request {
    /// Builds a GET request with no form payload.
    pub fn get(path: impl Into<String>, actor: Actor) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            actor,
            form: FormData::new(),
        }
    }

    /// Builds a POST request carrying form fields.
    pub fn post(path: impl Into<String>, actor: Actor, form: FormData) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            actor,
            form,
        }
    }
}
