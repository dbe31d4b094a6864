//! Slug derivation and uniqueness resolution for notes.
//!
//! # Responsibility
//! - Derive a URL-safe slug from a note title, transliterating Cyrillic.
//! - Validate caller-provided slugs and probe the store for collisions.
//!
//! # Invariants
//! - Resolution never writes; a rejection leaves the store untouched.
//! - Derived slugs are drawn from `[a-z0-9_-]` and fit the slug length
//!   limit of the note model.
//! - Error `Display` texts are the exact user-facing form messages.

use crate::model::note::{validate_slug, NoteId, NOTE_SLUG_MAX_LEN};
use crate::repo::note_repo::SlugIndex;
use crate::repo::RepoError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use unicode_normalization::UnicodeNormalization;

/// Suffix appended to a colliding slug in the rejection message.
pub const SLUG_TAKEN_WARNING: &str =
    " - такой slug уже существует, придумайте уникальное значение!";

/// Rejection message for a malformed caller-provided slug.
pub const SLUG_FORMAT_MESSAGE: &str =
    "Значение должно состоять только из латинских букв, цифр, знаков подчеркивания или дефиса.";

static NON_SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_]+").expect("valid pattern"));

/// Derives a slug from a free-form title.
///
/// NFC-folds and lowercases the title, transliterates Cyrillic letters to
/// Latin, collapses every other non-alphanumeric run to one hyphen, trims
/// hyphens and truncates to the slug length limit.
pub fn slugify(title: &str) -> String {
    let folded = title.nfc().collect::<String>().to_lowercase();

    let mut latin = String::with_capacity(folded.len());
    for ch in folded.chars() {
        match transliterate(ch) {
            Some(mapped) => latin.push_str(mapped),
            None => latin.push(ch),
        }
    }

    // All non-ASCII leftovers collapse here, so the result is pure ASCII
    // and byte truncation below cannot split a character.
    let collapsed = NON_SLUG_RE.replace_all(&latin, "-");
    let mut slug = collapsed.trim_matches('-').to_string();
    if slug.len() > NOTE_SLUG_MAX_LEN {
        slug.truncate(NOTE_SLUG_MAX_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

fn transliterate(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(mapped)
}

/// Errors from slug resolution.
///
/// `Display` renders the exact message shown on the `slug` form field.
#[derive(Debug)]
pub enum SlugResolveError {
    /// Another note already uses this slug.
    Taken(String),
    /// The slug does not match `[A-Za-z0-9_-]{1,100}`.
    Invalid(String),
    /// The uniqueness probe failed.
    Repo(RepoError),
}

impl Display for SlugResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Taken(slug) => write!(f, "{slug}{SLUG_TAKEN_WARNING}"),
            Self::Invalid(_) => write!(f, "{SLUG_FORMAT_MESSAGE}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SlugResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Taken(_) | Self::Invalid(_) => None,
        }
    }
}

impl From<RepoError> for SlugResolveError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Resolves the slug for a note create or update.
///
/// A non-empty `requested` slug must already be well-formed; an empty or
/// absent one is derived from `title`. Either way the result must not be
/// used by any note except `exclude`.
pub fn resolve(
    index: &dyn SlugIndex,
    requested: Option<&str>,
    title: &str,
    exclude: Option<NoteId>,
) -> Result<String, SlugResolveError> {
    let slug = match requested.map(str::trim) {
        Some(value) if !value.is_empty() => {
            if validate_slug(value).is_err() {
                return Err(SlugResolveError::Invalid(value.to_string()));
            }
            value.to_string()
        }
        _ => {
            let derived = slugify(title);
            if validate_slug(&derived).is_err() {
                return Err(SlugResolveError::Invalid(derived));
            }
            derived
        }
    };

    if index.slug_exists(&slug, exclude)? {
        return Err(SlugResolveError::Taken(slug));
    }

    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::{resolve, slugify, SlugResolveError, SLUG_FORMAT_MESSAGE};
    use crate::model::note::NoteId;
    use crate::repo::note_repo::SlugIndex;
    use crate::repo::RepoResult;
    use uuid::Uuid;

    struct FakeIndex {
        taken: Vec<(String, NoteId)>,
    }

    impl FakeIndex {
        fn new(taken: &[(&str, NoteId)]) -> Self {
            Self {
                taken: taken
                    .iter()
                    .map(|(slug, id)| (slug.to_string(), *id))
                    .collect(),
            }
        }

        fn empty() -> Self {
            Self { taken: Vec::new() }
        }
    }

    impl SlugIndex for FakeIndex {
        fn slug_exists(&self, slug: &str, exclude: Option<NoteId>) -> RepoResult<bool> {
            Ok(self
                .taken
                .iter()
                .any(|(taken, id)| taken == slug && Some(*id) != exclude))
        }
    }

    #[test]
    fn slugify_transliterates_cyrillic_titles() {
        assert_eq!(slugify("Какой-то заголовок"), "kakoj-to-zagolovok");
        assert_eq!(slugify("Ёжик в тумане!"), "ezhik-v-tumane");
        assert_eq!(slugify("Объём и щука"), "obem-i-schuka");
    }

    #[test]
    fn slugify_collapses_punctuation_and_keeps_underscores() {
        assert_eq!(slugify("Hello,  World"), "hello-world");
        assert_eq!(slugify("note_1 (draft)"), "note_1-draft");
        assert_eq!(slugify("--x--"), "x");
    }

    #[test]
    fn slugify_folds_decomposed_input() {
        assert_eq!(slugify("Е\u{0308}лка"), "elka");
    }

    #[test]
    fn slugify_truncates_long_titles() {
        let slug = slugify(&"слово ".repeat(40));
        assert!(slug.len() <= 100);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("slovo-slovo"));
    }

    #[test]
    fn resolve_derives_from_title_when_slug_absent() {
        let index = FakeIndex::empty();
        let slug = resolve(&index, None, "Какой-то заголовок", None).unwrap();
        assert_eq!(slug, "kakoj-to-zagolovok");
        let slug = resolve(&index, Some("   "), "Какой-то заголовок", None).unwrap();
        assert_eq!(slug, "kakoj-to-zagolovok");
    }

    #[test]
    fn resolve_prefers_requested_slug() {
        let index = FakeIndex::empty();
        let slug = resolve(&index, Some("my-slug"), "Заголовок", None).unwrap();
        assert_eq!(slug, "my-slug");
    }

    #[test]
    fn resolve_rejects_malformed_requested_slug() {
        let index = FakeIndex::empty();
        for bad in ["про бел", "кириллица", "semi;colon"] {
            let err = resolve(&index, Some(bad), "Заголовок", None).unwrap_err();
            assert!(matches!(err, SlugResolveError::Invalid(_)));
            assert_eq!(err.to_string(), SLUG_FORMAT_MESSAGE);
        }
    }

    #[test]
    fn resolve_rejects_collision_with_exact_warning() {
        let index = FakeIndex::new(&[("busy", Uuid::new_v4())]);
        let err = resolve(&index, Some("busy"), "Заголовок", None).unwrap_err();
        assert!(matches!(err, SlugResolveError::Taken(_)));
        assert_eq!(
            err.to_string(),
            "busy - такой slug уже существует, придумайте уникальное значение!"
        );
    }

    #[test]
    fn resolve_rejects_derived_collision_too() {
        let index = FakeIndex::new(&[("zagolovok", Uuid::new_v4())]);
        let err = resolve(&index, None, "Заголовок", None).unwrap_err();
        assert!(matches!(err, SlugResolveError::Taken(slug) if slug == "zagolovok"));
    }

    #[test]
    fn resolve_excludes_the_note_being_updated() {
        let own_id = Uuid::new_v4();
        let index = FakeIndex::new(&[("mine", own_id)]);
        let slug = resolve(&index, Some("mine"), "Заголовок", Some(own_id)).unwrap();
        assert_eq!(slug, "mine");
    }

    #[test]
    fn resolve_rejects_unsluggable_title() {
        let index = FakeIndex::empty();
        let err = resolve(&index, None, "!!!", None).unwrap_err();
        assert!(matches!(err, SlugResolveError::Invalid(_)));
    }
}
