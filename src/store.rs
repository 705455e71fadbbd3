//! Content store: fetched and rendered payloads live here so the model's
//! conversation only ever carries a short reference to them.
//!
//! A `ContentStore` is created per agent run and dropped with it, so a
//! `ContentRef` is only meaningful inside the run that minted it. Keys are
//! random v4 UUIDs and never collide, even across concurrent runs.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque key for a stored payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strip a `KIND:REF|URL` token (or a bare `REF|URL`) the model echoed
    /// back down to the ref itself.
    pub fn normalized(self) -> Self {
        if let Some(token) = ContentToken::parse(&self.0) {
            return token.content_ref;
        }
        match self.0.split_once('|') {
            Some((head, _)) if !head.trim().is_empty() => Self::from(head.trim()),
            _ => self,
        }
    }
}

impl From<&str> for ContentRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ContentRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Default)]
pub struct ContentStore {
    entries: HashMap<ContentRef, String>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload under a freshly minted key.
    pub fn put(&mut self, payload: impl Into<String>) -> ContentRef {
        let mut key = ContentRef::mint();
        while self.entries.contains_key(&key) {
            key = ContentRef::mint();
        }
        self.entries.insert(key.clone(), payload.into());
        key
    }

    /// `None` for refs this store never issued.
    pub fn get(&self, key: &ContentRef) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Where a stored payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Fetched,
    Rendered,
}

impl ContentKind {
    fn label(self) -> &'static str {
        match self {
            ContentKind::Fetched => "FETCHED",
            ContentKind::Rendered => "RENDERED",
        }
    }
}

/// The `KIND:REF|URL` token the loop appends after a fetch or render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentToken {
    pub kind: ContentKind,
    pub content_ref: ContentRef,
    pub url: String,
}

impl ContentToken {
    pub fn new(kind: ContentKind, content_ref: ContentRef, url: impl Into<String>) -> Self {
        Self {
            kind,
            content_ref,
            url: url.into(),
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        let (label, rest) = token.trim().split_once(':')?;
        let kind = match label {
            "FETCHED" => ContentKind::Fetched,
            "RENDERED" => ContentKind::Rendered,
            _ => return None,
        };
        // URLs may contain '|', refs never do.
        let (content_ref, url) = rest.split_once('|')?;
        if content_ref.is_empty() {
            return None;
        }
        Some(Self::new(kind, ContentRef::from(content_ref), url))
    }
}

impl fmt::Display for ContentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}|{}", self.kind.label(), self.content_ref, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_returns_exact_payload() {
        let mut store = ContentStore::new();
        let payload = "  <h1>Title</h1>\n\tbody  ";
        let key = store.put(payload);
        assert_eq!(store.get(&key), Some(payload));
    }

    #[test]
    fn unknown_ref_is_not_found() {
        let mut store = ContentStore::new();
        store.put("something");
        assert_eq!(store.get(&ContentRef::from("never-issued")), None);
    }

    #[test]
    fn keys_are_unique() {
        let mut store = ContentStore::new();
        let a = store.put("same");
        let b = store.put("same");
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn refs_from_another_store_are_not_found() {
        let mut first = ContentStore::new();
        let second = ContentStore::new();
        let key = first.put("payload");
        assert!(second.get(&key).is_none());
    }

    #[test]
    fn token_display_and_parse() {
        let token = ContentToken::new(
            ContentKind::Rendered,
            ContentRef::from("abc-123"),
            "https://example.test/a?b=c|d",
        );
        let text = token.to_string();
        assert_eq!(text, "RENDERED:abc-123|https://example.test/a?b=c|d");
        assert_eq!(ContentToken::parse(&text), Some(token));
    }

    #[test]
    fn normalized_strips_echoed_tokens() {
        let bare = ContentRef::from("abc-123");
        assert_eq!(bare.clone().normalized(), bare);
        assert_eq!(
            ContentRef::from("FETCHED:abc-123|http://a.test/x|y").normalized(),
            bare
        );
        assert_eq!(ContentRef::from("abc-123|http://a.test").normalized(), bare);
        assert_eq!(ContentRef::from(" RENDERED:abc-123|http://a.test ").normalized(), bare);
    }

    #[test]
    fn token_parse_rejects_other_messages() {
        assert!(ContentToken::parse("EXTRACTED:[\"a\"]").is_none());
        assert!(ContentToken::parse("FETCHED:no-separator").is_none());
        assert!(ContentToken::parse("FETCHED:|http://x.test").is_none());
    }
}
