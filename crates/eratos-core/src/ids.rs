//! Identifier generation for new document items.
//!
//! Ids look like `<document-id>/<Category>/<key>/<slug>`. The key is a random UUIDv4 written in
//! base 62, least-significant digit first, so independent clients never need to coordinate.

use regex::Regex;
use std::collections::VecDeque;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

fn invalid_id_chars_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[^-a-zA-Z0-9$_@.&!*"'|,%]"#).expect("valid regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Events,
    Entities,
    Relations,
    Participants,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Events => "Events",
            Self::Entities => "Entities",
            Self::Relations => "Relations",
            Self::Participants => "Participants",
        }
    }
}

/// Base-62 digits of `n`, least significant first. Zero encodes as the empty string.
pub fn base62(mut n: u128) -> String {
    let mut out = String::new();
    while n > 0 {
        out.push(ALPHABET[(n % 62) as usize] as char);
        n /= 62;
    }
    out
}

/// Digest bytes read as a little-endian integer, then written in base 62.
pub fn digest_to_base62(bytes: &[u8]) -> String {
    let mut buf = [0u8; 16];
    let n = bytes.len().min(16);
    buf[..n].copy_from_slice(&bytes[..n]);
    base62(u128::from_le_bytes(buf))
}

/// `name` with spaces as `_` and any character not allowed in ids as `$`.
pub fn slugify(name: &str) -> String {
    let spaced = name.trim().replace(' ', "_");
    invalid_id_chars_regex().replace_all(&spaced, regex::NoExpand("$")).into_owned()
}

#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    seed_keys: VecDeque<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the given keys first, in order, before falling back to random ones.
    pub fn with_seed_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            seed_keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn next_key(&mut self) -> String {
        if let Some(key) = self.seed_keys.pop_front() {
            return key;
        }
        digest_to_base62(uuid::Uuid::new_v4().as_bytes())
    }

    pub fn make_id(&mut self, document_id: &str, category: Category, name: &str) -> String {
        format!(
            "{document_id}/{}/{}/{}",
            category.as_str(),
            self.next_key(),
            slugify(name)
        )
    }

    /// Like [`IdGenerator::make_id`], retrying until `taken` reports the id as free.
    pub fn fresh_id(
        &mut self,
        document_id: &str,
        category: Category,
        name: &str,
        taken: impl Fn(&str) -> bool,
    ) -> String {
        loop {
            let id = self.make_id(document_id, category, name);
            if !taken(&id) {
                return id;
            }
            tracing::trace!(%id, "generated id already in use; retrying");
        }
    }
}
