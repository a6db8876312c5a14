//! WordSource trait — the interface every word pool provider implements.
//!
//! Providers own de-duplication: ids returned by a single `get_words` call are
//! unique (first occurrence wins). Callers never have to dedupe again.

use std::collections::HashSet;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::models::{Difficulty, Language, MissingWord};

pub const CODE_MEMBERSHIP_EXPIRED: &str = "MEMBERSHIP_EXPIRED";
pub const CODE_VIP_REQUIRED: &str = "VIP_REQUIRED";
pub const CODE_UNAUTHORIZED: &str = "UNAUTHORIZED";
pub const CODE_FETCH_FAILED: &str = "FETCH_FAILED";
pub const CODE_INSUFFICIENT_WORDS: &str = "INSUFFICIENT_WORDS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordQuery {
    pub count: usize,
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Word fetch failures. `code()` is stable and matches the wire sentinels.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchError {
    #[error("membership expired")]
    MembershipExpired,

    #[error("membership required")]
    VipRequired,

    #[error("login required")]
    Unauthorized,

    #[error("word fetch failed: {message}")]
    FetchFailed { message: String },

    #[error("not enough words: needed {needed}, got {available}")]
    InsufficientWords { needed: usize, available: usize },

    /// A code the engine has no special handling for; kept verbatim.
    #[error("word source error {code}: {message}")]
    Remote { code: String, message: String },
}

impl FetchError {
    pub fn code(&self) -> &str {
        match self {
            FetchError::MembershipExpired => CODE_MEMBERSHIP_EXPIRED,
            FetchError::VipRequired => CODE_VIP_REQUIRED,
            FetchError::Unauthorized => CODE_UNAUTHORIZED,
            FetchError::FetchFailed { .. } => CODE_FETCH_FAILED,
            FetchError::InsufficientWords { .. } => CODE_INSUFFICIENT_WORDS,
            FetchError::Remote { code, .. } => code,
        }
    }

    /// Map a wire error code (plus optional message) onto a variant.
    pub fn from_code(code: &str, message: Option<&str>) -> Self {
        match code {
            CODE_MEMBERSHIP_EXPIRED => FetchError::MembershipExpired,
            CODE_VIP_REQUIRED => FetchError::VipRequired,
            CODE_UNAUTHORIZED | "Unauthorized" => FetchError::Unauthorized,
            CODE_FETCH_FAILED => FetchError::FetchFailed {
                message: message.unwrap_or_default().to_string(),
            },
            other => FetchError::Remote {
                code: other.to_string(),
                message: message.unwrap_or_default().to_string(),
            },
        }
    }

    /// The presentation layer shows a login prompt for these.
    pub fn requires_login(&self) -> bool {
        matches!(self, FetchError::Unauthorized)
    }

    /// The presentation layer shows a membership prompt for these.
    pub fn requires_membership(&self) -> bool {
        matches!(self, FetchError::MembershipExpired | FetchError::VipRequired)
    }
}

/// Trait that every word pool provider implements.
#[async_trait]
pub trait WordSource: Send + Sync {
    fn name(&self) -> &str;

    /// Draw up to `query.count` words. Returning fewer is not an error here;
    /// the round initializer decides whether a short draw is playable.
    async fn get_words(
        &self,
        query: &WordQuery,
        rng: &mut StdRng,
    ) -> Result<Vec<MissingWord>, FetchError>;
}

/// Drop repeated ids, keeping the first occurrence and the original order.
pub fn dedupe_by_id(words: Vec<MissingWord>) -> Vec<MissingWord> {
    let mut seen = HashSet::new();
    words
        .into_iter()
        .filter(|w| seen.insert(w.id.clone()))
        .collect()
}

/// Uniform draw without replacement: Fisher-Yates shuffle, then truncate.
pub fn sample_words(mut pool: Vec<MissingWord>, count: usize, rng: &mut StdRng) -> Vec<MissingWord> {
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}
