//! Remote word source backed by the `get-words` edge function.
//!
//! The HTTP layer is injected through [`WordTransport`]; this module owns the
//! request/response envelope and the error-code mapping.

use async_trait::async_trait;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::engine::models::{Difficulty, Language, MissingWord};
use crate::words::source::{dedupe_by_id, FetchError, WordQuery, WordSource};

pub const DEFAULT_FUNCTION: &str = "get-words";

/// Request body sent to the edge function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collection_ids: Vec<String>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl FetchRequest {
    /// A single collection goes out as `collection_id`, several as `collection_ids`.
    pub fn new(collections: &[String], count: usize, difficulty: Option<Difficulty>) -> Self {
        match collections {
            [single] => Self {
                collection_id: Some(single.clone()),
                collection_ids: Vec::new(),
                count,
                difficulty,
            },
            many => Self {
                collection_id: None,
                collection_ids: many.to_vec(),
                count,
                difficulty,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteWord {
    pub id: serde_json::Value,
    #[serde(alias = "text")]
    pub word: String,
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<RemoteWord>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Invokes a named backend function with a JSON body.
#[async_trait]
pub trait WordTransport: Send + Sync {
    async fn invoke(
        &self,
        function: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, FetchError>;
}

pub struct RemoteWordSource<T: WordTransport> {
    transport: T,
    function: String,
    collections: Vec<String>,
    /// Language tag for words whose payload does not carry one.
    default_language: Language,
}

impl<T: WordTransport> RemoteWordSource<T> {
    pub fn new(transport: T, collections: Vec<String>, default_language: Language) -> Self {
        Self {
            transport,
            function: DEFAULT_FUNCTION.to_string(),
            collections,
            default_language,
        }
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    /// `None` for entries without a usable scalar id.
    fn convert(&self, word: RemoteWord, query: &WordQuery) -> Option<MissingWord> {
        let id = match word.id {
            serde_json::Value::String(s) if !s.is_empty() => s,
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                tracing::warn!(id = %other, text = %word.word, "skipping remote word without a usable id");
                return None;
            }
        };
        Some(MissingWord {
            id,
            text: word.word,
            language: word
                .language
                .or(query.language)
                .unwrap_or(self.default_language),
            category: word.category.or_else(|| query.category.clone()),
        })
    }
}

/// Turn a raw edge-function reply into words or a mapped error.
pub fn parse_response(body: serde_json::Value) -> Result<Vec<RemoteWord>, FetchError> {
    let response: FetchResponse = serde_json::from_value(body).map_err(|e| FetchError::FetchFailed {
        message: format!("invalid response: {}", e),
    })?;
    if !response.success {
        let code = response.error.as_deref().unwrap_or(crate::words::source::CODE_FETCH_FAILED);
        return Err(FetchError::from_code(code, response.message.as_deref()));
    }
    Ok(response.data)
}

#[async_trait]
impl<T: WordTransport> WordSource for RemoteWordSource<T> {
    fn name(&self) -> &str {
        "remote"
    }

    async fn get_words(
        &self,
        query: &WordQuery,
        _rng: &mut StdRng,
    ) -> Result<Vec<MissingWord>, FetchError> {
        let request = FetchRequest::new(&self.collections, query.count, query.difficulty);
        let body = serde_json::to_value(&request).map_err(|e| FetchError::FetchFailed {
            message: e.to_string(),
        })?;

        let reply = self.transport.invoke(&self.function, body).await;
        let data = match reply.and_then(parse_response) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(function = %self.function, code = e.code(), error = %e, "word fetch failed");
                return Err(e);
            }
        };

        let mut words: Vec<MissingWord> = data.into_iter().filter_map(|w| self.convert(w, query)).collect();
        words = dedupe_by_id(words);
        words.truncate(query.count);
        tracing::debug!(function = %self.function, count = words.len(), "fetched remote words");
        Ok(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::sync::Mutex;

    /// Replays a canned reply and records the bodies it was sent.
    struct CannedTransport {
        reply: Result<serde_json::Value, FetchError>,
        sent: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl CannedTransport {
        fn new(reply: Result<serde_json::Value, FetchError>) -> Self {
            Self { reply, sent: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl WordTransport for CannedTransport {
        async fn invoke(
            &self,
            function: &str,
            body: serde_json::Value,
        ) -> Result<serde_json::Value, FetchError> {
            self.sent.lock().unwrap().push((function.to_string(), body));
            self.reply.clone()
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    #[test]
    fn test_request_shape() {
        let single = serde_json::to_value(FetchRequest::new(&["c1".into()], 7, None)).unwrap();
        assert_eq!(single, serde_json::json!({"collection_id": "c1", "count": 7}));

        let many = serde_json::to_value(FetchRequest::new(
            &["c1".into(), "c2".into()],
            4,
            Some(Difficulty::Easy),
        ))
        .unwrap();
        assert_eq!(
            many,
            serde_json::json!({"collection_ids": ["c1", "c2"], "count": 4, "difficulty": "easy"})
        );
    }

    #[tokio::test]
    async fn test_success_maps_and_dedupes() {
        let transport = CannedTransport::new(Ok(serde_json::json!({
            "success": true,
            "data": [
                {"id": 1, "word": "猫"},
                {"id": "2", "text": "dog", "language": "english", "category": "animal"},
                {"id": 1, "word": "again"}
            ]
        })));
        let source = RemoteWordSource::new(transport, vec!["c1".into()], Language::Chinese);
        let q = WordQuery { count: 5, ..Default::default() };
        let words = source.get_words(&q, &mut rng()).await.unwrap();

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].id, "1");
        assert_eq!(words[0].text, "猫");
        assert_eq!(words[0].language, Language::Chinese);
        assert_eq!(words[1].language, Language::English);
        assert_eq!(words[1].category.as_deref(), Some("animal"));

        let sent = source.transport.sent.lock().unwrap();
        assert_eq!(sent[0].0, DEFAULT_FUNCTION);
        assert_eq!(sent[0].1["count"], 5);
    }

    #[tokio::test]
    async fn test_entries_without_scalar_id_skipped() {
        let transport = CannedTransport::new(Ok(serde_json::json!({
            "success": true,
            "data": [
                {"id": null, "word": "a"},
                {"id": null, "word": "b"},
                {"id": "", "word": "c"},
                {"id": {"nested": 1}, "word": "d"},
                {"id": 7, "word": "e"}
            ]
        })));
        let source = RemoteWordSource::new(transport, vec!["c1".into()], Language::English);
        let q = WordQuery { count: 5, ..Default::default() };
        let words = source.get_words(&q, &mut rng()).await.unwrap();

        assert_eq!(words.len(), 1);
        assert_eq!(words[0].id, "7");
        assert_eq!(words[0].text, "e");
    }

    #[tokio::test]
    async fn test_sentinel_errors_surface_unchanged() {
        for (code, expected) in [
            ("MEMBERSHIP_EXPIRED", FetchError::MembershipExpired),
            ("VIP_REQUIRED", FetchError::VipRequired),
            ("Unauthorized", FetchError::Unauthorized),
            ("UNAUTHORIZED", FetchError::Unauthorized),
        ] {
            let transport = CannedTransport::new(Ok(serde_json::json!({
                "success": false,
                "error": code,
                "message": "nope"
            })));
            let source = RemoteWordSource::new(transport, vec![], Language::English);
            let err = source
                .get_words(&WordQuery { count: 3, ..Default::default() }, &mut rng())
                .await
                .unwrap_err();
            assert_eq!(err, expected);
        }
    }

    #[tokio::test]
    async fn test_transport_and_parse_failures() {
        let transport = CannedTransport::new(Err(FetchError::FetchFailed { message: "offline".into() }));
        let source = RemoteWordSource::new(transport, vec![], Language::English);
        let err = source
            .get_words(&WordQuery { count: 3, ..Default::default() }, &mut rng())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "FETCH_FAILED");

        assert!(matches!(
            parse_response(serde_json::json!({"success": false})),
            Err(FetchError::FetchFailed { .. })
        ));
        assert!(matches!(
            parse_response(serde_json::json!({"success": true, "data": "oops"})),
            Err(FetchError::FetchFailed { .. })
        ));
    }
}
