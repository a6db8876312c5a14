//! Local word pools: built-in Chinese, English and letter lists, or a custom
//! pool loaded from TOML.
//!
//! TOML layout:
//!
//! ```toml
//! [[words]]
//! id = "zh-fruit-apple"
//! text = "苹果"
//! language = "chinese"
//! category = "fruit"
//! ```

use std::path::Path;

use async_trait::async_trait;
use rand::rngs::StdRng;
use serde::Deserialize;

use crate::engine::models::{Language, MissingWord};
use crate::words::source::{dedupe_by_id, sample_words, FetchError, WordQuery, WordSource};

/// Category name that selects the alphabet pool instead of a word pool.
pub const LETTERS_CATEGORY: &str = "letters";

const CHINESE_WORDS: &[(&str, &str, &str)] = &[
    ("zh-fruit-apple", "苹果", "fruit"),
    ("zh-fruit-banana", "香蕉", "fruit"),
    ("zh-fruit-watermelon", "西瓜", "fruit"),
    ("zh-fruit-grape", "葡萄", "fruit"),
    ("zh-fruit-strawberry", "草莓", "fruit"),
    ("zh-fruit-orange", "橙子", "fruit"),
    ("zh-animal-cat", "小猫", "animal"),
    ("zh-animal-dog", "小狗", "animal"),
    ("zh-animal-rabbit", "兔子", "animal"),
    ("zh-animal-tiger", "老虎", "animal"),
    ("zh-animal-panda", "熊猫", "animal"),
    ("zh-animal-elephant", "大象", "animal"),
    ("zh-animal-fish", "小鱼", "animal"),
    ("zh-nature-sun", "太阳", "nature"),
    ("zh-nature-moon", "月亮", "nature"),
    ("zh-nature-star", "星星", "nature"),
    ("zh-nature-flower", "花朵", "nature"),
    ("zh-nature-tree", "大树", "nature"),
    ("zh-nature-mountain", "高山", "nature"),
    ("zh-nature-rain", "下雨", "nature"),
    ("zh-color-red", "红色", "color"),
    ("zh-color-blue", "蓝色", "color"),
    ("zh-color-yellow", "黄色", "color"),
    ("zh-color-green", "绿色", "color"),
    ("zh-vehicle-car", "汽车", "vehicle"),
    ("zh-vehicle-plane", "飞机", "vehicle"),
    ("zh-vehicle-train", "火车", "vehicle"),
    ("zh-vehicle-boat", "小船", "vehicle"),
    ("zh-school-book", "书本", "school"),
    ("zh-school-pencil", "铅笔", "school"),
    ("zh-school-teacher", "老师", "school"),
    ("zh-school-friend", "朋友", "school"),
];

const ENGLISH_WORDS: &[(&str, &str, &str)] = &[
    ("en-fruit-apple", "apple", "fruit"),
    ("en-fruit-banana", "banana", "fruit"),
    ("en-fruit-grape", "grape", "fruit"),
    ("en-fruit-pear", "pear", "fruit"),
    ("en-fruit-lemon", "lemon", "fruit"),
    ("en-fruit-peach", "peach", "fruit"),
    ("en-animal-cat", "cat", "animal"),
    ("en-animal-dog", "dog", "animal"),
    ("en-animal-duck", "duck", "animal"),
    ("en-animal-pig", "pig", "animal"),
    ("en-animal-cow", "cow", "animal"),
    ("en-animal-fox", "fox", "animal"),
    ("en-animal-bird", "bird", "animal"),
    ("en-nature-sun", "sun", "nature"),
    ("en-nature-moon", "moon", "nature"),
    ("en-nature-star", "star", "nature"),
    ("en-nature-tree", "tree", "nature"),
    ("en-nature-rain", "rain", "nature"),
    ("en-nature-snow", "snow", "nature"),
    ("en-color-red", "red", "color"),
    ("en-color-blue", "blue", "color"),
    ("en-color-pink", "pink", "color"),
    ("en-color-green", "green", "color"),
    ("en-home-bed", "bed", "home"),
    ("en-home-cup", "cup", "home"),
    ("en-home-door", "door", "home"),
    ("en-home-lamp", "lamp", "home"),
    ("en-school-book", "book", "school"),
    ("en-school-pen", "pen", "school"),
    ("en-school-bag", "bag", "school"),
];

fn builtin(table: &[(&str, &str, &str)], language: Language) -> Vec<MissingWord> {
    table
        .iter()
        .map(|&(id, text, category)| MissingWord {
            id: id.to_string(),
            text: text.to_string(),
            language,
            category: Some(category.to_string()),
        })
        .collect()
}

fn letters() -> Vec<MissingWord> {
    ('A'..='Z')
        .map(|c| MissingWord {
            id: format!("letter-{}", c.to_ascii_lowercase()),
            text: c.to_string(),
            language: Language::English,
            category: Some(LETTERS_CATEGORY.to_string()),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct WordPoolFile {
    #[serde(default)]
    words: Vec<MissingWord>,
}

/// In-memory word pool. Deterministic for a given rng seed.
#[derive(Debug, Clone)]
pub struct LocalWordSource {
    words: Vec<MissingWord>,
    letters: Vec<MissingWord>,
}

impl LocalWordSource {
    /// Built-in Chinese + English + letters pools.
    pub fn builtin() -> Self {
        let mut words = builtin(CHINESE_WORDS, Language::Chinese);
        words.extend(builtin(ENGLISH_WORDS, Language::English));
        Self::from_words(words)
    }

    /// Custom pool. Words whose category is `letters` form the letter pool.
    pub fn from_words(words: Vec<MissingWord>) -> Self {
        let (letter_words, words): (Vec<_>, Vec<_>) = dedupe_by_id(words)
            .into_iter()
            .partition(|w| w.category.as_deref() == Some(LETTERS_CATEGORY));
        let letters = if letter_words.is_empty() { letters() } else { letter_words };
        Self { words, letters }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        let file: WordPoolFile =
            toml::from_str(content).map_err(|e| format!("Failed to parse word pool: {}", e))?;
        if file.words.is_empty() {
            return Err("word pool has no [[words]] entries".into());
        }
        Ok(Self::from_words(file.words))
    }

    /// Load a pool from a TOML file at the given path.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let source = Self::from_toml_str(&content)
            .map_err(|e| format!("{} ({})", e, path.display()))?;
        tracing::info!(path = %path.display(), count = source.words.len(), "loaded word pool");
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Every candidate matching the query filters, before sampling.
    pub fn candidates(&self, query: &WordQuery) -> Vec<MissingWord> {
        if query.category.as_deref() == Some(LETTERS_CATEGORY) {
            return self.letters.clone();
        }
        self.words
            .iter()
            .filter(|w| query.language.map_or(true, |lang| w.language == lang))
            .filter(|w| {
                query
                    .category
                    .as_deref()
                    .map_or(true, |cat| w.category.as_deref() == Some(cat))
            })
            .cloned()
            .collect()
    }
}

impl Default for LocalWordSource {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl WordSource for LocalWordSource {
    fn name(&self) -> &str {
        "local"
    }

    async fn get_words(
        &self,
        query: &WordQuery,
        rng: &mut StdRng,
    ) -> Result<Vec<MissingWord>, FetchError> {
        let pool = self.candidates(query);
        if pool.len() < query.count {
            tracing::debug!(
                requested = query.count,
                available = pool.len(),
                "local pool smaller than requested draw"
            );
        }
        Ok(sample_words(pool, query.count, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn query(count: usize) -> WordQuery {
        WordQuery { count, ..Default::default() }
    }

    #[tokio::test]
    async fn test_builtin_draw_is_unique() {
        let source = LocalWordSource::builtin();
        let mut rng = StdRng::seed_from_u64(42);
        let words = source.get_words(&query(10), &mut rng).await.unwrap();
        assert_eq!(words.len(), 10);
        let ids: HashSet<_> = words.iter().map(|w| &w.id).collect();
        assert_eq!(ids.len(), 10);
    }

    #[tokio::test]
    async fn test_same_seed_same_draw() {
        let source = LocalWordSource::builtin();
        let q = WordQuery { count: 6, language: Some(Language::Chinese), ..Default::default() };
        let a = source.get_words(&q, &mut StdRng::seed_from_u64(3)).await.unwrap();
        let b = source.get_words(&q, &mut StdRng::seed_from_u64(3)).await.unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|w| w.language == Language::Chinese));
    }

    #[tokio::test]
    async fn test_letters_and_category_filters() {
        let source = LocalWordSource::builtin();
        let mut rng = StdRng::seed_from_u64(9);

        let q = WordQuery { count: 5, category: Some(LETTERS_CATEGORY.into()), ..Default::default() };
        let letters = source.get_words(&q, &mut rng).await.unwrap();
        assert_eq!(letters.len(), 5);
        assert!(letters.iter().all(|w| w.text.len() == 1));

        let q = WordQuery {
            count: 50,
            language: Some(Language::English),
            category: Some("animal".into()),
            ..Default::default()
        };
        let animals = source.get_words(&q, &mut rng).await.unwrap();
        assert_eq!(animals.len(), 7);
        assert!(animals.iter().all(|w| w.category.as_deref() == Some("animal")));

        let q = WordQuery { count: 3, category: Some("dinosaur".into()), ..Default::default() };
        assert!(source.get_words(&q, &mut rng).await.unwrap().is_empty());
    }

    #[test]
    fn test_toml_pool() {
        let source = LocalWordSource::from_toml_str(
            r#"
            [[words]]
            id = "a"
            text = "apple"
            language = "english"
            category = "fruit"

            [[words]]
            id = "a"
            text = "duplicate"
            language = "english"

            [[words]]
            id = "b"
            text = "香蕉"
            language = "chinese"
            "#,
        )
        .unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.candidates(&query(10))[0].text, "apple");
        // No custom letters: the built-in alphabet stays available.
        let q = WordQuery { count: 26, category: Some(LETTERS_CATEGORY.into()), ..Default::default() };
        assert_eq!(source.candidates(&q).len(), 26);
    }

    #[test]
    fn test_toml_pool_errors() {
        assert!(LocalWordSource::from_toml_str("words = []").is_err());
        assert!(LocalWordSource::from_toml_str("[[words]]\nid = 1").is_err());
    }
}
