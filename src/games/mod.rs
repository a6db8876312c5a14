pub mod missing_words;
