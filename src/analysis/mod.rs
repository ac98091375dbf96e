//! Text analysis: from transcript text to weekly term series.
//!
//! - [`tokenizer`]: Treebank-style English word tokenizer
//! - [`stopwords`]: stop-word lists for the optional filtering variant
//! - [`index`]: per-date n-gram frequency indexes and their store
//! - [`weekly`]: Sunday-bucketed aggregation of tracked terms
//! - [`synonyms`]: merging member-term series into group series

pub mod index;
pub mod stopwords;
pub mod synonyms;
pub mod tokenizer;
pub mod weekly;
