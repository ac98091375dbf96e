//! Built-in English stop-word list.
//!
//! The common NLTK English list, including the clitic and negation fragments
//! the tokenizer produces (`'s`, `n't`) so filtered output has no dangling
//! contraction halves.

use std::collections::HashSet;

use crate::config::StopwordSetting;

pub const ENGLISH: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "should", "now", "'s", "'m", "'d", "'ll", "'re", "'ve", "n't",
];

/// Resolve a stop-word setting into the set of words to drop.
pub fn resolve(setting: &StopwordSetting) -> HashSet<String> {
    match setting {
        StopwordSetting::None => HashSet::new(),
        StopwordSetting::English => ENGLISH.iter().map(|w| w.to_string()).collect(),
        StopwordSetting::Custom(words) => words.iter().map(|w| w.trim().to_lowercase()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_settings() {
        assert!(resolve(&StopwordSetting::None).is_empty());
        let english = resolve(&StopwordSetting::English);
        assert!(english.contains("the"));
        assert!(english.contains("n't"));
        assert!(!english.contains("ukraine"));
        let custom = resolve(&StopwordSetting::Custom(vec![" The ".to_string()]));
        assert_eq!(custom.into_iter().collect::<Vec<_>>(), vec!["the"]);
    }
}
