//! English word tokenizer in the Penn Treebank style.
//!
//! Text is lower-cased and split on whitespace; each chunk is then split
//! further the way standard English word tokenizers do it:
//!
//! - punctuation becomes its own token (`,` `;` `:` `!` `?` brackets, quotes,
//!   `$` `%` `&` `#` `@`, ellipses and dashes)
//! - commas, colons and periods between digits stay inside numbers (`1,000`,
//!   `3:30`, `2.5`)
//! - a sentence-final period is split off unless the word is an abbreviation
//!   (`u.s.`, `mr.`)
//! - contractions are split: `don't` -> `do n't`, `it's` -> `it 's`,
//!   `cannot` -> `can not`, `gonna` -> `gon na`
//! - typographic apostrophes and quotes are folded to their ASCII forms

use once_cell::sync::Lazy;
use regex::Regex;

/// Tokens that are nothing but punctuation.
static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\p{L}\p{N}]+$").expect("static regex"));

const CLITICS: &[&str] = &["'s", "'m", "'d", "'ll", "'re", "'ve"];

/// Single words the Treebank tokenizer splits in two.
const SPLIT_WORDS: &[(&str, &str, &str)] = &[
    ("cannot", "can", "not"),
    ("gimme", "gim", "me"),
    ("gonna", "gon", "na"),
    ("gotta", "got", "ta"),
    ("lemme", "lem", "me"),
    ("wanna", "wan", "na"),
    ("d'ye", "d", "'ye"),
];

/// Words whose trailing period belongs to the word.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "jr", "sr", "st", "gen", "gov", "sen", "rep", "lt", "col", "sgt",
    "capt", "adm", "amb", "vs", "etc", "inc", "corp", "dept", "jan", "feb", "mar",
    "apr", "aug", "sept", "oct", "nov", "dec",
];

/// Whether a token consists only of punctuation.
pub fn is_punctuation(token: &str) -> bool {
    PUNCTUATION.is_match(token)
}

/// Split text into lower-cased word and punctuation tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{02BC}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{00AB}' | '\u{00BB}' => '"',
            _ => c,
        })
        .flat_map(char::to_lowercase)
        .collect();

    let mut tokens = Vec::new();
    let mut chunks = normalized.split_whitespace().peekable();
    while let Some(chunk) = chunks.next() {
        let followed = chunks.peek().is_some();
        split_chunk(chunk, followed, &mut tokens);
    }
    tokens
}

fn is_always_split(c: char) -> bool {
    matches!(
        c,
        ';' | '@' | '#' | '$' | '%' | '&' | '?' | '!' | '(' | ')' | '[' | ']' | '{' | '}' | '<'
            | '>' | '"' | '`' | '\u{2026}' | '\u{2013}' | '\u{2014}'
    )
}

/// `followed` is whether another chunk comes after this one; a lone letter
/// keeps its period only then, as an initial.
fn split_chunk(chunk: &str, followed: bool, out: &mut Vec<String>) {
    let chars: Vec<char> = chunk.chars().collect();
    let mut word = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();

        match c {
            c if is_always_split(c) => {
                flush(&mut word, out);
                out.push(c.to_string());
            }
            ',' | ':' => {
                let in_number = prev.is_some_and(|p| p.is_ascii_digit())
                    && next.is_some_and(|n| n.is_ascii_digit());
                if in_number {
                    word.push(c);
                } else {
                    flush(&mut word, out);
                    out.push(c.to_string());
                }
            }
            '-' if next == Some('-') => {
                flush(&mut word, out);
                let run = chars[i..].iter().take_while(|&&d| d == '-').count();
                out.push("-".repeat(run));
                i += run;
                continue;
            }
            '.' => {
                let run = chars[i..].iter().take_while(|&&d| d == '.').count();
                if run > 1 {
                    flush(&mut word, out);
                    out.push(".".repeat(run));
                    i += run;
                    continue;
                }
                let word_continues = next.is_some_and(|n| n.is_alphanumeric());
                if word_continues || is_abbreviation(&word, followed) {
                    word.push('.');
                } else {
                    flush(&mut word, out);
                    out.push(".".to_string());
                }
            }
            '\'' => {
                let inside_word = !word.is_empty() && next.is_some_and(|n| n.is_alphanumeric());
                if inside_word {
                    word.push('\'');
                } else if word.is_empty() && next.is_some_and(|n| n.is_alphanumeric()) {
                    // opening quote or a leading clitic like 'em
                    out.push("'".to_string());
                } else {
                    flush(&mut word, out);
                    out.push("'".to_string());
                }
            }
            _ => word.push(c),
        }
        i += 1;
    }
    flush(&mut word, out);
}

fn is_abbreviation(word: &str, followed: bool) -> bool {
    !word.is_empty()
        && (word.contains('.')
            || ABBREVIATIONS.contains(&word)
            || (followed && word.chars().count() == 1 && word.chars().all(char::is_alphabetic)))
}

fn flush(word: &mut String, out: &mut Vec<String>) {
    if word.is_empty() {
        return;
    }
    let word = std::mem::take(word);
    out.extend(split_contraction(word));
}

fn split_contraction(word: String) -> Vec<String> {
    if let Some(&(_, head, tail)) = SPLIT_WORDS.iter().find(|(w, _, _)| *w == word) {
        return vec![head.to_string(), tail.to_string()];
    }
    if word.len() > 3 && word.ends_with("n't") {
        let stem = &word[..word.len() - 3];
        return vec![stem.to_string(), "n't".to_string()];
    }
    if let Some(pos) = word.rfind('\'').filter(|&p| p > 0) {
        if CLITICS.contains(&&word[pos..]) {
            return vec![word[..pos].to_string(), word[pos..].to_string()];
        }
    }
    vec![word]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(text: &str) -> Vec<String> {
        tokenize(text)
    }

    #[test]
    fn test_sentence_punctuation_is_split() {
        assert_eq!(toks("Hello world. Hello again!"), vec!["hello", "world", ".", "hello", "again", "!"]);
    }

    #[test]
    fn test_contractions() {
        assert_eq!(toks("Don't"), vec!["do", "n't"]);
        assert_eq!(toks("can't"), vec!["ca", "n't"]);
        assert_eq!(toks("It's what we'll do, I'm sure."), vec!["it", "'s", "what", "we", "'ll", "do", ",", "i", "'m", "sure", "."]);
        assert_eq!(toks("They've said they'd go"), vec!["they", "'ve", "said", "they", "'d", "go"]);
        assert_eq!(toks("We cannot"), vec!["we", "can", "not"]);
        assert_eq!(toks("gonna"), vec!["gon", "na"]);
    }

    #[test]
    fn test_typographic_apostrophes_fold() {
        assert_eq!(toks("President’s plan"), vec!["president", "'s", "plan"]);
        assert_eq!(toks("“Yes,” he said."), vec!["\"", "yes", ",", "\"", "he", "said", "."]);
    }

    #[test]
    fn test_numbers_keep_internal_separators() {
        assert_eq!(toks("1,000 troops by 3:30, or 2.5%"), vec!["1,000", "troops", "by", "3:30", ",", "or", "2.5", "%"]);
        assert_eq!(toks("$5 million"), vec!["$", "5", "million"]);
    }

    #[test]
    fn test_abbreviations_keep_their_period() {
        assert_eq!(toks("Mr. Earnest"), vec!["mr.", "earnest"]);
        assert_eq!(toks("the U.S. said"), vec!["the", "u.s.", "said"]);
        assert_eq!(toks("in the U.S."), vec!["in", "the", "u.s."]);
    }

    #[test]
    fn test_initials_keep_period_but_final_letter_does_not() {
        assert_eq!(toks("John F. Kennedy"), vec!["john", "f.", "kennedy"]);
        assert_eq!(toks("There is no Plan B."), vec!["there", "is", "no", "plan", "b", "."]);
        assert_eq!(toks("So am I."), vec!["so", "am", "i", "."]);
    }

    #[test]
    fn test_dashes_and_ellipses() {
        assert_eq!(toks("well--maybe"), vec!["well", "--", "maybe"]);
        assert_eq!(toks("well — maybe…"), vec!["well", "—", "maybe", "…"]);
        assert_eq!(toks("so..."), vec!["so", "..."]);
        assert_eq!(toks("cease-fire"), vec!["cease-fire"]);
    }

    #[test]
    fn test_quotes_and_brackets() {
        assert_eq!(toks("(Laughter.)"), vec!["(", "laughter", ".", ")"]);
        assert_eq!(toks("reporters' questions"), vec!["reporters", "'", "questions"]);
        assert_eq!(toks("'tis"), vec!["'", "tis"]);
    }

    #[test]
    fn test_is_punctuation() {
        assert!(is_punctuation("."));
        assert!(is_punctuation("--"));
        assert!(is_punctuation("…"));
        assert!(!is_punctuation("n't"));
        assert!(!is_punctuation("'s"));
        assert!(!is_punctuation("1,000"));
    }
}
