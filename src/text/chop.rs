//! Word-budget chopping for episode summaries.
//!
//! Tokenized sequences have to fit the model's context budget, so overly
//! long summaries are cut down to `max_num_words` words before encoding.
//! The cut can be unconditional or restricted to sentence boundaries.

/// Common English abbreviations that end in a period but do not end a
/// sentence. Matched case-insensitively against whole words.
const ABBREVIATIONS: &[&str] = &[
    "Dr.", "Lt.", "Mr.", "Capt.", "Cmdr.", "Jr.", "Ms.", "Mrs.", "Sgt.", "Sr.", "pt.", "no.",
    "Ltd.", "inc.", "Gov.", "dept.", "div.", "est.", "Cpl.", "Corp.", "Col.", "Comdr.", "Ave.",
    "St.", "Ser.", "mt.", "mts.", "Assn.", "Cdr.",
];

/// How oversized summaries are cut down before tokenization.
///
/// Selected once per tokenizer instance and immutable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChopPolicy {
    /// Cut only at the end of a sentence. If no sentence boundary falls
    /// inside the word budget the text is unchoppable and the record is
    /// dropped (strict variant: [`ChopPolicy::apply`] returns `None`).
    AtSentenceEnd,
    /// Cut after exactly `max_num_words` words, mid-sentence if need be.
    Fixed,
    /// Never cut; `max_num_words` has no effect.
    Ignore,
}

impl ChopPolicy {
    /// Bound `text` to at most `max_num_words` whitespace-separated words.
    ///
    /// Returns `None` only under [`ChopPolicy::AtSentenceEnd`] when no safe
    /// cut point exists. Callers treat that as "drop this record", not as
    /// an error.
    pub fn apply(&self, text: &str, max_num_words: usize) -> Option<String> {
        match self {
            ChopPolicy::Ignore => Some(text.to_string()),
            ChopPolicy::Fixed => {
                let words: Vec<&str> = text.split_whitespace().collect();
                if words.len() <= max_num_words {
                    Some(text.to_string())
                } else {
                    Some(words[..max_num_words].join(" "))
                }
            }
            ChopPolicy::AtSentenceEnd => {
                let words: Vec<&str> = text.split_whitespace().collect();
                if words.len() <= max_num_words {
                    return Some(text.to_string());
                }

                // 1-based indices of words after which a sentence ends.
                let cut = words
                    .iter()
                    .enumerate()
                    .filter(|(_, word)| is_sentence_end(word))
                    .map(|(i, _)| i + 1)
                    .take_while(|&idx| idx < max_num_words)
                    .last()?;

                Some(words[..cut].join(" "))
            }
        }
    }
}

/// Decide whether a word plausibly ends a sentence.
///
/// The cleansing pass has already removed whitespace from before periods,
/// so a word ends a sentence when it ends in `?`, `!` or `.` - except for
/// known abbreviations and initials/acronyms (uppercase letter right
/// before the final period).
fn is_sentence_end(word: &str) -> bool {
    if word.ends_with('?') || word.ends_with('!') {
        return true;
    }

    if !word.ends_with('.') {
        return false;
    }

    let chars: Vec<char> = word.chars().collect();
    // A standalone "." should not survive cleansing, but if it does it is
    // certainly a sentence end.
    if chars.len() < 2 {
        return true;
    }

    if chars[chars.len() - 2].is_uppercase() {
        return false;
    }

    !ABBREVIATIONS
        .iter()
        .any(|abbr| abbr.eq_ignore_ascii_case(word))
}
