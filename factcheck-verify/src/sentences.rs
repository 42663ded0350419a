//! Article-to-claims sentence splitting.

use unicode_segmentation::UnicodeSegmentation;

/// Split `article` into trimmed, non-empty sentences.
///
/// Boundaries follow Unicode UAX #29: a sentence ends after `.`, `!`, `?`,
/// `。` and similar terminators plus any closing punctuation and trailing
/// whitespace. A `.` followed by a lowercase word or a digit does not end a
/// sentence, so `e.g. this` and `3.14` stay intact.
pub fn split_sentences(article: &str) -> Vec<String> {
    article
        .unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
