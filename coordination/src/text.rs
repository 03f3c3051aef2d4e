//! Text shaping helpers shared by participants and the adjudicator.
//!
//! - [`truncate_words`]: word-boundary truncation with a closing period.
//! - [`wrap`]: greedy fixed-width line wrapping (cosmetic only).
//! - [`similarity_ratio`]: longest-matching-block similarity in `[0, 1]`.

/// Truncate `text` to at most `max_words` whitespace-separated words.
///
/// Text within the limit is returned unchanged. Longer text becomes the
/// first `max_words` words joined by single spaces, followed by a period.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.to_string();
    }
    format!("{}.", words[..max_words].join(" "))
}

/// Greedy word wrap to `width` columns.
///
/// Whitespace runs (including newlines) collapse to single spaces. Words
/// longer than `width` are broken across lines. Empty input wraps to an
/// empty string.
pub fn wrap(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        // Oversized words are chopped into width-sized pieces.
        while chars.len() > width {
            let room = if current_len == 0 {
                width
            } else {
                width.saturating_sub(current_len + 1)
            };
            if room == 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            let head: String = chars.drain(..room).collect();
            if current_len > 0 {
                current.push(' ');
            }
            current.push_str(&head);
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        let word_len = chars.len();
        if word_len == 0 {
            continue;
        }
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(chars);
        current_len += word_len;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Characters of each input considered by [`similarity_ratio`].
///
/// Matching is quadratic in input length, and a single enormous token
/// passes the word cap.
pub const MAX_COMPARED_CHARS: usize = 2048;

/// Similarity of two strings as `2·M / (|a| + |b|)`, where `M` is the
/// number of characters covered by recursively found longest matching
/// blocks (Ratcliff/Obershelp). Two empty strings are identical (1.0).
///
/// Only the first [`MAX_COMPARED_CHARS`] characters of each side count.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().take(MAX_COMPARED_CHARS).collect();
    let b: Vec<char> = b.chars().take(MAX_COMPARED_CHARS).collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_characters(&a, &b);
    2.0 * matched as f64 / total as f64
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            queue.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Ties resolve to the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // prev[j - blo] = length of the match ending at (i - 1, j).
    let mut prev = vec![0usize; bhi - blo + 1];
    let mut curr = vec![0usize; bhi - blo + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let k = j - blo + 1;
            if a[i] == b[j] {
                curr[k] = prev[k - 1] + 1;
                if curr[k] > best_size {
                    best_size = curr[k];
                    best_i = i + 1 - best_size;
                    best_j = j + 1 - best_size;
                }
            } else {
                curr[k] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_within_limit_is_unchanged() {
        let text = "Energy is neither created nor destroyed.";
        assert_eq!(truncate_words(text, 18), text);
    }

    #[test]
    fn test_truncate_long_text_keeps_first_words_plus_period() {
        let text = (1..=25)
            .map(|i| format!("w{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let out = truncate_words(&text, 18);
        assert!(out.ends_with("w18."));
        assert_eq!(out.split_whitespace().count(), 18);
        assert!(!out.contains("w19"));
    }

    #[test]
    fn test_truncate_exactly_at_limit() {
        let text = vec!["word"; 18].join(" ");
        assert_eq!(truncate_words(&text, 18), text);
    }

    #[test]
    fn test_wrap_short_line_untouched() {
        assert_eq!(wrap("hello world", 80), "hello world");
    }

    #[test]
    fn test_wrap_breaks_at_width() {
        let text = "aaaa bbbb cccc dddd";
        assert_eq!(wrap(text, 9), "aaaa bbbb\ncccc dddd");
        for line in wrap(text, 9).lines() {
            assert!(line.chars().count() <= 9);
        }
    }

    #[test]
    fn test_wrap_collapses_whitespace() {
        assert_eq!(wrap("  one\n\ttwo   three ", 80), "one two three");
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        assert_eq!(wrap("abcdefghij", 4), "abcd\nefgh\nij");
    }

    #[test]
    fn test_wrap_empty() {
        assert_eq!(wrap("", 80), "");
        assert_eq!(wrap("   ", 80), "");
    }

    #[test]
    fn test_similarity_identical_and_disjoint() {
        assert_eq!(similarity_ratio("same text", "same text"), 1.0);
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_similarity_known_value() {
        // "abcd" vs "bcde": one block "bcd" → 2*3/8
        let ratio = similarity_ratio("abcd", "bcde");
        assert!((ratio - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_near_duplicate_sentences() {
        let a = "Brains are made of cells, and cells follow simple physical rules.";
        let b = "Brains are made of cells, and cells follow simple chemical rules.";
        assert!(similarity_ratio(a, b) > 0.8);
    }

    #[test]
    fn test_similarity_unrelated_sentences() {
        let a = "Machines only copy patterns they saw in their training data.";
        let b = "Feeling pain is different from printing the word pain.";
        assert!(similarity_ratio(a, b) <= 0.8);
    }

    #[test]
    fn test_similarity_caps_oversized_tokens() {
        let huge_a = "x".repeat(200_000);
        let huge_b = format!("{}y", "x".repeat(150_000));
        // Both are cut to their first MAX_COMPARED_CHARS characters.
        assert_eq!(similarity_ratio(&huge_a, &huge_b), 1.0);

        let short = "x".repeat(MAX_COMPARED_CHARS / 2);
        let ratio = similarity_ratio(&short, &huge_a);
        let expected =
            2.0 * (MAX_COMPARED_CHARS / 2) as f64 / (MAX_COMPARED_CHARS * 3 / 2) as f64;
        assert!((ratio - expected).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_is_symmetric_for_simple_case() {
        let a = "the cat sat";
        let b = "the hat sat";
        assert!((similarity_ratio(a, b) - similarity_ratio(b, a)).abs() < 1e-9);
    }
}
