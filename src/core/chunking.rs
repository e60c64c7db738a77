//! Fixed-size chunking of long context text for prompt seeding.
//!
//! Context files (project brief, `results.csv`, `args.yaml`) routinely exceed
//! what fits comfortably in one system message, so they are split into
//! fixed-size pieces and seeded as one system message per piece. The split is
//! a pure character-count split: a text of length L at limit K yields
//! `ceil(L / K)` pieces, every piece exactly K characters except possibly the
//! last, and concatenating the pieces reproduces the input.

use crate::core::message::Message;

/// Split `text` into pieces of at most `limit` characters.
///
/// Empty input yields no pieces. A `limit` of zero is treated the same way
/// rather than looping forever.
pub fn split_into_chunks(text: &str, limit: usize) -> Vec<String> {
    if text.is_empty() || limit == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(limit)
        .map(|piece| piece.iter().collect())
        .collect()
}

fn push_labeled_chunks(messages: &mut Vec<Message>, label: &str, text: &str, limit: usize) {
    let chunks = split_into_chunks(text, limit);
    let total = chunks.len();
    for (index, chunk) in chunks.into_iter().enumerate() {
        messages.push(Message::system(format!(
            "{} chunk {}/{}:\n\n{}",
            label,
            index + 1,
            total,
            chunk
        )));
    }
}

/// Contextual text seeded into a training-results conversation.
#[derive(Debug, Clone, Default)]
pub struct SeedContext {
    pub project_brief: String,
    pub csv: String,
    pub yaml: String,
}

/// Build the seed transcript: one operating-instruction system message, then
/// context chunks in fixed order (project brief, CSV, YAML).
pub fn build_seed_messages(
    system_instruction: &str,
    context: &SeedContext,
    chunk_limit: usize,
) -> Vec<Message> {
    let mut messages = vec![Message::system(system_instruction)];

    push_labeled_chunks(
        &mut messages,
        "Project Brief",
        &context.project_brief,
        chunk_limit,
    );
    push_labeled_chunks(&mut messages, "results.csv data", &context.csv, chunk_limit);
    push_labeled_chunks(&mut messages, "args.yaml data", &context.yaml, chunk_limit);

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::ChatRole;

    #[test]
    fn chunks_have_exact_sizes_and_reassemble() {
        let text = "abcdefghij";

        let chunks = split_into_chunks(text, 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
        assert_eq!(chunks.concat(), text);

        let exact = split_into_chunks(text, 5);
        assert_eq!(exact, vec!["abcde", "fghij"]);
    }

    #[test]
    fn chunk_count_is_ceiling_of_length_over_limit() {
        for (len, limit) in [(1usize, 1usize), (10, 3), (10, 10), (11, 10), (1000, 7)] {
            let text: String = "x".repeat(len);
            let chunks = split_into_chunks(&text, limit);
            assert_eq!(chunks.len(), len.div_ceil(limit), "len={len} limit={limit}");
            assert_eq!(chunks.concat(), text);
            for piece in &chunks[..chunks.len() - 1] {
                assert_eq!(piece.chars().count(), limit);
            }
            assert!(chunks.last().unwrap().chars().count() <= limit);
        }
    }

    #[test]
    fn chunking_counts_characters_not_bytes() {
        let text = "héllo wörld";
        let chunks = split_into_chunks(text, 3);
        assert_eq!(chunks.len(), text.chars().count().div_ceil(3));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn empty_text_and_zero_limit_yield_nothing() {
        assert!(split_into_chunks("", 16).is_empty());
        assert!(split_into_chunks("abc", 0).is_empty());
    }

    #[test]
    fn seed_messages_follow_fixed_order() {
        let context = SeedContext {
            project_brief: "b".repeat(5),
            csv: "c".repeat(5),
            yaml: "y".repeat(2),
        };
        let messages = build_seed_messages("be helpful", &context, 3);

        assert!(messages.iter().all(|m| m.role == ChatRole::System));
        let texts: Vec<&str> = messages
            .iter()
            .map(|m| m.content.as_text().expect("seed messages are text"))
            .collect();

        assert_eq!(texts[0], "be helpful");
        assert_eq!(texts[1], "Project Brief chunk 1/2:\n\nbbb");
        assert_eq!(texts[2], "Project Brief chunk 2/2:\n\nbb");
        assert_eq!(texts[3], "results.csv data chunk 1/2:\n\nccc");
        assert_eq!(texts[4], "results.csv data chunk 2/2:\n\ncc");
        assert_eq!(texts[5], "args.yaml data chunk 1/1:\n\nyy");
        assert_eq!(texts.len(), 6);
    }

    #[test]
    fn empty_context_parts_seed_no_chunks() {
        let messages = build_seed_messages("be helpful", &SeedContext::default(), 8);
        assert_eq!(messages.len(), 1);
    }
}
