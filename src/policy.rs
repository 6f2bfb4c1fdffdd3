//! Query gating and answer shaping for the study assistant.
//!
//! The assistant guides students toward understanding; it does not hand
//! out finished homework answers. Questions that look like homework
//! requests are refused before any retrieval happens, and every generated
//! answer is capped and prefixed with a guidance disclaimer.

/// Substrings that flag a question as a homework request.
const HOMEWORK_KEYWORDS: [&str; 5] = [
    "homework",
    "assignment",
    "problem set",
    "answer to",
    "solution for",
];

pub const REFUSAL_ANSWER: &str = "I'm sorry, but I can't provide direct answers to homework \
    questions or complete solutions to problems. Instead, I can guide you through the \
    problem-solving process or explain related concepts. Could you rephrase your question to \
    ask about a specific concept or step you're struggling with?";

pub const NO_DOCUMENTS_ANSWER: &str =
    "No documents available to answer the question. Please upload some documents first.";

pub const DISCLAIMER: &str = "Here's some guidance to help you understand this topic better: ";

pub const CONTINUATION_MARKER: &str = "... (continued)";

/// Maximum characters of model output kept before the continuation marker.
pub const MAX_ANSWER_CHARS: usize = 500;

/// Case-insensitive substring match against the homework keyword list.
pub fn is_homework_question(question: &str) -> bool {
    let lowered = question.to_lowercase();
    HOMEWORK_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// Prepend the disclaimer and cap the answer body at `MAX_ANSWER_CHARS`
/// characters, appending the continuation marker when anything was cut.
///
/// The cap counts characters, not tokens or sentences, and can land
/// mid-word; that is the intended behavior, not an oversight.
pub fn shape_answer(answer: &str) -> String {
    let mut body: String = answer.chars().take(MAX_ANSWER_CHARS).collect();
    if answer.chars().count() > MAX_ANSWER_CHARS {
        body.push_str(CONTINUATION_MARKER);
    }
    format!("{}{}", DISCLAIMER, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_homework_requests_case_insensitively() {
        assert!(is_homework_question("Can you do my HOMEWORK for me?"));
        assert!(is_homework_question("what is the answer to question 3"));
        assert!(is_homework_question("solve this Problem Set please"));
        assert!(!is_homework_question("explain how recursion works"));
    }

    #[test]
    fn short_answers_only_gain_the_disclaimer() {
        let shaped = shape_answer("Recursion is a function calling itself.");
        assert_eq!(
            shaped,
            format!("{}Recursion is a function calling itself.", DISCLAIMER)
        );
        assert!(!shaped.ends_with(CONTINUATION_MARKER));
    }

    #[test]
    fn long_answers_keep_exactly_the_cap_then_the_marker() {
        let long_answer = "x".repeat(MAX_ANSWER_CHARS + 250);
        let shaped = shape_answer(&long_answer);

        assert!(shaped.starts_with(DISCLAIMER));
        assert!(shaped.ends_with(CONTINUATION_MARKER));
        let body = &shaped[DISCLAIMER.len()..shaped.len() - CONTINUATION_MARKER.len()];
        assert_eq!(body.chars().count(), MAX_ANSWER_CHARS);
        assert_eq!(body, &long_answer[..MAX_ANSWER_CHARS]);
    }

    #[test]
    fn cap_is_character_based_not_byte_based() {
        let long_answer = "é".repeat(MAX_ANSWER_CHARS + 1);
        let shaped = shape_answer(&long_answer);

        assert!(shaped.ends_with(CONTINUATION_MARKER));
        let body = &shaped[DISCLAIMER.len()..shaped.len() - CONTINUATION_MARKER.len()];
        assert_eq!(body.chars().count(), MAX_ANSWER_CHARS);
    }
}
