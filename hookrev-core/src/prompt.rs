//! Prompt builders for review and follow-up chat.

use std::fmt::Write as _;

use crate::types::{ConversationTurn, ReviewUnit, Role, UnitKind};

const OUTPUT_CONTRACT: &str = r#"Respond with a single JSON object and nothing else:
{"findings": [{"severity": "CRITICAL" | "SUGGESTION", "line_number": <integer>, "message": "<one sentence>"}]}
Use CRITICAL only for problems that must be fixed before committing: security
vulnerabilities such as command injection, crashes, data loss, or clearly broken
logic. Everything else (style, naming, readability, minor performance) is a
SUGGESTION. If there is nothing to report, respond with {"findings": []}."#;

/// Builds the structured review prompt for `unit`, shaped by its kind.
pub fn review_prompt(unit: &ReviewUnit) -> String {
    match unit.kind {
        UnitKind::Diff => format!(
            "You are reviewing a staged git diff before it is committed.\n\
             Report issues only on added lines (prefixed with `+`). Lines prefixed \
             with `-` are being removed and must not be reported. Unprefixed lines \
             are context.\n\
             `line_number` is the line in the new version of the file.\n\n\
             {OUTPUT_CONTRACT}\n\n\
             Diff:\n```diff\n{}\n```\n",
            unit.content
        ),
        UnitKind::FullFile => format!(
            "You are reviewing the complete staged content of `{}` before it is \
             committed. Look for bugs, security vulnerabilities, style problems and \
             unclear code.\n\
             `line_number` is the 1-based line in the file below.\n\n\
             {OUTPUT_CONTRACT}\n\n\
             Source:\n```\n{}\n```\n",
            unit.identifier, unit.content
        ),
    }
}

/// Builds the plain-text chat prompt from the finding's context window and the
/// full turn history. The model is asked to answer the last developer turn.
pub fn chat_prompt(context: &str, conversation: &[ConversationTurn]) -> String {
    let mut history = String::new();
    for turn in conversation {
        let who = match turn.role {
            Role::User => "Developer",
            Role::Assistant => "Reviewer",
        };
        let _ = writeln!(history, "{who}: {}", turn.text);
    }

    format!(
        "You are a code reviewer discussing one of your findings with the developer \
         who wrote the change.\n\n\
         Code under discussion:\n```\n{context}\n```\n\n\
         Conversation so far:\n{history}\n\
         Reply to the developer's last message. Be concise and stay on topic. If they \
         explain context that makes the finding moot, say so plainly.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_prompt_embeds_content_and_contract() {
        let p = review_prompt(&ReviewUnit::diff("+os.system(user_input)"));
        assert!(p.contains("+os.system(user_input)"));
        assert!(p.contains("\"findings\""));
        assert!(p.contains("```diff"));
    }

    #[test]
    fn full_file_prompt_names_the_file() {
        let p = review_prompt(&ReviewUnit::full_file("calc.py", "def add(a, b): return a + b"));
        assert!(p.contains("`calc.py`"));
        assert!(p.contains("def add(a, b)"));
    }

    #[test]
    fn chat_prompt_lists_turns_in_order() {
        let turns = vec![
            ConversationTurn::assistant("Possible injection."),
            ConversationTurn::user("Input is validated upstream."),
        ];
        let p = chat_prompt("os.system(cmd)", &turns);
        let reviewer = p.find("Reviewer: Possible injection.").unwrap();
        let developer = p.find("Developer: Input is validated upstream.").unwrap();
        assert!(reviewer < developer);
        assert!(p.contains("os.system(cmd)"));
    }
}
