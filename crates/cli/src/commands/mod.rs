pub mod chat;
pub mod check;
pub mod config_cmd;
pub mod doctor;
pub mod onboard;
pub mod prompts;

use docchat_config::AppConfig;
use docchat_core::turn::History;
use docchat_session::{Budget, PromptLibrary, TooLargeCause, TooLargeReport};

pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

pub(crate) fn budget_from(config: &AppConfig) -> Budget {
    Budget::new(config.budget.max_tokens).with_headroom(config.budget.reserved_headroom)
}

pub(crate) fn open_prompts(
    config: &AppConfig,
) -> Result<PromptLibrary, Box<dyn std::error::Error>> {
    Ok(PromptLibrary::open(config.prompts_path())?)
}

/// `tokens / budget (pct%)`
pub(crate) fn usage_line(tokens: usize, budget: usize) -> String {
    let pct = if budget == 0 {
        0.0
    } else {
        tokens as f64 / budget as f64 * 100.0
    };
    format!("{tokens} / {budget} tokens ({pct:.1}%)")
}

const HISTORY_PREVIEW_CHARS: usize = 60;

/// One `[HH:MM:SS] Role: preview` line per turn, oldest first.
pub(crate) fn history_lines(history: &History) -> Vec<String> {
    history
        .iter()
        .map(|turn| {
            let mut preview: String =
                turn.content().chars().take(HISTORY_PREVIEW_CHARS).collect();
            if turn.content().chars().count() > HISTORY_PREVIEW_CHARS {
                preview.push('…');
            }
            format!(
                "[{}] {}: {}",
                turn.timestamp().format("%H:%M:%S"),
                turn.role().label(),
                preview.replace('\n', " ")
            )
        })
        .collect()
}

/// User-facing explanation of a `TooLarge` outcome.
pub(crate) fn describe_too_large(report: &TooLargeReport) -> String {
    let headline = match report.cause() {
        TooLargeCause::DocumentAlone => format!(
            "The document alone is {} tokens, over the {} token budget.",
            report.document_tokens, report.budget
        ),
        TooLargeCause::DocumentWithQuery => format!(
            "The document fits, but with the system prompt and your question the request is {} tokens, {} over the {} token budget.",
            report.minimum_possible,
            report.overflow(),
            report.budget
        ),
    };
    format!(
        "{headline}\n  document: {}  system prompt: {}  question: {}  minimum request: {}",
        report.document_tokens, report.system_tokens, report.query_tokens, report.minimum_possible
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(document_tokens: usize, minimum_possible: usize) -> TooLargeReport {
        TooLargeReport {
            document_tokens,
            system_tokens: 12,
            query_tokens: 3,
            minimum_possible,
            budget: 1000,
        }
    }

    #[test]
    fn usage_line_formats_percentage() {
        assert_eq!(usage_line(250, 1000), "250 / 1000 tokens (25.0%)");
        assert_eq!(usage_line(1, 0), "1 / 0 tokens (0.0%)");
    }

    #[test]
    fn too_large_explains_document_alone() {
        let text = describe_too_large(&report(1200, 1215));
        assert!(text.starts_with("The document alone is 1200 tokens"));
    }

    #[test]
    fn too_large_explains_combination() {
        let text = describe_too_large(&report(990, 1005));
        assert!(text.contains("5 over the 1000 token budget"));
        assert!(text.contains("minimum request: 1005"));
    }

    #[test]
    fn history_lines_show_time_role_and_preview() {
        use docchat_core::turn::Turn;

        let mut history = History::new();
        history.append(Turn::user("What is\nchapter 2 about?"));
        history.append(Turn::assistant("x".repeat(80)));

        let lines = history_lines(&history);

        assert_eq!(lines.len(), 2);
        let stamp = history.turns()[0].timestamp().format("%H:%M:%S").to_string();
        assert_eq!(lines[0], format!("[{stamp}] User: What is chapter 2 about?"));
        assert!(lines[1].contains("] Assistant: "));
        assert!(lines[1].ends_with(&format!("{}…", "x".repeat(60))));
    }

    #[test]
    fn budget_applies_headroom() {
        let mut config = AppConfig::default();
        config.budget.reserved_headroom = 4096;
        assert_eq!(budget_from(&config).ceiling(), 1_000_000 - 4096);
    }
}
