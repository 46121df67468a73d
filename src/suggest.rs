/// Keyword group and the suggestions it contributes when any keyword appears.
struct KeywordRule {
    keywords: &'static [&'static str],
    suggestions: &'static [&'static str],
}

const RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["api", "endpoint", "backend"],
        suggestions: &[
            "Check API documentation for correct endpoint usage",
            "Verify authentication tokens are valid",
            "Review API response codes and error messages",
        ],
    },
    KeywordRule {
        keywords: &["deploy", "build", "pipeline"],
        suggestions: &[
            "Check CI/CD pipeline logs for detailed error messages",
            "Verify all environment variables are correctly set",
            "Ensure all dependencies are properly versioned",
        ],
    },
    KeywordRule {
        keywords: &["test", "failing"],
        suggestions: &[
            "Review test output for specific failure reasons",
            "Check if recent code changes affected test dependencies",
            "Consider running tests in isolation to identify issues",
        ],
    },
    KeywordRule {
        keywords: &["permission", "access", "auth"],
        suggestions: &[
            "Verify user roles and permissions in the system",
            "Check if required access has been granted",
            "Contact team lead or admin for access requests",
        ],
    },
    KeywordRule {
        keywords: &["wait", "depend", "blocked by"],
        suggestions: &[
            "Identify the dependency owner and communicate urgency",
            "Check if there's alternative work that can be done meanwhile",
            "Escalate if dependency is critical path",
        ],
    },
    KeywordRule {
        keywords: &["unclear", "requirement", "spec"],
        suggestions: &[
            "Schedule a quick clarification call with stakeholders",
            "Document assumptions and get them validated",
            "Break down the task into smaller, clearer items",
        ],
    },
];

const FALLBACK: &[&str] = &[
    "Break down the blocker into smaller, actionable items",
    "Discuss with team members who might have faced similar issues",
    "Document the issue thoroughly for faster resolution",
    "Consider pairing with a teammate to troubleshoot",
];

/// Suggestions for a blocker description. Matching is a plain
/// case-insensitive substring test, so "waiting" matches "wait".
pub fn suggest(description: &str) -> Vec<String> {
    let lowered = description.to_lowercase();

    let suggestions: Vec<String> = RULES
        .iter()
        .filter(|rule| rule.keywords.iter().any(|keyword| lowered.contains(keyword)))
        .flat_map(|rule| rule.suggestions.iter().map(|s| s.to_string()))
        .collect();

    if suggestions.is_empty() {
        FALLBACK.iter().map(|s| s.to_string()).collect()
    } else {
        suggestions
    }
}

pub fn render_suggestion(description: &str) -> String {
    let bullets = suggest(description)
        .iter()
        .map(|s| format!("• {s}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "🤖 **AI Suggestions for this blocker:**\n\n{bullets}\n\n💬 *Tip: Share this blocker in your daily standup for team visibility.*"
    )
}
