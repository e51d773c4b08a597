use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;
use tempfile::TempDir;

use mend_engine::agent::{classify, sanitize_code_output};
use mend_engine::config::{Config, MemoryConfig};
use mend_engine::llm::TextGenerator;
use mend_engine::memory::{MemoryStore, MessageRole};
use mend_engine::tools::diff;
use mend_engine::tools::FileTools;

/// Summarizer stand-in for rotation properties. Always produces a
/// well-formed summary so rotation itself is the only variable.
struct StubSummarizer;

#[async_trait]
impl TextGenerator for StubSummarizer {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _system: Option<&str>,
        _temperature: f32,
    ) -> mend_engine::llm::Result<String> {
        Ok("SUMMARY: compacted conversation\nFACTS: none\nPREFERENCES: none".to_string())
    }
}

/// Lines of printable ASCII joined with newlines. Proptest's regex
/// strategies never emit '\n', so multi-line inputs are built by hand.
fn multiline_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[ -~]{0,40}", 0..10).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn test_config_parsing_round_trip(
        log_level in "error|warn|info|debug|trace",
        model in "[a-z][a-z0-9.:-]{0,20}",
        timeout in 1..=600u64,
        max_messages in 2..=50usize,
        window in 1..=20usize,
    ) {
        // Build a baseline config by parsing a minimal TOML template
        let baseline_toml = r#"
[core]
workspace = "~/projects"
log_level = "info"
data_dir = "~/.mend"

[llm.ollama]
base_url = "http://127.0.0.1:11434"
model = "qwen2.5-coder:7b"
request_timeout_secs = 120

[memory]
max_short_term_messages = 10
keep_recent = 5
recent_window = 8

[pipeline]
target_file = "src/main.rs"
"#;
        let mut config: Config = toml::from_str(baseline_toml)
            .expect("Failed to parse baseline config");

        config.core.log_level = log_level;
        config.llm.ollama.model = model;
        config.llm.ollama.request_timeout_secs = timeout;
        config.memory.max_short_term_messages = max_messages;
        config.memory.recent_window = window;

        // Serialize the config object to TOML
        let toml_string = toml::to_string(&config).expect("Failed to serialize Config to string");

        // Parse it back to a struct
        let parsed: Config = toml::from_str(&toml_string).expect("Failed to deserialize TOML to Config");

        // Assert all mutated values are strictly equivalent
        prop_assert_eq!(config.core.log_level, parsed.core.log_level);
        prop_assert_eq!(config.llm.ollama.model, parsed.llm.ollama.model);
        prop_assert_eq!(config.llm.ollama.request_timeout_secs, parsed.llm.ollama.request_timeout_secs);
        prop_assert_eq!(config.memory.max_short_term_messages, parsed.memory.max_short_term_messages);
        prop_assert_eq!(config.memory.recent_window, parsed.memory.recent_window);
    }
}

proptest! {
    #[test]
    fn test_sanitize_output_is_trimmed(input in multiline_text()) {
        let cleaned = sanitize_code_output(&input);
        prop_assert_eq!(cleaned.trim(), cleaned.as_str());
    }

    #[test]
    fn test_sanitize_without_edge_fences_preserves_content(input in multiline_text()) {
        let trimmed = input.trim();
        prop_assume!(!trimmed.is_empty());

        let lines: Vec<&str> = trimmed.split('\n').collect();
        let first_is_fence = lines.first().is_some_and(|l| l.starts_with("```"));
        let last_is_fence = lines.last().is_some_and(|l| l.starts_with("```"));
        prop_assume!(!first_is_fence && !last_is_fence);

        prop_assert_eq!(sanitize_code_output(&input), trimmed);
    }

    #[test]
    fn test_sanitize_unwraps_fenced_block(
        lang in "[a-z]{0,8}",
        body in prop::collection::vec("[ -~]{1,40}", 1..8),
    ) {
        let body: Vec<String> = body.into_iter().filter(|l| !l.starts_with("```")).collect();
        prop_assume!(!body.is_empty());

        let code = body.join("\n");
        let fenced = format!("```{}\n{}\n```", lang, code);

        prop_assert_eq!(sanitize_code_output(&fenced), code.trim());
    }
}

proptest! {
    #[test]
    fn test_classify_is_total(input in any::<String>()) {
        // Same verdict on repeated calls, and never a panic, for
        // arbitrary unicode input.
        let first = classify(&input);
        let second = classify(&input);
        prop_assert_eq!(first, second);
    }
}

proptest! {
    #[test]
    fn test_diff_of_identical_inputs_is_empty(text in multiline_text()) {
        prop_assert_eq!(diff::unified(&text, &text, "src/main.rs"), "");
    }

    #[test]
    fn test_diff_of_changed_line_has_header_and_hunk(
        mut lines in prop::collection::vec("[a-z]{1,10}", 1..10),
        idx in any::<prop::sample::Index>(),
    ) {
        let original = lines.join("\n");
        let i = idx.index(lines.len());
        lines[i] = format!("{}_changed", lines[i]);
        let modified = lines.join("\n");

        let rendered = diff::unified(&original, &modified, "src/main.rs");
        let added_line = format!("+{}", lines[i]);
        prop_assert!(rendered.starts_with("--- a/src/main.rs\n+++ b/src/main.rs\n"));
        prop_assert!(rendered.contains("@@ -"));
        prop_assert!(rendered.contains(&added_line));
    }
}

proptest! {
    #[test]
    fn test_sandbox_resolution_never_escapes_root(
        parts in prop::collection::vec(
            prop_oneof![
                Just("..".to_string()),
                Just(".".to_string()),
                "[a-zA-Z0-9_]{1,8}",
            ],
            1..8,
        ),
    ) {
        let temp = TempDir::new().unwrap();
        let tools = FileTools::new(temp.path()).unwrap();
        let candidate = parts.join("/");

        // Any relative path either resolves inside the root or is
        // rejected outright. There is no third outcome.
        if let Ok(resolved) = tools.resolve(&candidate) {
            prop_assert!(resolved.starts_with(tools.root()));
        }
    }
}

proptest! {
    // Each case spins up a runtime and replays a whole session, so
    // keep the case count modest.
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_session_buffer_stays_bounded(count in 0..40usize) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let temp = TempDir::new().unwrap();
            let llm: Arc<dyn TextGenerator> = Arc::new(StubSummarizer);
            let config = MemoryConfig::default();
            let mut store = MemoryStore::new(temp.path(), llm, &config).unwrap();

            for i in 0..count {
                let role = if i % 2 == 0 {
                    MessageRole::User
                } else {
                    MessageRole::Assistant
                };
                store
                    .add_message(role, &format!("message {i}"))
                    .await
                    .unwrap();
                assert!(store.len() <= config.max_short_term_messages);
            }

            // Rotation fires when the buffer passes the cap and leaves
            // keep_recent behind, so the final length follows a fixed
            // cycle once count clears the first rotation.
            let cap = config.max_short_term_messages;
            let keep = config.keep_recent;
            let expected = if count <= cap {
                count
            } else {
                keep + ((count - cap - 1) % (cap - keep + 1))
            };
            assert_eq!(store.len(), expected);
        });
    }
}
