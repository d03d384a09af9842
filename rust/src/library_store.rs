use anyhow::{anyhow, Context, Result};
use chrono::Local;
use html_escape::encode_text;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::LIBRARY_CAPACITY;

const SCHEMA_VERSION: u64 = 1;

/// Bounded most-recent-first library of saved prompts.
///
/// The whole sequence is rewritten on every save, so the persisted state is
/// always exactly the in-memory state. Anything on disk that does not parse
/// as the versioned envelope `{"version": 1, "prompts": [...]}` is treated
/// as absent data: the file is moved to a timestamped backup and the library
/// restarts empty.
pub struct LibraryStore {
    library_json_path: PathBuf,
    library_html_path: PathBuf,
    prompts: Vec<String>,
}

impl LibraryStore {
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("failed to create base dir: {}", base_dir.display()))?;

        let mut store = Self {
            library_json_path: base_dir.join("library.json"),
            library_html_path: base_dir.join("Library.html"),
            prompts: Vec::new(),
        };
        store.prompts = store.ensure_file()?;
        Ok(store)
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn library_html_path(&self) -> &Path {
        &self.library_html_path
    }

    /// Inserts at the front, evicts beyond capacity, rewrites the file.
    /// Saving a string already in the library moves it to the front instead
    /// of duplicating it.
    pub fn save(&mut self, prompt: &str) -> Result<()> {
        let cleaned = prompt.trim();
        if cleaned.is_empty() {
            return Err(anyhow!("prompt is empty"));
        }

        self.prompts.retain(|existing| existing != cleaned);
        self.prompts.insert(0, cleaned.to_string());
        self.prompts.truncate(LIBRARY_CAPACITY);
        self.write_prompts()
    }

    pub fn regenerate_html(&self) -> Result<()> {
        fs::write(&self.library_html_path, self.build_library_html()).with_context(|| {
            format!(
                "failed to write html: {}",
                self.library_html_path.display()
            )
        })
    }

    fn ensure_file(&self) -> Result<Vec<String>> {
        if !self.library_json_path.exists() {
            self.write_envelope(&[])?;
            return Ok(Vec::new());
        }

        match read_prompts(&self.library_json_path) {
            Ok(prompts) => Ok(prompts),
            Err(_) => {
                let now_tag = Local::now().format("%Y%m%d_%H%M%S").to_string();
                let backup = self
                    .library_json_path
                    .with_file_name(format!("library.broken.{}.json", now_tag));
                fs::rename(&self.library_json_path, backup).with_context(|| {
                    format!(
                        "failed to backup broken library: {}",
                        self.library_json_path.display()
                    )
                })?;
                self.write_envelope(&[])?;
                Ok(Vec::new())
            }
        }
    }

    fn write_prompts(&self) -> Result<()> {
        self.write_envelope(&self.prompts)
    }

    fn write_envelope(&self, prompts: &[String]) -> Result<()> {
        let payload = serde_json::to_string_pretty(&json!({
            "version": SCHEMA_VERSION,
            "prompts": prompts,
        }))
        .context("failed to serialize library json")?;

        let tmp_name = format!(
            "{}.tmp",
            self.library_json_path
                .file_name()
                .and_then(|v| v.to_str())
                .unwrap_or("library.json")
        );
        let tmp_path = self.library_json_path.with_file_name(tmp_name);

        fs::write(&tmp_path, payload)
            .with_context(|| format!("failed to write temp json: {}", tmp_path.display()))?;
        if self.library_json_path.exists() {
            fs::remove_file(&self.library_json_path).with_context(|| {
                format!(
                    "failed to remove old json: {}",
                    self.library_json_path.display()
                )
            })?;
        }
        fs::rename(&tmp_path, &self.library_json_path).with_context(|| {
            format!(
                "failed to replace json: {}",
                self.library_json_path.display()
            )
        })
    }

    fn build_library_html(&self) -> String {
        let mut cards = Vec::new();
        for (index, prompt) in self.prompts.iter().enumerate() {
            cards.push(format!(
                "<article class=\"entry\"><header class=\"entry-header\"><span class=\"rank\">#{}</span></header><textarea class=\"prompt-text\" readonly spellcheck=\"false\">{}</textarea><button class=\"btn copy-btn\">Copy</button></article>",
                index + 1,
                encode_text(prompt)
            ));
        }

        let body_cards = if cards.is_empty() {
            "<p class=\"empty\">No saved prompts yet.</p>".to_string()
        } else {
            cards.join("\n")
        };

        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let mut output = String::new();
        output.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
        output.push_str("  <meta charset=\"utf-8\" />\n");
        output.push_str(
            "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n",
        );
        output.push_str("  <title>Prompt Library</title>\n");
        output.push_str(LIBRARY_STYLE);
        output.push_str("\n</head>\n<body>\n  <main class=\"wrap\">\n    <h1>Prompt Library</h1>\n    <p class=\"generated\">Generated ");
        output.push_str(&encode_text(&generated));
        output.push_str("</p>\n");
        output.push_str(&body_cards);
        output.push_str("\n  </main>\n");
        output.push_str(LIBRARY_SCRIPT);
        output.push_str("\n</body>\n</html>\n");
        output
    }
}

fn read_prompts(path: &Path) -> Result<Vec<String>> {
    let raw_text = fs::read_to_string(path)
        .with_context(|| format!("failed to read json: {}", path.display()))?;
    let raw: Value = serde_json::from_str(&raw_text)
        .with_context(|| format!("failed to parse json: {}", path.display()))?;

    let Some(obj) = raw.as_object() else {
        return Err(anyhow!("library json is not an object: {}", path.display()));
    };

    let version = obj.get("version").and_then(Value::as_u64);
    if version != Some(SCHEMA_VERSION) {
        return Err(anyhow!(
            "unsupported library schema version: {}",
            path.display()
        ));
    }

    let Some(array) = obj.get("prompts").and_then(Value::as_array) else {
        return Err(anyhow!("library prompts is not an array: {}", path.display()));
    };

    let mut prompts = Vec::new();
    for item in array {
        let Some(text) = item.as_str() else {
            return Err(anyhow!(
                "library prompts contains a non-string entry: {}",
                path.display()
            ));
        };
        let text = text.trim();
        if !text.is_empty() {
            prompts.push(text.to_string());
        }
    }

    prompts.truncate(LIBRARY_CAPACITY);
    Ok(prompts)
}

const LIBRARY_STYLE: &str = r#"  <style>
    :root {
      --bg: #16171b;
      --panel: #1f2126;
      --line: #3a3e46;
      --accent: #7aa2f7;
      --text: #e8eaf0;
      --muted: #8b90a0;
    }
    * { box-sizing: border-box; }
    body {
      margin: 0;
      color: var(--text);
      background: var(--bg);
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
    }
    .wrap { max-width: 760px; margin: 32px auto; padding: 0 16px 32px; }
    h1 { margin: 0 0 4px; font-size: 30px; letter-spacing: 0.02em; }
    .generated { margin: 0 0 20px; color: var(--muted); font-size: 13px; }
    .entry {
      border: 1px solid var(--line);
      background: var(--panel);
      border-radius: 8px;
      margin-bottom: 14px;
      padding: 12px;
    }
    .entry-header { margin-bottom: 8px; }
    .rank { color: var(--accent); font-weight: 700; }
    .prompt-text {
      width: 100%;
      min-height: 64px;
      resize: vertical;
      border: 1px solid var(--line);
      border-radius: 6px;
      background: var(--bg);
      color: var(--text);
      padding: 8px 10px;
      font-size: 14px;
      line-height: 1.5;
    }
    .btn {
      margin-top: 8px;
      border: 1px solid var(--accent);
      border-radius: 6px;
      background: transparent;
      color: var(--accent);
      padding: 6px 14px;
      cursor: pointer;
      font-weight: 600;
    }
    .btn:hover { background: rgba(122, 162, 247, 0.12); }
    .empty {
      padding: 24px;
      border: 1px dashed var(--line);
      border-radius: 8px;
      color: var(--muted);
    }
  </style>
"#;

const LIBRARY_SCRIPT: &str = r#"  <script>
    for (const button of document.querySelectorAll(".copy-btn")) {
      button.addEventListener("click", async () => {
        const entry = button.closest(".entry");
        const text = entry ? entry.querySelector(".prompt-text").value : "";
        try {
          await navigator.clipboard.writeText(text);
          button.textContent = "Copied";
        } catch (_) {
          button.textContent = "Copy failed";
        }
        if (button._resetTimer) {
          clearTimeout(button._resetTimer);
        }
        button._resetTimer = setTimeout(() => {
          button.textContent = "Copy";
          button._resetTimer = null;
        }, 1400);
      });
    }
  </script>
"#;

#[cfg(test)]
mod tests {
    use super::LibraryStore;
    use crate::LIBRARY_CAPACITY;
    use serde_json::Value;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_FIXTURE_ID: AtomicU64 = AtomicU64::new(1);

    fn fixture_base() -> std::path::PathBuf {
        let mut base = std::env::temp_dir();
        let sequence = NEXT_FIXTURE_ID.fetch_add(1, Ordering::Relaxed);
        base.push(format!(
            "prompt_studio_library_test_{}_{}",
            std::process::id(),
            sequence
        ));
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base).expect("mkdir fixture");
        base
    }

    fn persisted_prompts(base: &std::path::Path) -> Vec<String> {
        let raw = fs::read_to_string(base.join("library.json")).expect("read library");
        let value: Value = serde_json::from_str(&raw).expect("parse library");
        value
            .get("prompts")
            .and_then(Value::as_array)
            .expect("prompts array")
            .iter()
            .map(|v| v.as_str().expect("string entry").to_string())
            .collect()
    }

    #[test]
    fn save_is_capacity_bounded_and_most_recent_first() {
        let base = fixture_base();
        let mut store = LibraryStore::new(base.clone()).expect("create store");

        for i in 1..=7 {
            store.save(&format!("prompt {i}")).expect("save");
        }

        let expected: Vec<String> = (3..=7).rev().map(|i| format!("prompt {i}")).collect();
        assert_eq!(store.prompts(), expected.as_slice());
        assert_eq!(store.prompts().len(), LIBRARY_CAPACITY);

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn persisted_state_matches_memory_after_every_save() {
        let base = fixture_base();
        let mut store = LibraryStore::new(base.clone()).expect("create store");

        for prompt in ["alpha", "beta", "gamma"] {
            store.save(prompt).expect("save");
            assert_eq!(persisted_prompts(&base), store.prompts());
        }

        let reloaded = LibraryStore::new(base.clone()).expect("reload store");
        assert_eq!(reloaded.prompts(), store.prompts());

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn repeated_save_moves_prompt_to_front_without_duplicate() {
        let base = fixture_base();
        let mut store = LibraryStore::new(base.clone()).expect("create store");

        store.save("first").expect("save first");
        store.save("second").expect("save second");
        store.save("first").expect("save first again");

        assert_eq!(store.prompts(), ["first", "second"]);

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn save_rejects_empty_prompt() {
        let base = fixture_base();
        let mut store = LibraryStore::new(base.clone()).expect("create store");

        let err = store.save("   ").expect_err("empty prompt should fail");
        assert!(err.to_string().contains("prompt is empty"));
        assert!(store.prompts().is_empty());

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn malformed_json_is_treated_as_absent_with_backup() {
        let base = fixture_base();
        fs::write(base.join("library.json"), "not json at all").expect("write broken");

        let store = LibraryStore::new(base.clone()).expect("create store");
        assert!(store.prompts().is_empty());

        let backups: Vec<_> = fs::read_dir(&base)
            .expect("list base")
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("library.broken.")
            })
            .collect();
        assert_eq!(backups.len(), 1, "broken file should be backed up");

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn unknown_schema_version_is_treated_as_absent() {
        let base = fixture_base();
        fs::write(
            base.join("library.json"),
            r#"{"version": 2, "prompts": ["kept?"]}"#,
        )
        .expect("write future schema");

        let store = LibraryStore::new(base.clone()).expect("create store");
        assert!(store.prompts().is_empty());

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn non_string_member_is_treated_as_absent() {
        let base = fixture_base();
        fs::write(
            base.join("library.json"),
            r#"{"version": 1, "prompts": ["ok", 42]}"#,
        )
        .expect("write mixed array");

        let store = LibraryStore::new(base.clone()).expect("create store");
        assert!(store.prompts().is_empty());

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn oversized_persisted_list_is_truncated_on_load() {
        let base = fixture_base();
        let prompts: Vec<String> = (1..=9).map(|i| format!("p{i}")).collect();
        fs::write(
            base.join("library.json"),
            serde_json::to_string(&serde_json::json!({"version": 1, "prompts": prompts}))
                .expect("serialize fixture"),
        )
        .expect("write oversized");

        let store = LibraryStore::new(base.clone()).expect("create store");
        assert_eq!(store.prompts().len(), LIBRARY_CAPACITY);
        assert_eq!(store.prompts()[0], "p1");

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn regenerate_html_escapes_prompt_text() {
        let base = fixture_base();
        let mut store = LibraryStore::new(base.clone()).expect("create store");
        store.save("a <script> tag & friends").expect("save");

        store.regenerate_html().expect("regenerate html");
        let html = fs::read_to_string(base.join("Library.html")).expect("read html");
        assert!(html.contains("a &lt;script&gt; tag &amp; friends"));
        assert!(!html.contains("a <script> tag"));

        fs::remove_dir_all(base).ok();
    }
}
