use std::time::Duration;

use crate::catalog::GalleryItem;
use crate::classifier::ClassifierTables;
use crate::composer::{self, EnhanceOptions};
use crate::config_store::ConfigStore;
use crate::notice::NoticeBoard;

/// The current prompt draft. In-memory only: selector values and free text
/// are discarded on restart, unlike the persisted library and theme.
#[derive(Debug, Clone, Default)]
pub struct SessionDraft {
    pub subject: String,
    pub style: String,
    pub lighting: String,
    pub free_text: String,
}

impl SessionDraft {
    pub fn value_for(&self, axis: &str) -> Option<&str> {
        match axis {
            "subject" => Some(&self.subject),
            "style" => Some(&self.style),
            "lighting" => Some(&self.lighting),
            _ => None,
        }
    }

    pub fn set_value(&mut self, axis: &str, value: String) -> bool {
        match axis {
            "subject" => self.subject = value,
            "style" => self.style = value,
            "lighting" => self.lighting = value,
            _ => return false,
        }
        true
    }
}

/// All mutable per-session state, owned by `AppState` behind one lock.
/// Component functions take this struct explicitly; nothing reads ambient
/// globals.
pub struct SessionState {
    pub draft: SessionDraft,
    pub last_composed: String,
    pub gallery_expanded: bool,
    pub gallery_sample: Vec<GalleryItem>,
    pub notices: NoticeBoard,
}

impl SessionState {
    pub fn new(config: &ConfigStore) -> Self {
        let mut draft = SessionDraft::default();
        for selector in config.selectors() {
            if let Some(first) = selector.choices.first() {
                draft.set_value(&selector.key, first.clone());
            }
        }

        Self {
            draft,
            last_composed: String::new(),
            gallery_expanded: false,
            gallery_sample: Vec::new(),
            notices: NoticeBoard::new(Duration::from_secs_f64(config.notice_duration_sec())),
        }
    }

    /// Selector-mode preview of the current draft.
    pub fn preview(&self) -> String {
        composer::compose(&self.draft.subject, &self.draft.style, &self.draft.lighting)
    }

    /// Runs enhancement over `text`. On success the composed prompt and the
    /// draft's free text are updated; on validation failure a notice is
    /// posted and previously composed output stays untouched.
    pub fn enhance_into(
        &mut self,
        tables: &ClassifierTables,
        text: &str,
        options: &EnhanceOptions,
    ) -> bool {
        match composer::enhance(tables, text, options) {
            Ok(prompt) => {
                self.draft.free_text = text.trim().to_string();
                self.last_composed = prompt;
                true
            }
            Err(_) => {
                self.notices.post("Enter a prompt idea first.");
                false
            }
        }
    }

    /// Copies a gallery item's example prompt into the draft free text.
    pub fn remix(&mut self, item: &GalleryItem) {
        self.draft.free_text = item.prompt.clone();
        self.notices
            .post(format!("\"{}\" loaded into the builder.", item.title));
    }
}

#[cfg(test)]
mod tests {
    use super::SessionState;
    use crate::catalog::GalleryItem;
    use crate::classifier::ClassifierTables;
    use crate::composer::EnhanceOptions;
    use crate::config_store::ConfigStore;
    use std::fs;
    use std::path::PathBuf;

    fn fixture_config(name: &str) -> (PathBuf, ConfigStore) {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "prompt_studio_session_test_{}_{}.toml",
            name,
            std::process::id()
        ));
        fs::remove_file(&path).ok();
        let config = ConfigStore::new(path.clone()).expect("create config");
        (path, config)
    }

    #[test]
    fn draft_is_seeded_with_first_choice_per_axis() {
        let (path, config) = fixture_config("seed");
        let session = SessionState::new(&config);

        let selectors = config.selectors();
        assert_eq!(session.draft.subject, selectors[0].choices[0]);
        assert_eq!(session.draft.style, selectors[1].choices[0]);
        assert_eq!(session.draft.lighting, selectors[2].choices[0]);

        fs::remove_file(path).ok();
    }

    #[test]
    fn failed_enhance_leaves_composed_output_unchanged() {
        let (path, config) = fixture_config("enhance_fail");
        let mut session = SessionState::new(&config);
        let tables = ClassifierTables::builtin();

        assert!(session.enhance_into(&tables, "a robot in space", &EnhanceOptions::default()));
        let composed_before = session.last_composed.clone();
        assert!(!composed_before.is_empty());

        assert!(!session.enhance_into(&tables, "   ", &EnhanceOptions::default()));
        assert_eq!(session.last_composed, composed_before);
        assert!(session.notices.current().is_some());

        fs::remove_file(path).ok();
    }

    #[test]
    fn remix_copies_example_prompt_into_free_text() {
        let (path, config) = fixture_config("remix");
        let mut session = SessionState::new(&config);

        let item = GalleryItem {
            id: 9,
            category: "Fantasy".to_string(),
            title: "Forest Spirit".to_string(),
            image: "https://example.com/spirit.jpg".to_string(),
            prompt: "a glowing forest spirit".to_string(),
        };
        session.remix(&item);

        assert_eq!(session.draft.free_text, "a glowing forest spirit");
        assert!(session
            .notices
            .current()
            .expect("remix posts a notice")
            .contains("Forest Spirit"));

        fs::remove_file(path).ok();
    }

    #[test]
    fn unknown_axis_is_rejected() {
        let (path, config) = fixture_config("axis");
        let mut session = SessionState::new(&config);

        assert!(!session.draft.set_value("mood", "gloomy".to_string()));
        assert!(session.draft.value_for("mood").is_none());

        fs::remove_file(path).ok();
    }
}
