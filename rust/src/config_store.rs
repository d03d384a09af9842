use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::PathBuf;
use toml::map::Map;
use toml::Value;

use crate::classifier::{
    Axis, AxisRow, ClassifierTables, ATMOSPHERE_FALLBACK, BUILTIN_ATMOSPHERE_ROWS,
    BUILTIN_STYLE_ROWS, BUILTIN_SUBJECT_ROWS, BUILTIN_TRANSLATIONS, STYLE_FALLBACK,
    SUBJECT_FALLBACK,
};

pub const AXIS_KEYS: [&str; 3] = ["subject", "style", "lighting"];

const AXIS_LABELS: [&str; 3] = ["Subject", "Style", "Lighting"];

const BUILTIN_CHOICES: [&[&str]; 3] = [
    &[
        "a cat",
        "a majestic dragon",
        "a lone astronaut",
        "an ancient temple",
        "a neon samurai",
    ],
    &[
        "oil painting",
        "anime key visual",
        "cyberpunk concept art",
        "watercolor illustration",
        "35mm photograph",
    ],
    &[
        "golden hour",
        "soft studio light",
        "neon glow",
        "moonlit night",
        "overcast haze",
    ],
];

#[derive(Debug, Clone)]
pub struct SelectorConfig {
    pub key: String,
    pub label: String,
    pub choices: Vec<String>,
}

/// TOML-backed application config. The document is normalized and re-saved
/// on load, so a missing or partially hand-edited file always comes back in
/// a complete, well-formed shape. Classifier tables live here as data; their
/// declaration order in the file is the classification match order.
#[derive(Debug)]
pub struct ConfigStore {
    pub path: PathBuf,
    doc: Value,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let doc = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("failed to parse TOML: {}", path.display()))?
        } else {
            Value::Table(Map::new())
        };

        let mut store = Self { path, doc };
        store.normalize_doc();
        store.save()?;
        Ok(store)
    }

    pub fn save(&self) -> Result<()> {
        let serialized = toml::to_string_pretty(&self.doc).context("failed to serialize TOML")?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write config: {}", self.path.display()))
    }

    pub fn theme(&self) -> String {
        self.app_table()
            .and_then(|t| t.get("theme"))
            .and_then(Value::as_str)
            .filter(|v| is_valid_theme(v))
            .unwrap_or("dark")
            .to_string()
    }

    pub fn set_theme(&mut self, theme: &str) -> Result<()> {
        if !is_valid_theme(theme) {
            return Err(anyhow!("unknown theme: {theme}"));
        }

        let app = self.ensure_app_table_mut();
        app.insert("theme".to_string(), Value::String(theme.to_string()));
        self.save()
    }

    pub fn server_port(&self) -> u16 {
        self.app_table()
            .and_then(|t| t.get("server_port"))
            .and_then(value_to_i64)
            .and_then(|v| u16::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(3000)
    }

    pub fn notice_duration_sec(&self) -> f64 {
        self.app_table()
            .and_then(|t| t.get("notice_duration_sec"))
            .and_then(value_to_f64)
            .filter(|v| *v > 0.0)
            .unwrap_or(3.0)
    }

    pub fn gallery_display_limit(&self) -> usize {
        self.app_table()
            .and_then(|t| t.get("gallery_display_limit"))
            .and_then(value_to_i64)
            .and_then(|v| usize::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(4)
    }

    pub fn copy_debounce_sec(&self) -> f64 {
        self.app_table()
            .and_then(|t| t.get("copy_debounce_sec"))
            .and_then(value_to_f64)
            .filter(|v| *v >= 0.0)
            .unwrap_or(2.0)
    }

    /// The three selector axes in fixed order; normalization guarantees each
    /// has at least one choice.
    pub fn selectors(&self) -> Vec<SelectorConfig> {
        let rows = self
            .doc
            .as_table()
            .and_then(|root| root.get("selectors"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut selectors = Vec::new();
        for row in rows {
            let Some(table) = row.as_table() else {
                continue;
            };
            let Some(key) = table.get("key").and_then(Value::as_str) else {
                continue;
            };
            let label = table
                .get("label")
                .and_then(Value::as_str)
                .unwrap_or(key)
                .to_string();
            let choices = normalize_choices(table.get("choices"));
            if choices.is_empty() {
                continue;
            }

            selectors.push(SelectorConfig {
                key: key.to_string(),
                label,
                choices,
            });
        }

        selectors
    }

    pub fn classifier_tables(&self) -> ClassifierTables {
        let classifier = self
            .doc
            .as_table()
            .and_then(|root| root.get("classifier"))
            .and_then(Value::as_table);

        let fallback = |field: &str, default: &str| -> String {
            classifier
                .and_then(|t| t.get(field))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        };

        let axis = |field: &str, fallback_field: &str, default: &str| -> Axis {
            Axis {
                fallback: fallback(fallback_field, default),
                rows: classifier
                    .and_then(|t| t.get(field))
                    .and_then(Value::as_array)
                    .map(|rows| rows.iter().filter_map(axis_row_from_value).collect())
                    .unwrap_or_default(),
            }
        };

        let translations = classifier
            .and_then(|t| t.get("translations"))
            .and_then(Value::as_table)
            .map(|table| {
                table
                    .iter()
                    .filter_map(|(phrase, value)| {
                        let replacement = value.as_str()?.trim();
                        let phrase = phrase.trim();
                        if phrase.is_empty() || replacement.is_empty() {
                            return None;
                        }
                        Some((phrase.to_string(), replacement.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        ClassifierTables::new(
            axis("subject", "subject_fallback", SUBJECT_FALLBACK),
            axis("style", "style_fallback", STYLE_FALLBACK),
            axis("atmosphere", "atmosphere_fallback", ATMOSPHERE_FALLBACK),
            translations,
        )
    }

    fn normalize_doc(&mut self) {
        if !self.doc.is_table() {
            self.doc = Value::Table(Map::new());
        }

        {
            let app = self.ensure_app_table_mut();

            let theme = app
                .get("theme")
                .and_then(Value::as_str)
                .filter(|v| is_valid_theme(v))
                .unwrap_or("dark")
                .to_string();
            app.insert("theme".to_string(), Value::String(theme));

            let port = app
                .get("server_port")
                .and_then(value_to_i64)
                .filter(|v| (1..=65_535).contains(v))
                .unwrap_or(3000);
            app.insert("server_port".to_string(), Value::Integer(port));

            let notice = app
                .get("notice_duration_sec")
                .and_then(value_to_f64)
                .filter(|v| *v > 0.0)
                .unwrap_or(3.0);
            app.insert("notice_duration_sec".to_string(), Value::Float(notice));

            let limit = app
                .get("gallery_display_limit")
                .and_then(value_to_i64)
                .filter(|v| *v > 0)
                .unwrap_or(4);
            app.insert("gallery_display_limit".to_string(), Value::Integer(limit));

            let debounce = app
                .get("copy_debounce_sec")
                .and_then(value_to_f64)
                .filter(|v| *v >= 0.0)
                .unwrap_or(2.0);
            app.insert("copy_debounce_sec".to_string(), Value::Float(debounce));
        }

        self.normalize_selectors();
        self.normalize_classifier();
    }

    /// Rebuilds the selector array so exactly the three axes exist, in
    /// order, each with a label and a non-empty choice list. User-edited
    /// choices survive; unknown axes do not.
    fn normalize_selectors(&mut self) {
        let existing = self.selectors();

        let mut rebuilt = Vec::new();
        for (index, key) in AXIS_KEYS.iter().enumerate() {
            let row = existing.iter().find(|s| s.key == *key);

            let mut table = Map::new();
            table.insert("key".to_string(), Value::String((*key).to_string()));
            table.insert(
                "label".to_string(),
                Value::String(
                    row.map(|s| s.label.clone())
                        .unwrap_or_else(|| AXIS_LABELS[index].to_string()),
                ),
            );

            let choices = match row {
                Some(s) => s.choices.clone(),
                None => BUILTIN_CHOICES[index]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            };
            table.insert(
                "choices".to_string(),
                Value::Array(choices.into_iter().map(Value::String).collect()),
            );

            rebuilt.push(Value::Table(table));
        }

        let root = self.root_table_mut();
        root.insert("selectors".to_string(), Value::Array(rebuilt));
    }

    fn normalize_classifier(&mut self) {
        let classifier = self.ensure_classifier_table_mut();

        for (field, default) in [
            ("subject_fallback", SUBJECT_FALLBACK),
            ("style_fallback", STYLE_FALLBACK),
            ("atmosphere_fallback", ATMOSPHERE_FALLBACK),
        ] {
            let value = classifier
                .get(field)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string();
            classifier.insert(field.to_string(), Value::String(value));
        }

        for (field, builtin) in [
            ("subject", BUILTIN_SUBJECT_ROWS),
            ("style", BUILTIN_STYLE_ROWS),
            ("atmosphere", BUILTIN_ATMOSPHERE_ROWS),
        ] {
            let mut rows: Vec<Value> = classifier
                .get(field)
                .and_then(Value::as_array)
                .map(|raw| {
                    raw.iter()
                        .filter_map(axis_row_from_value)
                        .map(axis_row_to_value)
                        .collect()
                })
                .unwrap_or_default();

            if rows.is_empty() {
                rows = builtin
                    .iter()
                    .map(|(category, label, keywords)| {
                        axis_row_to_value(AxisRow {
                            category: category.to_string(),
                            label: label.to_string(),
                            keywords: keywords.iter().map(|kw| kw.to_lowercase()).collect(),
                        })
                    })
                    .collect();
            }

            classifier.insert(field.to_string(), Value::Array(rows));
        }

        let has_translations = classifier
            .get("translations")
            .and_then(Value::as_table)
            .map(|t| !t.is_empty())
            .unwrap_or(false);
        if !has_translations {
            let mut table = Map::new();
            for (phrase, replacement) in BUILTIN_TRANSLATIONS {
                table.insert(phrase.to_string(), Value::String(replacement.to_string()));
            }
            classifier.insert("translations".to_string(), Value::Table(table));
        }
    }

    fn app_table(&self) -> Option<&Map<String, Value>> {
        self.doc
            .as_table()
            .and_then(|root| root.get("app"))
            .and_then(Value::as_table)
    }

    fn root_table_mut(&mut self) -> &mut Map<String, Value> {
        if !self.doc.is_table() {
            self.doc = Value::Table(Map::new());
        }
        self.doc
            .as_table_mut()
            .expect("root should be table after normalization")
    }

    fn ensure_app_table_mut(&mut self) -> &mut Map<String, Value> {
        let root = self.root_table_mut();
        let app = root
            .entry("app".to_string())
            .or_insert_with(|| Value::Table(Map::new()));
        if !app.is_table() {
            *app = Value::Table(Map::new());
        }
        app.as_table_mut()
            .expect("app should be table after normalization")
    }

    fn ensure_classifier_table_mut(&mut self) -> &mut Map<String, Value> {
        let root = self.root_table_mut();
        let classifier = root
            .entry("classifier".to_string())
            .or_insert_with(|| Value::Table(Map::new()));
        if !classifier.is_table() {
            *classifier = Value::Table(Map::new());
        }
        classifier
            .as_table_mut()
            .expect("classifier should be table after normalization")
    }
}

fn is_valid_theme(value: &str) -> bool {
    value == "light" || value == "dark"
}

fn axis_row_from_value(value: &Value) -> Option<AxisRow> {
    let table = value.as_table()?;
    let category = table
        .get("category")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())?
        .to_string();
    let label = table
        .get("label")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(category.as_str())
        .to_string();

    let keywords: Vec<String> = table
        .get("keywords")
        .and_then(Value::as_array)
        .map(|raw| {
            raw.iter()
                .filter_map(Value::as_str)
                .map(|kw| kw.trim().to_lowercase())
                .filter(|kw| !kw.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if keywords.is_empty() {
        return None;
    }

    Some(AxisRow {
        category,
        label,
        keywords,
    })
}

fn axis_row_to_value(row: AxisRow) -> Value {
    let mut table = Map::new();
    table.insert("category".to_string(), Value::String(row.category));
    table.insert("label".to_string(), Value::String(row.label));
    table.insert(
        "keywords".to_string(),
        Value::Array(row.keywords.into_iter().map(Value::String).collect()),
    );
    Value::Table(table)
}

fn normalize_choices(value: Option<&Value>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    if let Some(Value::Array(items)) = value {
        for item in items {
            let Some(text) = item.as_str().map(str::trim).filter(|v| !v.is_empty()) else {
                continue;
            };
            if !normalized.iter().any(|existing| existing == text) {
                normalized.push(text.to_string());
            }
        }
    }
    normalized
}

fn value_to_f64(value: &Value) -> Option<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|v| v as f64))
        .or_else(|| value.as_str().and_then(|v| v.parse::<f64>().ok()))
}

fn value_to_i64(value: &Value) -> Option<i64> {
    value
        .as_integer()
        .or_else(|| value.as_float().map(|v| v as i64))
        .or_else(|| value.as_str().and_then(|v| v.parse::<i64>().ok()))
}

#[cfg(test)]
mod tests {
    use super::{ConfigStore, AXIS_KEYS};
    use std::fs;
    use std::path::PathBuf;

    fn fixture_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "prompt_studio_config_test_{}_{}.toml",
            name,
            std::process::id()
        ));
        path
    }

    #[test]
    fn missing_file_is_seeded_with_defaults() {
        let path = fixture_path("seed");
        fs::remove_file(&path).ok();

        let store = ConfigStore::new(path.clone()).expect("create store");
        assert!(path.exists(), "config file should be created");
        assert_eq!(store.theme(), "dark");
        assert_eq!(store.server_port(), 3000);
        assert_eq!(store.gallery_display_limit(), 4);

        let selectors = store.selectors();
        let keys: Vec<&str> = selectors.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, AXIS_KEYS);
        assert!(selectors.iter().all(|s| !s.choices.is_empty()));

        fs::remove_file(path).ok();
    }

    #[test]
    fn invalid_values_are_normalized() {
        let path = fixture_path("normalize");
        fs::write(
            &path,
            r#"
[app]
theme = "sepia"
notice_duration_sec = -5
gallery_display_limit = 0
"#,
        )
        .expect("fixture write");

        let store = ConfigStore::new(path.clone()).expect("load store");
        assert_eq!(store.theme(), "dark");
        assert!((store.notice_duration_sec() - 3.0).abs() < f64::EPSILON);
        assert_eq!(store.gallery_display_limit(), 4);

        fs::remove_file(path).ok();
    }

    #[test]
    fn user_choices_survive_normalization() {
        let path = fixture_path("choices");
        fs::write(
            &path,
            r#"
[[selectors]]
key = "subject"
label = "Subject"
choices = ["a red fox", "", "a red fox", "a paper boat"]
"#,
        )
        .expect("fixture write");

        let store = ConfigStore::new(path.clone()).expect("load store");
        let selectors = store.selectors();
        let subject = selectors
            .iter()
            .find(|s| s.key == "subject")
            .expect("subject axis");
        assert_eq!(subject.choices, vec!["a red fox", "a paper boat"]);

        // The other two axes were seeded.
        assert_eq!(selectors.len(), 3);

        fs::remove_file(path).ok();
    }

    #[test]
    fn classifier_row_order_is_preserved_from_file() {
        let path = fixture_path("row_order");
        fs::write(
            &path,
            r#"
[[classifier.subject]]
category = "creature"
label = "A majestic creature study"
keywords = ["cat"]

[[classifier.subject]]
category = "technology"
label = "A cutting-edge technological vision"
keywords = ["robot"]
"#,
        )
        .expect("fixture write");

        let store = ConfigStore::new(path.clone()).expect("load store");
        let tables = store.classifier_tables();

        // Declaration order decides: creature comes first in this file, so
        // text with both keywords resolves to creature.
        let result = tables.classify("a robot and a cat");
        assert_eq!(result.subject.category.as_deref(), Some("creature"));

        fs::remove_file(path).ok();
    }

    #[test]
    fn set_theme_persists_across_reload() {
        let path = fixture_path("theme");
        fs::remove_file(&path).ok();

        let mut store = ConfigStore::new(path.clone()).expect("create store");
        store.set_theme("light").expect("set theme");

        let reloaded = ConfigStore::new(path.clone()).expect("reload store");
        assert_eq!(reloaded.theme(), "light");

        fs::remove_file(path).ok();
    }

    #[test]
    fn set_theme_rejects_unknown_theme() {
        let path = fixture_path("theme_invalid");
        fs::remove_file(&path).ok();

        let mut store = ConfigStore::new(path.clone()).expect("create store");
        let err = store.set_theme("sepia").expect_err("unknown theme");
        assert!(err.to_string().contains("unknown theme"));
        assert_eq!(store.theme(), "dark");

        fs::remove_file(path).ok();
    }
}
