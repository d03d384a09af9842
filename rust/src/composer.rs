use anyhow::{anyhow, Result};

use crate::classifier::ClassifierTables;

/// Optional enhancement modifiers. Empty fields are omitted from the
/// composed prompt; the append order is fixed (negative, aspect ratio,
/// engine annotation).
#[derive(Debug, Clone, Default)]
pub struct EnhanceOptions {
    pub negative: String,
    pub aspect_ratio: String,
    pub engine: String,
}

/// Selector mode: pure template substitution of the three selector values.
pub fn compose(subject: &str, style: &str, lighting: &str) -> String {
    format!("{subject}, {style}, {lighting}, masterfully crafted, hyper-detailed, 8k resolution")
}

/// Enhancement mode: classify the (normalized) free text and template the
/// result. Fails on empty or whitespace-only input; callers surface that
/// through the notice channel rather than propagating it to the UI.
pub fn enhance(tables: &ClassifierTables, text: &str, options: &EnhanceOptions) -> Result<String> {
    let cleaned = text.trim();
    if cleaned.is_empty() {
        return Err(anyhow!("prompt text is empty"));
    }

    let normalized = tables.normalize_input(cleaned);
    let result = tables.classify(&normalized);

    let mut prompt = format!(
        "{} featuring {}, {}, {}, masterfully crafted, award-winning quality",
        result.subject.label, normalized, result.style.label, result.atmosphere.label
    );

    let negative = options.negative.trim();
    if !negative.is_empty() {
        prompt.push_str(&format!(" --no {negative}"));
    }

    let aspect_ratio = options.aspect_ratio.trim();
    if !aspect_ratio.is_empty() {
        prompt.push_str(&format!(" {aspect_ratio}"));
    }

    let engine = options.engine.trim();
    if !engine.is_empty() {
        prompt.push_str(&format!(" [Optimized for {engine}]"));
    }

    Ok(prompt)
}
