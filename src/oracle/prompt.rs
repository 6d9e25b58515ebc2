//! Template-file prompt builder.
//!
//! Prompts are assembled from plain-text fragments stored under
//! `config/prompts/`.  Each layer is appended in order; a missing file falls
//! back to the compiled-in text given to [`layer_or`](PromptBuilder::layer_or)
//! so a prompt is never silently empty.
//!
//! Variable substitution uses `{{key}}` syntax and is applied once at
//! [`build()`](PromptBuilder::build) time, after all layers are joined.
//! Substituted values are inserted verbatim and never rescanned, so a value
//! that itself contains `{{key}}` comes out literally.  Unknown keys are
//! left in place.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

const SEPARATOR: &str = "\n\n";

pub struct PromptBuilder {
    prompts_dir: PathBuf,
    parts: Vec<String>,
    vars: HashMap<String, String>,
}

impl PromptBuilder {
    /// Create a builder rooted at `prompts_dir` (e.g. `"config/prompts"`).
    pub fn new(prompts_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
            parts: Vec::new(),
            vars: HashMap::new(),
        }
    }

    /// Append a layer loaded from `filename`, or `fallback` when the file is
    /// missing or blank.
    pub fn layer_or(self, filename: &str, fallback: &str) -> Self {
        let path = self.prompts_dir.join(filename);
        let text = match fs::read_to_string(&path) {
            Ok(text) if !text.trim().is_empty() => text,
            _ => {
                tracing::debug!("prompt: layer '{}' not found — using built-in text", path.display());
                fallback.to_string()
            }
        };
        self.append(text)
    }

    /// Directly append a text fragment.
    pub fn append(mut self, text: impl Into<String>) -> Self {
        let s = text.into();
        let trimmed = s.trim().to_string();
        if !trimmed.is_empty() {
            self.parts.push(trimmed);
        }
        self
    }

    /// Register `{{key}}` → `value` substitution pairs applied at build time.
    pub fn with_vars<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (k, v) in vars {
            self.vars.insert(k.to_string(), v.to_string());
        }
        self
    }

    pub fn var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    /// Join all layers with blank lines and apply variable substitution.
    pub fn build(self) -> String {
        let template = self.parts.join(SEPARATOR);
        let mut prompt = String::with_capacity(template.len());
        let mut rest = template.as_str();
        while let Some(open) = rest.find("{{") {
            prompt.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            match after.find("}}").and_then(|close| Some((close, self.vars.get(&after[..close])?))) {
                Some((close, value)) => {
                    prompt.push_str(value);
                    rest = &after[close + 2..];
                }
                None => {
                    prompt.push_str("{{");
                    rest = after;
                }
            }
        }
        prompt.push_str(rest);
        prompt
    }
}
