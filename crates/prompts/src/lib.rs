//! Prompt catalog.
//!
//! Templates are TOML files with `system` and `user` string fields, loaded
//! once at startup. A missing required template is a startup failure, not
//! a per-request one.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplate {
    pub system: String,
    pub user: String,
}

impl PromptTemplate {
    /// Replaces every `{name}` placeholder with its value from `vars`.
    /// Placeholders with no matching entry are left untouched so a caller
    /// can spot a missing substitution during review rather than silently
    /// shipping a literal `{placeholder}` to the model.
    pub fn render(&self, vars: &HashMap<&str, String>) -> (String, String) {
        (substitute(&self.system, vars), substitute(&self.user, vars))
    }
}

fn substitute(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        rendered = rendered.replace(&format!("{{{key}}}"), value);
    }
    rendered
}

/// Immutable, process-wide set of prompt templates. Built once and shared
/// read-only.
pub struct PromptCatalog {
    templates: HashMap<String, PromptTemplate>,
}

impl PromptCatalog {
    /// Loads every `*.toml` file in `dir` as a template named after its
    /// file stem, then verifies every name in `required` is present.
    pub fn load_from_dir(dir: impl AsRef<Path>, required: &[&str]) -> Result<Self> {
        let dir = dir.as_ref();
        let mut templates = HashMap::new();

        let entries = fs::read_dir(dir)
            .with_context(|| format!("failed to read prompt directory {}", dir.display()))?;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| anyhow::anyhow!("prompt file {} has no usable stem", path.display()))?
                .to_string();

            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read prompt template {}", path.display()))?;
            let template: PromptTemplate = toml::from_str(&raw)
                .with_context(|| format!("malformed prompt template {}", path.display()))?;

            info!(template = %name, "loaded prompt template");
            templates.insert(name, template);
        }

        let catalog = Self { templates };
        catalog.ensure_present(required)?;
        Ok(catalog)
    }

    pub fn from_templates(templates: HashMap<String, PromptTemplate>) -> Self {
        Self { templates }
    }

    fn ensure_present(&self, required: &[&str]) -> Result<()> {
        let missing: Vec<&str> = required.iter().filter(|name| !self.templates.contains_key(**name)).copied().collect();
        if !missing.is_empty() {
            bail!("missing required prompt templates: {}", missing.join(", "));
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&PromptTemplate> {
        self.templates.get(name).ok_or_else(|| anyhow::anyhow!("no such prompt template: {name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_template(dir: &Path, name: &str, system: &str, user: &str) {
        let contents = format!("system = \"{system}\"\nuser = \"{user}\"\n");
        fs::write(dir.join(format!("{name}.toml")), contents).unwrap();
    }

    #[test]
    fn loads_and_finds_required_templates() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "personal_derive", "You are a gentle interviewer.", "Base: {base_question}");

        let catalog = PromptCatalog::load_from_dir(dir.path(), &["personal_derive"]).unwrap();
        let template = catalog.get("personal_derive").unwrap();
        assert!(template.user.contains("{base_question}"));
    }

    #[test]
    fn missing_required_template_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "personal_derive", "sys", "usr");

        let result = PromptCatalog::load_from_dir(dir.path(), &["personal_derive", "family_recent"]);
        assert!(result.is_err());
    }

    #[test]
    fn placeholder_substitution_fills_every_occurrence() {
        let template = PromptTemplate {
            system: "You write for {role}.".to_string(),
            user: "{role} asked: {question}".to_string(),
        };
        let mut vars = HashMap::new();
        vars.insert("role", "엄마".to_string());
        vars.insert("question", "오늘 뭐 했어?".to_string());

        let (system, user) = template.render(&vars);
        assert_eq!(system, "You write for 엄마.");
        assert_eq!(user, "엄마 asked: 오늘 뭐 했어?");
    }
}
