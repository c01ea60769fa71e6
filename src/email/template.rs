use serde_json::Value;
use tera::{Context, Tera};

use super::TemplateRenderer;

/// Tera-backed mail template store.
pub struct MailTemplates {
    tera: Tera,
}

impl MailTemplates {
    /// Load every template matching `glob`, e.g. `"templates/mail/**/*.html"`.
    pub fn from_glob(glob: &str) -> Result<MailTemplates, String> {
        let tera = Tera::new(glob).map_err(|e| format!("Failed to load mail templates: {}", e))?;
        Ok(MailTemplates { tera })
    }

    /// Wrap a prebuilt Tera instance (e.g. with raw templates registered).
    pub fn new(tera: Tera) -> MailTemplates {
        MailTemplates { tera }
    }
}

impl TemplateRenderer for MailTemplates {
    fn render(&self, template: &str, data: &Value) -> Result<String, String> {
        let context = Context::from_serialize(data)
            .map_err(|e| format!("Invalid template variables: {}", e))?;

        self.tera
            .render(template, &context)
            .map_err(|e| format!("Template render error: {}", e))
    }
}
