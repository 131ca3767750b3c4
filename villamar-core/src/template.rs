use serde::Serialize;
use tera::{Context, Tera};

#[derive(Debug)]
pub enum TemplateError {
    TeraError(tera::Error),
    IoError(std::io::Error),
}

impl From<tera::Error> for TemplateError {
    fn from(err: tera::Error) -> Self {
        TemplateError::TeraError(err)
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::IoError(err)
    }
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::TeraError(e) => write!(f, "Template error: {}", e),
            TemplateError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for TemplateError {}

/// Tera wrapper holding the theme templates plus the site-wide globals
/// (site config, navigation) merged into every render.
pub struct TemplateRenderer {
    tera: Tera,
    globals: Context,
}

impl TemplateRenderer {
    /// Load every template matching `theme_glob`, e.g. `theme/**/*.html`.
    pub fn new(theme_glob: &str) -> Result<Self, TemplateError> {
        let tera = Tera::new(theme_glob)?;
        let globals = Context::new();

        Ok(Self { tera, globals })
    }

    /// Add a value available to every template.
    pub fn set_global<T: Serialize>(&mut self, key: &str, value: &T) {
        self.globals.insert(key, value);
    }

    /// Register a custom template function.
    pub fn register_function<F>(&mut self, name: &str, function: F)
    where
        F: tera::Function + 'static,
    {
        self.tera.register_function(name, function);
    }

    /// Register a custom template filter.
    pub fn register_filter<F>(&mut self, name: &str, filter: F)
    where
        F: tera::Filter + 'static,
    {
        self.tera.register_filter(name, filter);
    }

    /// Render a template with the page context layered over the globals.
    pub fn render(&self, template: &str, context: &Context) -> Result<String, TemplateError> {
        let mut merged = self.globals.clone();
        merged.extend(context.clone());
        Ok(self.tera.render(template, &merged)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_globals_merge_under_page_context() {
        let mut renderer = TemplateRenderer::new("no-such-theme/**/*.html").unwrap();
        renderer
            .tera
            .add_raw_template("greeting.html", "{{ site_name }}: {{ headline }}")
            .unwrap();
        renderer.set_global("site_name", &"Villamar Estates");
        renderer.set_global("headline", &"overridden below");

        let mut context = Context::new();
        context.insert("headline", "Palm Jumeirah living");
        let html = renderer.render("greeting.html", &context).unwrap();
        assert_eq!(html, "Villamar Estates: Palm Jumeirah living");
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let renderer = TemplateRenderer::new("no-such-theme/**/*.html").unwrap();
        let result = renderer.render("nope.html", &Context::new());
        assert!(matches!(result, Err(TemplateError::TeraError(_))));
    }
}
