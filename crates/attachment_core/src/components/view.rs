//! Template view stand-in: loader, engine and view facade.
//!
//! Templates are plain text files with `{{ key }}` placeholders substituted
//! from the top level of a JSON context.

use crate::components::logger::ServiceLogger;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::rc::Rc;

pub const TEMPLATE_EXTENSION: &str = "mustache";

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_\-]+)\s*\}\}").expect("valid placeholder regex")
});

#[derive(Debug)]
pub enum ViewError {
    TemplateNotFound(String),
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ViewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TemplateNotFound(ident) => write!(f, "template not found: {ident}"),
            Self::Read { path, source } => {
                write!(f, "failed to read template `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ViewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TemplateNotFound(_) => None,
            Self::Read { source, .. } => Some(source),
        }
    }
}

/// Finds `<base_path>/<path>/<ident>.mustache` in the first matching path.
#[derive(Debug)]
pub struct TemplateLoader {
    logger: Rc<ServiceLogger>,
    base_path: PathBuf,
    paths: Vec<String>,
}

impl TemplateLoader {
    pub fn new(
        logger: Rc<ServiceLogger>,
        base_path: impl Into<PathBuf>,
        paths: Vec<String>,
    ) -> Self {
        Self {
            logger,
            base_path: base_path.into(),
            paths,
        }
    }

    pub fn load(&self, ident: &str) -> Result<String, ViewError> {
        for path in &self.paths {
            let file = self
                .base_path
                .join(path)
                .join(format!("{ident}.{TEMPLATE_EXTENSION}"));
            if file.is_file() {
                return std::fs::read_to_string(&file)
                    .map_err(|source| ViewError::Read { path: file, source });
            }
        }
        self.logger.warn(&format!(
            "event=template_load module=components status=missing ident={ident}"
        ));
        Err(ViewError::TemplateNotFound(ident.to_string()))
    }
}

#[derive(Debug)]
pub struct TemplateEngine {
    logger: Rc<ServiceLogger>,
    loader: Rc<TemplateLoader>,
}

impl TemplateEngine {
    pub fn new(logger: Rc<ServiceLogger>, loader: Rc<TemplateLoader>) -> Self {
        Self { logger, loader }
    }

    pub fn render(&self, ident: &str, context: &Value) -> Result<String, ViewError> {
        let template = self.loader.load(ident)?;
        Ok(self.render_template(&template, context))
    }

    /// Substitutes placeholders; missing values render as empty strings.
    pub fn render_template(&self, template: &str, context: &Value) -> String {
        let rendered = PLACEHOLDER_RE.replace_all(template, |captures: &Captures<'_>| {
            context.get(&captures[1]).map(scalar_text).unwrap_or_default()
        });
        self.logger.debug("event=template_render module=components status=ok");
        rendered.into_owned()
    }
}

/// Facade handed out under the `view` key.
#[derive(Debug)]
pub struct GenericView {
    logger: Rc<ServiceLogger>,
    engine: Rc<TemplateEngine>,
}

impl GenericView {
    pub fn new(logger: Rc<ServiceLogger>, engine: Rc<TemplateEngine>) -> Self {
        Self { logger, engine }
    }

    pub fn render(&self, ident: &str, context: &Value) -> Result<String, ViewError> {
        self.engine.render(ident, context).inspect_err(|err| {
            self.logger.error(&format!(
                "event=view_render module=components status=error ident={ident} error={err}"
            ));
        })
    }

    pub fn render_template(&self, template: &str, context: &Value) -> String {
        self.engine.render_template(template, context)
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
