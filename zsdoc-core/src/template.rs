use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tera::{Tera, Value};
use walkdir::WalkDir;

use crate::content::DocumentationContent;
use crate::context::PageContext;
use crate::helpers::{self, PageScope};

/// Partials every documentation page can include, under `partials/docs/`.
pub const DOC_PARTIALS: [&str; 7] = [
    "head",
    "nav",
    "menu",
    "sidebar",
    "bottom-nav",
    "breadcrumb",
    "load-scripts",
];

/// Partials replaced for standalone pages, under `partials/home/`.
pub const HOME_PARTIALS: [&str; 3] = ["head", "nav", "load-scripts"];

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    Tera(#[from] tera::Error),
    #[error("Failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Which set of partials a page renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialSet {
    Docs,
    Home,
}

/// A component template, pre-rendered into the page context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Context key, the file stem without its ordering prefix.
    pub name: String,
    template: String,
}

pub struct TemplateRenderer {
    root: PathBuf,
    tera: Tera,
    components: Vec<Component>,
    home_partials: Vec<(String, String)>,
}

impl TemplateRenderer {
    /// Loads the shared partials and components below `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, TemplateError> {
        let root = root.as_ref().to_path_buf();

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        let mut partials = vec![(
            "meta".to_string(),
            read(&root.join("partials/common/meta.html"))?,
        )];
        for name in DOC_PARTIALS {
            let path = root.join("partials/docs").join(format!("{name}.html"));
            partials.push((name.to_string(), read(&path)?));
        }
        tera.add_raw_templates(partials)?;

        let components = load_components(&root.join("components"), &mut tera)?;
        tracing::debug!(
            root = %root.display(),
            components = components.len(),
            "Loaded templates"
        );

        Ok(Self {
            root,
            tera,
            components,
            home_partials: Vec::new(),
        })
    }

    /// Loads the partials used by [`PartialSet::Home`].
    pub fn load_home_partials(&mut self) -> Result<(), TemplateError> {
        self.home_partials = HOME_PARTIALS
            .iter()
            .map(|name| {
                let path = self.root.join("partials/home").join(format!("{name}.html"));
                Ok((name.to_string(), read(&path)?))
            })
            .collect::<Result<_, TemplateError>>()?;
        Ok(())
    }

    /// Makes `doc_content(key=...)` and `doc_glossary(key=...)` available to
    /// every template.
    pub fn set_content(&mut self, content: Arc<DocumentationContent>) {
        let c = Arc::clone(&content);
        self.tera.register_function(
            "doc_content",
            move |args: &HashMap<String, Value>| -> tera::Result<Value> {
                let key = content_key(args)?;
                c.render_sections(&key)
                    .map(Value::String)
                    .map_err(|e| tera::Error::msg(e.to_string()))
            },
        );
        self.tera.register_function(
            "doc_glossary",
            move |args: &HashMap<String, Value>| -> tera::Result<Value> {
                let key = content_key(args)?;
                content
                    .render_glossary(&key)
                    .map(Value::String)
                    .map_err(|e| tera::Error::msg(e.to_string()))
            },
        );
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Renders the page template at `template` (relative to the template
    /// root) with `context`.
    ///
    /// Helpers are bound to `scope` on a copy of the engine, so nothing set
    /// up for this page outlives the call.
    pub fn render(
        &self,
        template: &Path,
        context: &PageContext<'_>,
        scope: Arc<PageScope>,
        partials: PartialSet,
    ) -> Result<String, TemplateError> {
        let mut tera = self.tera.clone();
        helpers::register(&mut tera, Arc::clone(&scope));
        if partials == PartialSet::Home {
            tera.add_raw_templates(self.home_partials.clone())?;
        }

        let name = template.to_string_lossy().into_owned();
        let source = read(&self.root.join(template))?;
        tera.add_raw_template(&name, &source)?;

        let mut ctx = context.to_tera()?;
        self.prerender_components(&tera, &mut ctx)?;
        let html = tera.render(&name, &ctx)?;

        tracing::debug!(
            page = %context.page_name,
            figures = scope.figures().current(),
            "Rendered page"
        );
        Ok(html)
    }

    /// Renders each component into `ctx` under its name, in file name order.
    ///
    /// A component sees the output of the components rendered before it.
    fn prerender_components(
        &self,
        tera: &Tera,
        ctx: &mut tera::Context,
    ) -> Result<(), TemplateError> {
        for component in &self.components {
            let rendered = tera.render(&component.template, ctx)?;
            ctx.insert(component.name.as_str(), &rendered);
        }
        Ok(())
    }
}

fn load_components(dir: &Path, tera: &mut Tera) -> Result<Vec<Component>, TemplateError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| TemplateError::Read {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "html") {
            files.push(path.to_path_buf());
        }
    }

    let mut components = Vec::with_capacity(files.len());
    let mut sources = Vec::with_capacity(files.len());
    for path in files {
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let template = format!("components/{stem}");
        sources.push((template.clone(), read(&path)?));
        components.push(Component {
            name: strip_order_prefix(&stem).to_string(),
            template,
        });
    }
    tera.add_raw_templates(sources)?;

    Ok(components)
}

/// Drops a leading two-digit ordering prefix such as `01-`.
pub fn strip_order_prefix(name: &str) -> &str {
    let bytes = name.as_bytes();
    let prefixed = bytes.len() > 3
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[2] == b'-';
    if prefixed { &name[3..] } else { name }
}

fn content_key(args: &HashMap<String, Value>) -> tera::Result<String> {
    match args.get("key") {
        Some(Value::String(key)) => Ok(key.clone()),
        _ => Err(tera::Error::msg("expected a string `key` argument")),
    }
}

fn read(path: &Path) -> Result<String, TemplateError> {
    std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })
}
