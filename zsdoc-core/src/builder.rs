use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::{self, AssetError};
use crate::config::{Config, SiteConfig, StandalonePage};
use crate::content::{ContentError, DocumentationContent};
use crate::context::PageContext;
use crate::helpers::PageScope;
use crate::site_map::{FlatSiteMap, SiteMapError, SiteNode};
use crate::template::{PartialSet, TemplateError, TemplateRenderer};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Template directory not specified")]
    MissingTemplateDir,
    #[error(transparent)]
    SiteMap(#[from] SiteMapError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No page at index {0}")]
    PageIndex(usize),
}

/// Files written by one [`Site::render_all`] run.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Rendered pages, site map pages first, in navigation order.
    pub pages: Vec<PathBuf>,
    /// Number of asset files copied.
    pub assets: usize,
}

pub struct SiteBuilder {
    template_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    output_dir: PathBuf,
    content_file: Option<PathBuf>,
    site: SiteConfig,
    site_map: Vec<SiteNode>,
    pages: Vec<StandalonePage>,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            template_dir: None,
            data_dir: None,
            output_dir: PathBuf::from("./dist"),
            content_file: None,
            site: SiteConfig::default(),
            site_map: Vec::new(),
            pages: Vec::new(),
        }
    }

    // Required configuration
    pub fn template_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.template_dir = Some(path.as_ref().to_path_buf());
        self
    }

    // Optional paths
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    /// Static assets copied into the output directory, skipped when `None`.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        self.data_dir = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    pub fn content_file<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        self.content_file = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Takes the site settings, site map and standalone pages from `config`.
    pub fn config(mut self, config: Config) -> Self {
        self.site = config.site;
        self.site_map = config.site_map;
        self.pages = config.pages;
        self
    }

    pub fn site_map(mut self, roots: Vec<SiteNode>) -> Self {
        self.site_map = roots;
        self
    }

    pub fn add_page(mut self, page: StandalonePage) -> Self {
        self.pages.push(page);
        self
    }

    /// Flattens the site map and loads every template, failing before
    /// anything is written.
    pub fn build(self) -> Result<Site, BuildError> {
        let template_dir = self.template_dir.ok_or(BuildError::MissingTemplateDir)?;

        let site_map = FlatSiteMap::flatten(&self.site_map)?;

        let mut renderer = TemplateRenderer::new(&template_dir)?;
        if !self.pages.is_empty() {
            renderer.load_home_partials()?;
        }
        if let Some(path) = &self.content_file {
            let content = DocumentationContent::read(path)?;
            tracing::debug!(path = %path.display(), "Loaded documentation content");
            renderer.set_content(Arc::new(content));
        }

        Ok(Site {
            site: self.site,
            site_map,
            pages: self.pages,
            renderer,
            data_dir: self.data_dir,
            output_dir: self.output_dir,
        })
    }
}

pub struct Site {
    site: SiteConfig,
    site_map: FlatSiteMap,
    pages: Vec<StandalonePage>,
    renderer: TemplateRenderer,
    data_dir: Option<PathBuf>,
    output_dir: PathBuf,
}

impl Site {
    pub fn site_map(&self) -> &FlatSiteMap {
        &self.site_map
    }

    /// Renders the site map page at `index` in navigation order.
    pub fn render_page(&self, index: usize) -> Result<String, BuildError> {
        let context = PageContext::for_page(&self.site_map, index, &self.site.global_page_name)
            .ok_or(BuildError::PageIndex(index))?;
        let scope = Arc::new(PageScope::new(
            &context,
            Some(self.site_map.shared_site_info()),
            self.site.product_name.as_str(),
        ));
        let template = Path::new("pages/docs").join(format!("{}.html", context.page_name));

        Ok(self
            .renderer
            .render(&template, &context, scope, PartialSet::Docs)?)
    }

    pub fn render_standalone(&self, page: &StandalonePage) -> Result<String, BuildError> {
        let context = PageContext::standalone(page);
        let scope = Arc::new(PageScope::new(&context, None, self.site.product_name.as_str()));
        let template = Path::new("pages").join(format!("{}.html", page.template_name()));

        Ok(self
            .renderer
            .render(&template, &context, scope, PartialSet::Home)?)
    }

    /// Renders every page into the output directory and copies the assets.
    ///
    /// Stops at the first failure. Files written before it are left in place.
    pub fn render_all(&self) -> Result<BuildReport, BuildError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| BuildError::Write {
            path: self.output_dir.clone(),
            source,
        })?;

        let mut report = BuildReport::default();

        if let Some(data_dir) = &self.data_dir {
            report.assets = assets::copy_dir(data_dir, &self.output_dir)?;
            tracing::info!(
                files = report.assets,
                from = %data_dir.display(),
                "Copied assets"
            );
        }

        for (index, page) in self.site_map.pages().enumerate() {
            let html = self.render_page(index)?;
            report.pages.push(self.write_page(&page.name, &html)?);
        }

        for page in &self.pages {
            let html = self.render_standalone(page)?;
            report.pages.push(self.write_page(&page.name, &html)?);
        }

        tracing::info!(
            pages = report.pages.len(),
            output = %self.output_dir.display(),
            "Site built"
        );
        Ok(report)
    }

    fn write_page(&self, name: &str, html: &str) -> Result<PathBuf, BuildError> {
        let path = self.output_dir.join(format!("{name}.html"));
        std::fs::write(&path, html).map_err(|source| BuildError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Wrote page");
        Ok(path)
    }
}

/// Builds the site described by `config` in one call.
pub fn build_site(
    config: &Config,
    template_dir: &Path,
    data_dir: Option<&Path>,
    output_dir: &Path,
    content_file: Option<&Path>,
) -> Result<BuildReport, BuildError> {
    let site = SiteBuilder::new()
        .template_dir(template_dir)
        .data_dir(data_dir)
        .output_dir(output_dir)
        .content_file(content_file)
        .config(config.clone())
        .build()?;

    site.render_all()
}
