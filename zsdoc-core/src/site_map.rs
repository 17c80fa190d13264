//! Site map flattening.
//!
//! The authored site map is a tree of [`SiteNode`]s at most three levels deep:
//! top-level sections, pages, and sub-pages. [`FlatSiteMap::flatten`] turns it
//! into a name-keyed lookup of [`PageInfo`] (every node, any depth) plus the
//! ordered list of pages used for previous/next navigation (depth two and
//! three only).
//!
//! Numbering is hierarchical and 1-based at every level: the second page of
//! the second section is `"2.2."`, its first sub-page `"2.2.1."`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Deepest nesting level accepted in a site map.
pub const MAX_DEPTH: usize = 3;

/// Name-keyed page metadata, exposed to templates as `site_info`.
pub type SiteInfo = BTreeMap<String, PageInfo>;

/// One entry in the authored navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SiteNode {
    pub label: String,
    /// Unique across the whole tree. Used as URL slug and lookup key.
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SiteNode>,
}

impl SiteNode {
    pub fn new(label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
            sections: Vec::new(),
        }
    }

    pub fn with_sections(mut self, sections: Vec<SiteNode>) -> Self {
        self.sections = sections;
        self
    }
}

/// A site map node decorated with its computed numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub label: String,
    pub name: String,
    pub num: String,
    pub depth: usize,
    /// Name of the enclosing node, `None` for top-level sections.
    pub parent: Option<String>,
    /// Names of the direct children, in authored order.
    pub sections: Vec<String>,
}

impl PageInfo {
    /// First hyphen-delimited token of the page name.
    pub fn section(&self) -> &str {
        page_section(&self.name)
    }
}

/// Returns the first hyphen-delimited token of `page_name`.
pub fn page_section(page_name: &str) -> &str {
    page_name.split('-').next().unwrap_or(page_name)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiteMapError {
    #[error("Duplicate page name in site map: {0}")]
    DuplicateName(String),
    #[error("Site map nests deeper than {MAX_DEPTH} levels at: {0}")]
    TooDeep(String),
}

/// Previous and next pages of a flattened page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors<'a> {
    pub previous: Option<&'a PageInfo>,
    pub next: Option<&'a PageInfo>,
}

#[derive(Debug, Clone, Default)]
pub struct FlatSiteMap {
    site_info: Arc<SiteInfo>,
    order: Vec<String>,
}

impl FlatSiteMap {
    pub fn flatten(roots: &[SiteNode]) -> Result<Self, SiteMapError> {
        let mut site_info = SiteInfo::new();
        let mut order = Vec::new();
        visit(roots, None, 1, &mut site_info, &mut order)?;

        tracing::debug!(
            nodes = site_info.len(),
            pages = order.len(),
            "Flattened site map"
        );

        Ok(Self {
            site_info: Arc::new(site_info),
            order,
        })
    }

    /// Lookup of every node in the tree, keyed by name.
    pub fn site_info(&self) -> &SiteInfo {
        &self.site_info
    }

    /// Shared handle to the lookup, for consumers that outlive a borrow.
    pub fn shared_site_info(&self) -> Arc<SiteInfo> {
        Arc::clone(&self.site_info)
    }

    pub fn get(&self, name: &str) -> Option<&PageInfo> {
        self.site_info.get(name)
    }

    /// Number of pages in navigation order.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn page(&self, index: usize) -> Option<&PageInfo> {
        self.order.get(index).and_then(|name| self.site_info.get(name))
    }

    /// Pages in navigation order. Top-level sections are not included.
    pub fn pages(&self) -> impl Iterator<Item = &PageInfo> {
        self.order.iter().filter_map(|name| self.site_info.get(name))
    }

    pub fn neighbors(&self, index: usize) -> Neighbors<'_> {
        Neighbors {
            previous: index.checked_sub(1).and_then(|i| self.page(i)),
            next: self.page(index + 1),
        }
    }
}

fn visit(
    nodes: &[SiteNode],
    parent: Option<(&str, &str)>,
    depth: usize,
    site_info: &mut SiteInfo,
    order: &mut Vec<String>,
) -> Result<(), SiteMapError> {
    for (index, node) in nodes.iter().enumerate() {
        if depth > MAX_DEPTH {
            return Err(SiteMapError::TooDeep(node.name.clone()));
        }
        if site_info.contains_key(&node.name) {
            return Err(SiteMapError::DuplicateName(node.name.clone()));
        }

        let prefix = parent.map(|(_, num)| num).unwrap_or_default();
        let num = format!("{prefix}{}.", index + 1);

        site_info.insert(
            node.name.clone(),
            PageInfo {
                label: node.label.clone(),
                name: node.name.clone(),
                num: num.clone(),
                depth,
                parent: parent.map(|(name, _)| name.to_string()),
                sections: node.sections.iter().map(|s| s.name.clone()).collect(),
            },
        );

        // Top-level sections only group pages, they are never navigated to.
        if depth > 1 {
            order.push(node.name.clone());
        }

        visit(
            &node.sections,
            Some((node.name.as_str(), num.as_str())),
            depth + 1,
            site_info,
            order,
        )?;
    }

    Ok(())
}
