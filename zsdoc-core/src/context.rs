use serde::Serialize;

use crate::config::StandalonePage;
use crate::site_map::{FlatSiteMap, PageInfo, SiteInfo, page_section};

/// Link target used when a page has no previous or next page.
pub const NO_PAGE: &str = "#";
/// CSS class applied to the missing side of the previous/next links.
pub const DISABLED: &str = "disabled";

/// Previous/next navigation of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub previous_page_name: String,
    pub next_page_name: String,
    pub previous_page_class: String,
    pub next_page_class: String,
}

impl PageLinks {
    fn new(previous: Option<&PageInfo>, next: Option<&PageInfo>) -> Self {
        fn side(page: Option<&PageInfo>) -> (String, String) {
            match page {
                Some(page) => (page.name.clone(), String::new()),
                None => (NO_PAGE.to_string(), DISABLED.to_string()),
            }
        }

        let (previous_page_name, previous_page_class) = side(previous);
        let (next_page_name, next_page_class) = side(next);

        Self {
            previous_page_name,
            next_page_name,
            previous_page_class,
            next_page_class,
        }
    }
}

/// Values a page template is rendered with.
///
/// Pre-rendered components are added on top of this when the page renders.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext<'a> {
    pub global_page_name: String,
    /// Always 0 here, the live count comes from the `figure_count()` function.
    pub figure_count: usize,
    pub page_name: String,
    pub page_section: String,
    pub page_title: String,
    #[serde(flatten)]
    pub links: Option<PageLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_info: Option<&'a SiteInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_info: Option<&'a PageInfo>,
}

impl<'a> PageContext<'a> {
    /// Context of the page at `index` in navigation order, `None` when out
    /// of bounds.
    pub fn for_page(flat: &'a FlatSiteMap, index: usize, global_page_name: &str) -> Option<Self> {
        let page = flat.page(index)?;
        let neighbors = flat.neighbors(index);

        Some(Self {
            global_page_name: global_page_name.to_string(),
            figure_count: 0,
            page_name: page.name.clone(),
            page_section: page_section(&page.name).to_string(),
            page_title: page.label.clone(),
            links: Some(PageLinks::new(neighbors.previous, neighbors.next)),
            site_info: Some(flat.site_info()),
            page_info: Some(page),
        })
    }

    /// Context of a page outside the site map.
    pub fn standalone(page: &StandalonePage) -> Self {
        Self {
            global_page_name: page.global_page_name.clone(),
            figure_count: 0,
            page_name: page.name.clone(),
            page_section: page_section(&page.name).to_string(),
            page_title: page.title.clone(),
            links: None,
            site_info: None,
            page_info: None,
        }
    }

    pub fn to_tera(&self) -> tera::Result<tera::Context> {
        tera::Context::from_serialize(self)
    }
}
