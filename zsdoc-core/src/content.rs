//! Documentation content tree.
//!
//! Content is a JSON object keyed by top-level section (`"index"`,
//! `"module"`, ...), each holding an ordered list of [`Section`]s that nest
//! recursively through `subsections`. The file may also be the script form
//! used in the browser, `const documentation_content = { ... };`.
//!
//! Sections are numbered and given DOM ids by position:
//!
//! ```text
//! section-1                          "1 - Introduction"
//! section-1-subsection-2             "1.2 - Use Cases"
//! section-1-subsection-2-subsection-1 "1.2.1 - Games"
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::highlight::{Language, escape, highlight};

/// Indentation of one outline level in the glossary.
const GLOSSARY_INDENT_PX: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Failed to read content file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid content JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown content section: {0}")]
    UnknownSection(String),
}

/// A code sample, or several alternatives shown one after another.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Code {
    Single(String),
    Many(Vec<String>),
}

impl Code {
    pub fn snippets(&self) -> &[String] {
        match self {
            Code::Single(code) => std::slice::from_ref(code),
            Code::Many(codes) => codes,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Section {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Raw HTML.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub code: Option<Code>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContentPage {
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DocumentationContent {
    /// Keyed in file order.
    pages: IndexMap<String, ContentPage>,
}

/// Navigation entry of one section, shaped like the section tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub id: String,
    pub title: String,
    pub depth: usize,
    pub children: Vec<OutlineEntry>,
}

impl DocumentationContent {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&source)
    }

    /// Parses plain JSON or a `const name = {...};` script.
    pub fn parse(source: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(strip_assignment(source))?)
    }

    /// Top-level keys in the order they appear in the file.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    pub fn page(&self, key: &str) -> Result<&ContentPage, ContentError> {
        self.pages
            .get(key)
            .ok_or_else(|| ContentError::UnknownSection(key.to_string()))
    }

    pub fn outline(&self, key: &str) -> Result<Vec<OutlineEntry>, ContentError> {
        Ok(outline(&self.page(key)?.sections, None, 1))
    }

    /// Renders every section of `key` as nested `<section>` elements.
    pub fn render_sections(&self, key: &str) -> Result<String, ContentError> {
        let sections = &self.page(key)?.sections;
        let outline = outline(sections, None, 1);

        let mut out = String::new();
        for (section, entry) in sections.iter().zip(&outline) {
            render_section(&mut out, section, entry);
        }
        Ok(out)
    }

    /// Renders the outline of `key` as a flat list of indented anchor links.
    pub fn render_glossary(&self, key: &str) -> Result<String, ContentError> {
        let mut out = String::new();
        for entry in &self.outline(key)? {
            render_glossary_entry(&mut out, entry);
        }
        Ok(out)
    }
}

fn strip_assignment(source: &str) -> &str {
    let trimmed = source.trim();
    if trimmed.starts_with('{') {
        return trimmed;
    }

    let declared = ["const ", "let ", "var "]
        .iter()
        .any(|keyword| trimmed.starts_with(keyword));
    match trimmed.split_once('=') {
        Some((_, value)) if declared => value.trim().trim_end_matches(';').trim_end(),
        _ => trimmed,
    }
}

fn outline(sections: &[Section], parent: Option<(&str, &str)>, depth: usize) -> Vec<OutlineEntry> {
    sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            let position = index + 1;
            let (id, num) = match parent {
                None => (format!("section-{position}"), position.to_string()),
                Some((id, num)) => (
                    format!("{id}-subsection-{position}"),
                    format!("{num}.{position}"),
                ),
            };
            let title = format!("{num} - {}", section.title.as_deref().unwrap_or_default());
            let children = outline(&section.subsections, Some((id.as_str(), num.as_str())), depth + 1);

            OutlineEntry {
                id,
                title,
                depth,
                children,
            }
        })
        .collect()
}

fn render_section(out: &mut String, section: &Section, entry: &OutlineEntry) {
    let level = (entry.depth + 1).min(6);
    let class = if entry.depth == 1 {
        r#" class="zscript-top-section""#
    } else {
        ""
    };

    out.push_str(&format!(r#"<section id="{}"{class}>"#, entry.id));
    out.push_str(&format!("<h{level}>{}</h{level}>", escape(&entry.title)));

    if let Some(subtitle) = &section.subtitle {
        out.push_str(&format!(r#"<p class="zscript-sub-title">{subtitle}</p>"#));
    }
    if let Some(content) = &section.content {
        out.push_str(&format!("<p>{content}</p>"));
    }
    if let Some(code) = &section.code {
        for snippet in code.snippets() {
            out.push_str(&format!(
                r#"<pre><code class="zscript-code">{}</code></pre>"#,
                highlight(snippet, Language::ZScript)
            ));
        }
    }

    for (child, child_entry) in section.subsections.iter().zip(&entry.children) {
        render_section(out, child, child_entry);
    }

    if let Some(script) = &section.script {
        out.push_str(&format!("<script>{script}</script>"));
    }
    out.push_str("</section>");
}

fn render_glossary_entry(out: &mut String, entry: &OutlineEntry) {
    out.push_str(&format!(
        r##"<li><a href="#{}" style="margin-left: {}px">{}</a></li>"##,
        entry.id,
        (entry.depth - 1) * GLOSSARY_INDENT_PX,
        escape(&entry.title)
    ));
    for child in &entry.children {
        render_glossary_entry(out, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"const documentation_content = {
  "index": {
    "sections": [
      {
        "title": "Introduction",
        "subtitle": "Types",
        "content": "ZSCRIPT is <strong>modern</strong>.",
        "subsections": [
          { "title": "Key Features", "content": "<ul><li>a</li></ul>" },
          {
            "title": "Basic Syntax",
            "code": "myVar = 10;",
            "subsections": [
              { "title": "Variables", "code": ["var a;", "int b = 2;"] }
            ]
          }
        ]
      },
      { "title": "Installation", "content": "Steps", "script": "init();" }
    ]
  },
  "module": { "sections": [] }
};
"#;

    fn sample() -> DocumentationContent {
        DocumentationContent::parse(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_script_and_json_forms() {
        let content = sample();
        assert_eq!(content.keys().collect::<Vec<_>>(), ["index", "module"]);

        let json = DocumentationContent::parse(r#"{"import": {"sections": [{"title": "A"}]}}"#)
            .unwrap();
        assert_eq!(json.page("import").unwrap().sections[0].title.as_deref(), Some("A"));
    }

    #[test]
    fn test_code_forms() {
        let content = sample();
        let index = content.page("index").unwrap();
        let basic = &index.sections[0].subsections[1];

        assert_eq!(basic.code, Some(Code::Single("myVar = 10;".into())));
        assert_eq!(basic.subsections[0].code.as_ref().unwrap().snippets().len(), 2);
    }

    #[test]
    fn test_outline_ids_and_titles() {
        let outline = sample().outline("index").unwrap();

        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].id, "section-1");
        assert_eq!(outline[0].title, "1 - Introduction");
        assert_eq!(outline[0].children[1].id, "section-1-subsection-2");
        assert_eq!(outline[0].children[1].title, "1.2 - Basic Syntax");

        let deepest = &outline[0].children[1].children[0];
        assert_eq!(deepest.id, "section-1-subsection-2-subsection-1");
        assert_eq!(deepest.title, "1.2.1 - Variables");
        assert_eq!(deepest.depth, 3);

        assert_eq!(outline[1].id, "section-2");
    }

    #[test]
    fn test_render_sections() {
        let html = sample().render_sections("index").unwrap();

        assert!(html.starts_with(r#"<section id="section-1" class="zscript-top-section"><h2>1 - Introduction</h2>"#));
        assert!(html.contains(r#"<p class="zscript-sub-title">Types</p>"#));
        assert!(html.contains("<p>ZSCRIPT is <strong>modern</strong>.</p>"));
        assert!(html.contains(r#"<section id="section-1-subsection-1"><h3>1.1 - Key Features</h3>"#));
        assert!(html.contains("<h4>1.2.1 - Variables</h4>"));
        assert_eq!(html.matches(r#"<code class="zscript-code">"#).count(), 3);
        assert!(html.contains("<script>init();</script>"));
        assert_eq!(html.matches("<section").count(), html.matches("</section>").count());
    }

    #[test]
    fn test_render_glossary() {
        let html = sample().render_glossary("index").unwrap();

        assert!(html.starts_with(
            r##"<li><a href="#section-1" style="margin-left: 0px">1 - Introduction</a></li>"##
        ));
        assert!(html.contains(
            r##"<a href="#section-1-subsection-2-subsection-1" style="margin-left: 40px">1.2.1 - Variables</a>"##
        ));
        assert_eq!(html.matches("<li>").count(), 5);
    }

    #[test]
    fn test_empty_and_unknown_sections() {
        let content = sample();
        assert_eq!(content.render_sections("module").unwrap(), "");
        assert!(matches!(
            content.render_sections("missing"),
            Err(ContentError::UnknownSection(key)) if key == "missing"
        ));
    }

    #[test]
    fn test_keys_keep_file_order() {
        let content = DocumentationContent::parse(
            r#"{"module": {"sections": []}, "import": {"sections": []}, "index": {"sections": []}}"#,
        )
        .unwrap();
        assert_eq!(content.keys().collect::<Vec<_>>(), ["module", "import", "index"]);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            DocumentationContent::parse("const x = {"),
            Err(ContentError::Json(_))
        ));
    }
}
