//! Formatting helpers available to page templates.
//!
//! Every helper is a tera filter, so it works on inline text as well as on a
//! block of content:
//!
//! ```text
//! {{ "main.zs" | filepath }}
//! {% filter code_block(label="Hello world") %}zs.print("hello");{% endfilter %}
//! ```
//!
//! Helpers that need page state (active navigation links, numbering, figure
//! captions) are bound to a [`PageScope`] and installed on the engine used
//! for that page only.
//!
//! The figure number is only live through the `figure_count()` function. The
//! `figure_count` context variable is fixed at 0 when the page starts, so
//! `{{ figure_count }}` never reflects the figures rendered so far.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tera::{Tera, Value};

use crate::context::PageContext;
use crate::highlight::{Language, highlight};
use crate::site_map::{PageInfo, SiteInfo};

type Args = HashMap<String, Value>;

/// Sequential figure numbers for code blocks of one page.
#[derive(Debug, Default)]
pub struct FigureCounter(AtomicUsize);

impl FigureCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the next figure number. The first figure is 1.
    pub fn next(&self) -> usize {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Number of the most recently claimed figure, 0 when none.
    pub fn current(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// Page state the helpers read while one page renders.
#[derive(Debug)]
pub struct PageScope {
    global_page_name: String,
    page_name: String,
    page_section: String,
    product_name: String,
    page_info: Option<PageInfo>,
    site_info: Option<Arc<SiteInfo>>,
    figures: FigureCounter,
}

impl PageScope {
    pub fn new(
        context: &PageContext<'_>,
        site_info: Option<Arc<SiteInfo>>,
        product_name: impl Into<String>,
    ) -> Self {
        Self {
            global_page_name: context.global_page_name.clone(),
            page_name: context.page_name.clone(),
            page_section: context.page_section.clone(),
            product_name: product_name.into(),
            page_info: context.page_info.cloned(),
            site_info,
            figures: FigureCounter::new(),
        }
    }

    pub fn figures(&self) -> &FigureCounter {
        &self.figures
    }

    fn site_entry(&self, name: &str) -> tera::Result<&PageInfo> {
        self.site_info
            .as_ref()
            .and_then(|info| info.get(name))
            .ok_or_else(|| tera::Error::msg(format!("Unknown page in site info: {name}")))
    }

    fn zname(&self) -> String {
        format!(
            r#"<span class="zscript-name-in-text">{}</span>"#,
            self.product_name
        )
    }

    fn nav_item(&self, label: &Value, args: &Args) -> tera::Result<Value> {
        let label = text(label);
        let href = arg(args, "href").unwrap_or_default();
        let active = if self.global_page_name == label {
            "active"
        } else {
            ""
        };

        Ok(html(format!(
            r#"<a class="nav-link {active}" href="{href}">{label}</a>"#
        )))
    }

    fn figure(&self, code: &Value, args: &Args, kind: FigureKind) -> tera::Result<Value> {
        let code = highlight(&text(code), kind.language());
        let index = self.figures.next();
        let label = arg(args, "label").unwrap_or_default();
        let caption = format!("<strong>Figure {index}&nbsp;</strong>{label}");

        let pre = match kind {
            FigureKind::ZScript => {
                r#"<pre><code class="zscript-code hljs language-cpp">"#
            }
            FigureKind::Cpp => r#"<pre><code class="hljs language-cpp">"#,
            FigureKind::Error => {
                r#"<pre class="zscript-error-code"><code class="zscript-code hljs language-zscript">"#
            }
        };

        Ok(html(format!(
            r#"<figure>
        {pre}{code}</code></pre>
        <figcaption class="blockquote-footer text-center">{caption}</figcaption>
      </figure>"#
        )))
    }

    fn terminal_block(&self, output: &Value, args: &Args) -> tera::Result<Value> {
        let code = highlight(&text(output), Language::Shell);
        let figure = if flag(args, "add_figure_count") {
            format!(
                r#" <span class="terminal-output-figure">&nbsp;[Figure {}]</span>"#,
                self.figures.current()
            )
        } else {
            String::new()
        };

        Ok(html(format!(
            r#"<div class="terminal " role="alert">
      <div class=fakeMenu>
        <div class="fakeButtons fakeClose"></div>
        <div class="fakeButtons fakeMinimize"></div>
        <div class="fakeButtons fakeZoom"></div>
        <div class="fakeTitle">Output{figure}</div>
      </div>
      <div class="fakeScreen">
        <pre><code class="terminal-code hljs language-shell">{code}</code></pre>
      </div>
    </div>"#
        )))
    }

    fn page_section(&self, body: &Value) -> tera::Result<Value> {
        let info = self.page_info.as_ref().ok_or_else(|| {
            tera::Error::msg(format!(
                "page_section used on '{}', which is not in the site map",
                self.page_name
            ))
        })?;

        Ok(html(format!(
            r#"<section class="zscript-top-section">
        <h1 class="zscript-page-title"><span class="zscript-page-title-num">{}&nbsp;</span>{}</h1>
          {}
      </section>"#,
            info.num,
            info.label,
            text(body)
        )))
    }

    fn sidebar_item(&self, value: &Value, args: &Args) -> tera::Result<Value> {
        // `name=` marks the block form, where the piped value is nested content
        let (name, content) = match arg(args, "name") {
            Some(name) => (name, text(value)),
            None => (text(value), String::new()),
        };
        let entry = self.site_entry(&name)?;
        let selected = if self.page_name == name {
            "zscript-sidebar-selected-item"
        } else {
            ""
        };

        Ok(html(format!(
            r#"<li>
      <a id="side-menu-{name}" href="{name}.html"
        class="zscript-sidebar-item {selected} d-inline-flex">
          <span class="zscript-sidebar-item-num">{}&nbsp;</span>
          <span>{}</span>
      </a>
      {content}
    </li>"#,
            entry.num, entry.label
        )))
    }

    fn sidebar_section(&self, label: &Value, args: &Args) -> tera::Result<Value> {
        let label = text(label);
        let name = arg(args, "name")
            .ok_or_else(|| tera::Error::msg("sidebar_section requires a `name` argument"))?;
        let selected = if self.page_section == name {
            "zscript-sidebar-section-selected"
        } else {
            ""
        };

        Ok(html(format!(
            r##"<button id="{name}-collapse-button"
        class="btn zscript-sidebar-section-button {selected} d-inline-flex align-items-center rounded border-0 collapsed"
        data-bs-toggle="collapse" data-bs-target="#{name}-collapse" aria-expanded="true">
        {label}
      </button>"##
        )))
    }
}

#[derive(Debug, Clone, Copy)]
enum FigureKind {
    ZScript,
    Cpp,
    Error,
}

impl FigureKind {
    fn language(self) -> Language {
        match self {
            FigureKind::Cpp => Language::Cpp,
            FigureKind::ZScript | FigureKind::Error => Language::ZScript,
        }
    }
}

/// Installs every helper on `tera`, bound to `scope`.
pub fn register(tera: &mut Tera, scope: Arc<PageScope>) {
    tera.register_filter("link", link);
    tera.register_filter("pad", pad);
    tera.register_filter("filepath", filepath);
    tera.register_filter("bold", bold);
    tera.register_filter("inline_code", inline_code);
    tera.register_filter("intext_code", intext_code);
    tera.register_filter("code_file", code_file);
    tera.register_filter("content_container", content_container);

    let s = Arc::clone(&scope);
    tera.register_filter("zname", move |_: &Value, _: &Args| -> tera::Result<Value> {
        Ok(html(s.zname()))
    });
    let s = Arc::clone(&scope);
    tera.register_function("product_name", move |_: &Args| -> tera::Result<Value> {
        Ok(Value::String(s.product_name.clone()))
    });
    let s = Arc::clone(&scope);
    tera.register_function("figure_count", move |_: &Args| -> tera::Result<Value> {
        Ok(Value::from(s.figures.current()))
    });

    let s = Arc::clone(&scope);
    tera.register_filter("nav_item", move |v: &Value, a: &Args| s.nav_item(v, a));
    let s = Arc::clone(&scope);
    tera.register_filter("code_block", move |v: &Value, a: &Args| {
        s.figure(v, a, FigureKind::ZScript)
    });
    let s = Arc::clone(&scope);
    tera.register_filter("cpp_code_block", move |v: &Value, a: &Args| {
        s.figure(v, a, FigureKind::Cpp)
    });
    let s = Arc::clone(&scope);
    tera.register_filter("error_code_block", move |v: &Value, a: &Args| {
        s.figure(v, a, FigureKind::Error)
    });
    let s = Arc::clone(&scope);
    tera.register_filter("terminal_block", move |v: &Value, a: &Args| {
        s.terminal_block(v, a)
    });
    let s = Arc::clone(&scope);
    tera.register_filter("page_section", move |v: &Value, _: &Args| s.page_section(v));
    let s = Arc::clone(&scope);
    tera.register_filter("sidebar_item", move |v: &Value, a: &Args| s.sidebar_item(v, a));
    let s = scope;
    tera.register_filter("sidebar_section", move |v: &Value, a: &Args| {
        s.sidebar_section(v, a)
    });
}

fn link(value: &Value, _: &Args) -> tera::Result<Value> {
    Ok(html(format!(
        r#"<link href="{}" rel="stylesheet" type="text/css">"#,
        text(value)
    )))
}

fn pad(value: &Value, _: &Args) -> tera::Result<Value> {
    let height = match text(value).trim() {
        "" => "0".to_string(),
        h => h.to_string(),
    };
    Ok(html(format!(
        r#"<p style="padding-block: {height}rem;"></p>"#
    )))
}

fn filepath(value: &Value, _: &Args) -> tera::Result<Value> {
    Ok(html(format!(
        r#"<span class="zscript-filepath">{}</span>"#,
        text(value)
    )))
}

fn bold(value: &Value, _: &Args) -> tera::Result<Value> {
    Ok(html(format!("<strong>{}</strong>", text(value))))
}

fn inline_code(value: &Value, _: &Args) -> tera::Result<Value> {
    Ok(html(format!(
        r#"<code class="inline-code">{}</code>"#,
        text(value)
    )))
}

fn intext_code(value: &Value, _: &Args) -> tera::Result<Value> {
    Ok(html(format!(
        r#"<code class="zscript-intext-code">{}</code>"#,
        text(value)
    )))
}

fn code_file(value: &Value, args: &Args) -> tera::Result<Value> {
    let code = highlight(&text(value), Language::ZScript);
    let filename = arg(args, "filename").unwrap_or_default();

    Ok(html(format!(
        r#"<div class="card">
        <div class="card-header example-filepath-header">{filename}</div>
        <div class="card-body">
          <pre class="file-example"><code class="zscript language-zscript zscript-code">{code}</code></pre>
        </div>
      </div>"#
    )))
}

fn content_container(value: &Value, _: &Args) -> tera::Result<Value> {
    Ok(html(format!(
        r#"<div id="content-container" class="container">
      <div class="row">
        <div id="content" class="mx-auto col-10">
          {}
        </div>
      </div>
    </div>"#,
        text(value)
    )))
}

fn html(markup: String) -> Value {
    Value::String(markup)
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn arg(args: &Args, key: &str) -> Option<String> {
    args.get(key).map(text)
}

fn flag(args: &Args, key: &str) -> bool {
    match args.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::site_map::FlatSiteMap;

    fn sample() -> FlatSiteMap {
        let config: Config = toml::from_str(include_str!("../../zsdoc.toml")).unwrap();
        FlatSiteMap::flatten(&config.site_map).unwrap()
    }

    fn render_for(flat: &FlatSiteMap, page: &str, template: &str) -> tera::Result<String> {
        render_with_product(flat, page, "ZScript", template)
    }

    fn render_with_product(
        flat: &FlatSiteMap,
        page: &str,
        product_name: &str,
        template: &str,
    ) -> tera::Result<String> {
        let index = flat.pages().position(|p| p.name == page).unwrap();
        let context = PageContext::for_page(flat, index, "Documentation").unwrap();
        let scope = Arc::new(PageScope::new(
            &context,
            Some(flat.shared_site_info()),
            product_name,
        ));

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        register(&mut tera, scope);
        tera.add_raw_template("page", template)?;
        tera.render("page", &tera::Context::from_serialize(&context)?)
    }

    #[test]
    fn test_inline_helpers() {
        let flat = sample();
        let out = render_for(
            &flat,
            "intro-overview",
            r#"{{ "a.css" | link }}|{{ "" | pad }}|{{ 2 | pad }}|{{ "x.zs" | filepath }}|{{ "b" | bold }}|{{ "" | zname }}|{{ "c" | inline_code }}|{{ "d" | intext_code }}"#,
        )
        .unwrap();

        assert_eq!(
            out,
            concat!(
                r#"<link href="a.css" rel="stylesheet" type="text/css">|"#,
                r#"<p style="padding-block: 0rem;"></p>|"#,
                r#"<p style="padding-block: 2rem;"></p>|"#,
                r#"<span class="zscript-filepath">x.zs</span>|"#,
                r#"<strong>b</strong>|"#,
                r#"<span class="zscript-name-in-text">ZScript</span>|"#,
                r#"<code class="inline-code">c</code>|"#,
                r#"<code class="zscript-intext-code">d</code>"#
            )
        );
    }

    #[test]
    fn test_block_form() {
        let flat = sample();
        let out = render_for(&flat, "intro-overview", "{% filter bold %}hi {{ page_name }}{% endfilter %}")
            .unwrap();
        assert_eq!(out, "<strong>hi intro-overview</strong>");
    }

    #[test]
    fn test_content_container_block() {
        let flat = sample();
        let out = render_for(
            &flat,
            "intro-overview",
            "{% filter content_container %}<p>{{ page_title }}</p>{% endfilter %}",
        )
        .unwrap();
        assert_eq!(
            out,
            r#"<div id="content-container" class="container">
      <div class="row">
        <div id="content" class="mx-auto col-10">
          <p>Overview</p>
        </div>
      </div>
    </div>"#
        );
    }

    #[test]
    fn test_product_name_is_configured() {
        let flat = sample();
        let out = render_with_product(
            &flat,
            "intro-overview",
            "ZS Lang",
            r#"{{ product_name() }}|{{ "" | zname }}"#,
        )
        .unwrap();
        assert_eq!(out, r#"ZS Lang|<span class="zscript-name-in-text">ZS Lang</span>"#);
    }

    #[test]
    fn test_figure_count_variable_is_not_live() {
        let flat = sample();
        let out = render_for(
            &flat,
            "intro-overview",
            "{% filter code_block %}a{% endfilter %}|{{ figure_count }}|{{ figure_count() }}",
        )
        .unwrap();
        assert!(out.ends_with("|0|1"));
    }

    #[test]
    fn test_figures_are_numbered_in_order() {
        let flat = sample();
        let out = render_for(
            &flat,
            "language-types",
            r#"{% filter code_block(label="First") %}var a = 1;{% endfilter %}
{% filter cpp_code_block %}int b = 2;{% endfilter %}
{% filter terminal_block(add_figure_count=true) %}3{% endfilter %}
{% filter error_code_block(label="Bad") %}int c = "x";{% endfilter %}
{{ figure_count() }}"#,
        )
        .unwrap();

        let first = out.find("Figure 1&nbsp;</strong>First").unwrap();
        let second = out.find("Figure 2&nbsp;</strong>").unwrap();
        let terminal = out.find("[Figure 2]").unwrap();
        let third = out.find("Figure 3&nbsp;</strong>Bad").unwrap();
        assert!(first < second && second < terminal && terminal < third);
        assert!(out.contains(r#"<pre class="zscript-error-code">"#));
        assert!(out.trim_end().ends_with('3'));
    }

    #[test]
    fn test_terminal_without_figure() {
        let flat = sample();
        let out = render_for(
            &flat,
            "intro-overview",
            "{% filter terminal_block %}ls{% endfilter %}",
        )
        .unwrap();
        assert!(out.contains(r#"<div class="fakeTitle">Output</div>"#));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let flat = sample();
        let template = r#"{% filter code_block %}a{% endfilter %}{% filter code_block %}b{% endfilter %}"#;
        let first = render_for(&flat, "intro-overview", template).unwrap();
        let second = render_for(&flat, "intro-overview", template).unwrap();
        assert_eq!(first, second);
        assert!(!first.contains("Figure 3"));
    }

    #[test]
    fn test_nav_item_active() {
        let flat = sample();
        let out = render_for(
            &flat,
            "intro-overview",
            r#"{{ "Documentation" | nav_item(href="intro-overview.html") }} {{ "Home" | nav_item(href="index.html") }}"#,
        )
        .unwrap();
        assert_eq!(
            out,
            r#"<a class="nav-link active" href="intro-overview.html">Documentation</a> <a class="nav-link " href="index.html">Home</a>"#
        );
    }

    #[test]
    fn test_page_section_title() {
        let flat = sample();
        let out = render_for(
            &flat,
            "language-types-integers",
            "{% filter page_section %}body{% endfilter %}",
        )
        .unwrap();
        assert!(out.contains(
            r#"<span class="zscript-page-title-num">2.2.1.&nbsp;</span>Integers</h1>"#
        ));
        assert!(out.contains("body"));
    }

    #[test]
    fn test_sidebar_item() {
        let flat = sample();
        let out = render_for(
            &flat,
            "language-types",
            r#"{{ "language-types" | sidebar_item }}{% filter sidebar_item(name="language-basics") %}<ul></ul>{% endfilter %}"#,
        )
        .unwrap();

        assert!(out.contains(r#"id="side-menu-language-types" href="language-types.html""#));
        assert!(out.contains("zscript-sidebar-item zscript-sidebar-selected-item"));
        assert!(out.contains("2.2.&nbsp;"));
        assert!(out.contains("2.1.&nbsp;</span>\n          <span>Basics</span>"));
        assert!(out.contains("<ul></ul>"));
        assert_eq!(out.matches("zscript-sidebar-selected-item").count(), 1);
    }

    #[test]
    fn test_sidebar_item_unknown_page() {
        let flat = sample();
        let err = render_for(&flat, "intro-overview", r#"{{ "nope" | sidebar_item }}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_sidebar_section() {
        let flat = sample();
        let out = render_for(
            &flat,
            "language-types",
            r#"{{ "Language" | sidebar_section(name="language") }}{{ "API" | sidebar_section(name="api") }}"#,
        )
        .unwrap();
        assert_eq!(out.matches("zscript-sidebar-section-selected").count(), 1);
        assert!(out.contains(r##"data-bs-target="#language-collapse""##));
    }

    #[test]
    fn test_code_file() {
        let flat = sample();
        let out = render_for(
            &flat,
            "intro-overview",
            r#"{% filter code_file(filename="dummy.zs") %}return 1;{% endfilter %}"#,
        )
        .unwrap();
        assert!(out.contains(r#"<div class="card-header example-filepath-header">dummy.zs</div>"#));
    }

    #[test]
    fn test_figure_counter() {
        let counter = FigureCounter::new();
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.next(), 1);
        assert_eq!(counter.next(), 2);
        assert_eq!(counter.current(), 2);
    }
}
