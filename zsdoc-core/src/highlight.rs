use std::sync::LazyLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

// Initialize syntax highlighting resources once
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Grammars used by the code helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    ZScript,
    Cpp,
    Shell,
}

impl Language {
    fn syntax(self) -> Option<&'static SyntaxReference> {
        match self {
            // No bundled grammar for ZScript, its syntax is C-like
            Language::ZScript | Language::Cpp => SYNTAX_SET.find_syntax_by_token("cpp"),
            Language::Shell => SYNTAX_SET.find_syntax_by_token("sh"),
        }
    }
}

/// Highlights `code` into class-annotated HTML, without the surrounding
/// `<pre>`/`<code>` tags. Falls back to escaped plain text.
pub fn highlight(code: &str, language: Language) -> String {
    let Some(syntax) = language.syntax() else {
        return escape(code);
    };

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            tracing::warn!(error = %e, "Highlighting failed, emitting plain text");
            return escape(code);
        }
    }

    generator.finalize()
}

pub fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}
