//! Diagnostic reporting: levels, codes, and the [`Handler`] that
//! accumulates and renders them.

mod codes;
mod level;

pub use codes::DiagnosticCode;
pub use level::Level;

use crate::{SourceMap, Span};

/// A single reported problem.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub code: DiagnosticCode,
    pub message: String,
    pub span: Span,
}

/// Accumulates diagnostics for one compilation and renders them to a
/// string (with a source snippet and an underline under the offending
/// span, when a [`SourceMap`] is available).
#[derive(Default)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, level: Level, code: DiagnosticCode, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic {
            level,
            code,
            message: message.into(),
            span,
        });
    }

    pub fn error(&mut self, code: DiagnosticCode, message: impl Into<String>, span: Span) {
        self.report(Level::Error, code, message, span);
    }

    pub fn warning(&mut self, code: DiagnosticCode, message: impl Into<String>, span: Span) {
        self.report(Level::Warning, code, message, span);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Renders every accumulated diagnostic, one per line plus a source
    /// snippet when `sources` has the referenced file.
    pub fn render(&self, sources: &SourceMap, use_color: bool) -> String {
        let mut out = String::new();
        for d in &self.diagnostics {
            out.push_str(&render_one(d, sources, use_color));
            out.push('\n');
        }
        out
    }
}

fn render_one(d: &Diagnostic, sources: &SourceMap, use_color: bool) -> String {
    let header = if use_color {
        format!(
            "\x1b[{}m{}[{}]\x1b[0m: {}",
            d.level.color_code(),
            d.level.name(),
            d.code.as_str(),
            d.message
        )
    } else {
        format!("{}[{}]: {}", d.level.name(), d.code.as_str(), d.message)
    };

    let Ok(line) = sources.line_text(d.span) else {
        return format!("{header}\n  --> {}", d.span);
    };
    let path = sources
        .path(d.span.file_id)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<input>".to_string());
    let underline_len = (d.span.len().max(1)) as usize;
    let underline = " ".repeat((d.span.column as usize).saturating_sub(1)) + &"^".repeat(underline_len);
    format!(
        "{header}\n  --> {path}:{}:{}\n   | {line}\n   | {underline}",
        d.span.line, d.span.column
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn has_errors_reflects_error_level_only() {
        let mut h = Handler::new();
        h.warning(DiagnosticCode::W3001_UNUSED_VARIABLE, "unused", Span::DUMMY);
        assert!(!h.has_errors());
        h.error(DiagnosticCode::E3003_UNDEFINED_VARIABLE, "undefined", Span::DUMMY);
        assert!(h.has_errors());
    }

    #[test]
    fn render_includes_code_and_message() {
        let mut sources = SourceMap::new();
        let id = sources.add_file(PathBuf::from("t.toy"), "var a: Int\n".into());
        let span = sources.span(id, 4, 5).unwrap();
        let mut h = Handler::new();
        h.error(DiagnosticCode::E3003_UNDEFINED_VARIABLE, "undefined variable: a", span);
        let rendered = h.render(&sources, false);
        assert!(rendered.contains("E3003"));
        assert!(rendered.contains("undefined variable: a"));
        assert!(rendered.contains("var a: Int"));
    }
}
