//! Structured diagnostics emitted by migration steps and the orchestrator.
//!
//! A [`Diagnostic`] is a message template with `{Name}` placeholders plus the
//! named arguments that fill them. Sinks receive the structured form and
//! decide how to render it; nothing here writes to a global logger unless
//! the caller hands in a [`LogSink`].

use std::cell::RefCell;
use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => write!(f, "info"),
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// Value bound to a named template argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Text(String),
    List(Vec<String>),
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Text(s) => f.write_str(s),
            Arg::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{item}\"")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Text(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Text(s)
    }
}

impl From<Vec<String>> for Arg {
    fn from(items: Vec<String>) -> Self {
        Arg::List(items)
    }
}

/// One structured diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    /// Logical origin, e.g. the step name
    pub source: String,
    /// Message template with `{Name}` placeholders
    pub template: &'static str,
    pub args: Vec<(&'static str, Arg)>,
}

impl Diagnostic {
    pub fn new(level: Level, source: impl Into<String>, template: &'static str) -> Self {
        Self {
            level,
            source: source.into(),
            template,
            args: Vec::new(),
        }
    }

    /// Bind a named argument.
    pub fn with(mut self, name: &'static str, value: impl Into<Arg>) -> Self {
        self.args.push((name, value.into()));
        self
    }

    /// Look up a bound argument by name.
    pub fn arg(&self, name: &str) -> Option<&Arg> {
        self.args.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Substitute every `{Name}` placeholder with its bound argument.
    /// Unbound placeholders are left as written.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    match self.arg(name) {
                        Some(value) => out.push_str(&value.to_string()),
                        None => {
                            out.push('{');
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Receiver of diagnostics.
pub trait DiagnosticSink {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade under the `stepwise` target.
///
/// The record is the rendered template, so named arguments reach the logger
/// as text only. Use [`CollectingSink`] (or forward through one) to keep
/// them as structured [`Arg`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, diagnostic: Diagnostic) {
        let message = diagnostic.render();
        match diagnostic.level {
            Level::Info => log::info!(target: "stepwise", "[{}] {}", diagnostic.source, message),
            Level::Warning => log::warn!(target: "stepwise", "[{}] {}", diagnostic.source, message),
            Level::Error => log::error!(target: "stepwise", "[{}] {}", diagnostic.source, message),
        }
    }
}

/// Keeps every diagnostic in memory, optionally forwarding to another sink.
#[derive(Default)]
pub struct CollectingSink<'a> {
    collected: RefCell<Vec<Diagnostic>>,
    forward: Option<&'a dyn DiagnosticSink>,
}

impl<'a> CollectingSink<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect and also pass every diagnostic on to `sink`.
    pub fn forwarding_to(sink: &'a dyn DiagnosticSink) -> Self {
        Self {
            collected: RefCell::default(),
            forward: Some(sink),
        }
    }

    /// Snapshot of everything emitted so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.collected.borrow().clone()
    }

    pub fn count(&self, level: Level) -> usize {
        self.collected
            .borrow()
            .iter()
            .filter(|d| d.level == level)
            .count()
    }
}

impl DiagnosticSink for CollectingSink<'_> {
    fn emit(&self, diagnostic: Diagnostic) {
        if let Some(forward) = self.forward {
            forward.emit(diagnostic.clone());
        }
        self.collected.borrow_mut().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_named_args() {
        let d = Diagnostic::new(
            Level::Warning,
            "add_property_group_columns",
            "Detected the same alias {Alias} for different names {Names}",
        )
        .with("Alias", "content")
        .with("Names", vec!["Content".to_string(), "Con tent".to_string()]);
        assert_eq!(
            d.render(),
            r#"Detected the same alias content for different names ["Content", "Con tent"]"#
        );
    }

    #[test]
    fn render_leaves_unbound_and_unterminated_placeholders() {
        let d = Diagnostic::new(Level::Info, "x", "a {Missing} b {open");
        assert_eq!(d.render(), "a {Missing} b {open");
    }

    #[test]
    fn collecting_sink_counts_by_level() {
        let sink = CollectingSink::new();
        sink.emit(Diagnostic::new(Level::Warning, "s", "one"));
        sink.emit(Diagnostic::new(Level::Warning, "s", "two"));
        sink.emit(Diagnostic::new(Level::Error, "s", "three"));
        assert_eq!(sink.count(Level::Warning), 2);
        assert_eq!(sink.count(Level::Error), 1);
        assert_eq!(sink.diagnostics().len(), 3);
    }

    #[test]
    fn collecting_sink_forwards() {
        let inner = CollectingSink::new();
        {
            let outer = CollectingSink::forwarding_to(&inner);
            outer.emit(Diagnostic::new(Level::Info, "s", "hello"));
        }
        assert_eq!(inner.diagnostics().len(), 1);
    }

    #[test]
    fn args_stay_structured_when_forwarding_to_the_log() {
        let sink = CollectingSink::forwarding_to(&LogSink);
        sink.emit(Diagnostic::new(Level::Warning, "s", "alias {Alias}").with("Alias", "seo"));
        let kept = sink.diagnostics();
        assert_eq!(kept[0].arg("Alias"), Some(&Arg::Text("seo".to_string())));
        assert_eq!(kept[0].render(), "alias seo");
    }
}
