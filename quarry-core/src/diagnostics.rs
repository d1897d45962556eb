//! Compiler diagnostics
//!
//! Turns the free-form text a failed compile job reports into structured
//! annotations. The parser accepts the two layouts compilers commonly emit:
//!
//! ```text
//! error[E0425]: cannot find value `x` in this scope
//!   --> src/lib.rs:10:5
//!
//! warning: unused variable
//!    ┌─ sources/counter.move:4:9
//! ```
//!
//! Anything it does not recognise is skipped, and locations with missing or
//! garbled line/column tokens produce `None` fields instead of errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Error,
    Warning,
    Note,
    Help,
}

impl DiagnosticKind {
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix.to_ascii_lowercase().as_str() {
            "error" => Some(DiagnosticKind::Error),
            "warning" => Some(DiagnosticKind::Warning),
            "note" => Some(DiagnosticKind::Note),
            "help" => Some(DiagnosticKind::Help),
            _ => None,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Error => write!(f, "error"),
            DiagnosticKind::Warning => write!(f, "warning"),
            DiagnosticKind::Note => write!(f, "note"),
            DiagnosticKind::Help => write!(f, "help"),
        }
    }
}

/// A single annotation extracted from compiler output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Compiler-specific code, e.g. `E0425`
    pub code: Option<String>,
    pub file: Option<String>,
    /// 1-based line
    pub line: Option<u32>,
    /// 1-based column
    pub column: Option<u32>,
    pub message: String,
}

impl Diagnostic {
    /// `file:line:col` with whatever parts are known
    pub fn location(&self) -> Option<String> {
        let file = self.file.as_deref();
        match (file, self.line, self.column) {
            (None, None, _) => None,
            (file, Some(line), Some(column)) => {
                Some(format!("{}:{}:{}", file.unwrap_or("<unknown>"), line, column))
            }
            (file, Some(line), None) => Some(format!("{}:{}", file.unwrap_or("<unknown>"), line)),
            (Some(file), None, _) => Some(file.to_string()),
        }
    }

    /// One-line rendering used by the CLI and logs
    pub fn summary(&self) -> String {
        let kind = match &self.code {
            Some(code) => format!("{}[{}]", self.kind, code),
            None => self.kind.to_string(),
        };
        match self.location() {
            Some(location) => format!("{} {} {}", kind, location, self.message),
            None => format!("{} {}", kind, self.message),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Parse compiler output into an ordered list of diagnostics
///
/// A location line is attached to the closest preceding header that does not
/// have one yet. Continuation lines (source excerpts, carets) are ignored.
pub fn parse_diagnostics(text: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut awaiting_location = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(diagnostic) = parse_header(line) {
            diagnostics.push(diagnostic);
            awaiting_location = true;
            continue;
        }

        if !awaiting_location {
            continue;
        }

        if let Some(spec) = strip_location_marker(line) {
            if let Some(last) = diagnostics.last_mut() {
                let location = parse_location(spec);
                last.file = location.file;
                last.line = location.line;
                last.column = location.column;
            }
            awaiting_location = false;
        }
    }

    diagnostics
}

/// `kind: message` or `kind[code]: message`
fn parse_header(line: &str) -> Option<Diagnostic> {
    let (head, message) = line.split_once(':')?;
    let head = head.trim();

    let (prefix, code) = match head.split_once('[') {
        Some((prefix, rest)) => {
            let code = rest.strip_suffix(']')?;
            (prefix, Some(code.to_string()))
        }
        None => (head, None),
    };

    let kind = DiagnosticKind::from_prefix(prefix)?;

    Some(Diagnostic {
        kind,
        code,
        file: None,
        line: None,
        column: None,
        message: message.trim().to_string(),
    })
}

/// `--> spec`, `┌─ spec` or `at spec`
///
/// `at` also starts ordinary sentences, so it only counts as a marker when
/// the rest ends in a `:<line>` token.
fn strip_location_marker(line: &str) -> Option<&str> {
    if let Some(spec) = ["-->", "┌─"]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
    {
        return Some(spec.trim());
    }

    let spec = line.strip_prefix("at ")?.trim();
    let has_line_number = spec
        .trim_end_matches(':')
        .rsplit_once(':')
        .is_some_and(|(_, n)| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));

    has_line_number.then_some(spec)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Location {
    file: Option<String>,
    line: Option<u32>,
    column: Option<u32>,
}

/// Split `path:line:col`, keeping colons that belong to the path
fn parse_location(spec: &str) -> Location {
    let mut tokens: Vec<&str> = spec.split(':').collect();
    let mut numbers: Vec<u32> = Vec::new();

    while numbers.len() < 2 && tokens.len() > 1 {
        let last = tokens[tokens.len() - 1].trim();
        if last.is_empty() {
            tokens.pop();
            continue;
        }
        match last.parse::<u32>() {
            Ok(n) => {
                numbers.push(n);
                tokens.pop();
            }
            Err(_) => break,
        }
    }
    numbers.reverse();

    let file = tokens.join(":").trim().to_string();

    Location {
        file: (!file.is_empty()).then_some(file),
        line: numbers.first().copied(),
        column: numbers.get(1).copied(),
    }
}
