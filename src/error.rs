use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;

/// Character range inside a single source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    pub fn to(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LexError,
    SyntaxError,
    ParseError,
    RuntimeError,
    RuntimeTrap,
    StructuralError,
    Interrupted,
}

impl ErrorKind {
    fn title(self) -> &'static str {
        match self {
            ErrorKind::LexError => "Lexical Error",
            ErrorKind::SyntaxError => "Syntax Error",
            ErrorKind::ParseError => "Parse Error",
            ErrorKind::RuntimeError => "Runtime Error",
            ErrorKind::RuntimeTrap => "Runtime Trap",
            ErrorKind::StructuralError => "Structural Error",
            ErrorKind::Interrupted => "Interrupted",
        }
    }

    fn color(self) -> Color {
        match self {
            ErrorKind::LexError => Color::Red,
            ErrorKind::SyntaxError | ErrorKind::ParseError => Color::Yellow,
            ErrorKind::RuntimeError | ErrorKind::Interrupted => Color::Magenta,
            ErrorKind::RuntimeTrap | ErrorKind::StructuralError => Color::Red,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
    pub help: Option<String>,
}

impl ScriptError {
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: None,
        }
    }

    pub fn new_with_help(kind: ErrorKind, span: Span, message: String, help: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: Some(help),
        }
    }

    pub fn lex_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::LexError, span, message)
    }

    pub fn syntax_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::SyntaxError, span, message)
    }

    pub fn parse_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::ParseError, span, message)
    }

    pub fn parse_error_with_help(span: Span, message: String, help: String) -> Self {
        Self::new_with_help(ErrorKind::ParseError, span, message, help)
    }

    pub fn runtime_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::RuntimeError, span, message)
    }

    pub fn runtime_error_with_help(span: Span, message: String, help: String) -> Self {
        Self::new_with_help(ErrorKind::RuntimeError, span, message, help)
    }

    pub fn trap(span: Span, message: String) -> Self {
        Self::new(ErrorKind::RuntimeTrap, span, message)
    }

    pub fn structural(span: Span, message: String) -> Self {
        Self::new(ErrorKind::StructuralError, span, message)
    }

    pub fn interrupted(span: Span, message: String) -> Self {
        Self::new(ErrorKind::Interrupted, span, message)
    }

    /// Fatal errors leave the engine unusable; everything else is local to one statement.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, ErrorKind::RuntimeTrap | ErrorKind::StructuralError)
    }

    /// Render the error against the text of the line it was raised on.
    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<repl>");
        let color = self.kind.color();

        // The trailing newline gives end-of-line spans a column to point at.
        let text = format!("{}\n", source);
        let len = text.chars().count();
        let start = self.span.start.min(len - 1);
        let end = self.span.end.clamp(start + 1, len);

        let mut report_builder = Report::build(ReportKind::Error, filename, start)
            .with_message(format!("{}: {}", self.kind.title().fg(color), self.message))
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        if report_builder
            .finish()
            .eprint((filename, Source::from(text.as_str())))
            .is_err()
        {
            eprintln!("{}: {}", self.kind.title(), self.message);
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ScriptError {}

/// An error together with the program line it belongs to.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub error: ScriptError,
    pub line: String,
    pub address: usize,
}

impl Diagnostic {
    pub fn new(error: ScriptError, line: &str, address: usize) -> Self {
        Self {
            error,
            line: line.to_string(),
            address,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind
    }

    pub fn is_fatal(&self) -> bool {
        self.error.is_fatal()
    }

    pub fn report(&self, filename: Option<&str>) {
        let origin = format!("{}:{}", filename.unwrap_or("<repl>"), self.address);
        self.error.report(&self.line, Some(&origin));
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.address, self.error)
    }
}

impl std::error::Error for Diagnostic {}
