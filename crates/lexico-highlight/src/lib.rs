//! Syntax highlighting and terminal colors for lexico.
//!
//! This crate provides syntect-based highlighting for configuration output, token
//! coloring for queries, and styled terminal output for headers and status messages.

#![warn(missing_docs)]

mod query;

pub use query::{error_pointer, highlight_query, highlight_tokens};
use syntect::{
    easy::HighlightLines,
    highlighting::Style,
    parsing::SyntaxSet,
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};
use two_face::{
    syntax::extra_newlines as extra_syntaxes,
    theme::{EmbeddedLazyThemeSet, EmbeddedThemeName, extra as extra_themes},
};

/// A syntax highlighter that can highlight code for terminal output.
pub struct Highlighter {
    /// The syntax set containing language definitions (including TOML).
    syntax_set: SyntaxSet,
    /// The theme set containing color themes.
    theme_set: EmbeddedLazyThemeSet,
    /// The theme to use.
    theme: EmbeddedThemeName,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Creates a new highlighter with the default theme (Dracula).
    pub fn new() -> Self {
        Self {
            syntax_set: extra_syntaxes(),
            theme_set: extra_themes(),
            theme: EmbeddedThemeName::Dracula,
        }
    }

    /// Highlights TOML content for terminal output.
    pub fn highlight_toml(&self, content: &str) -> String {
        self.highlight(content, "toml")
    }

    /// Highlights content with the specified syntax for terminal output.
    ///
    /// If the syntax is not found, the content is highlighted as plain text.
    pub fn highlight(&self, content: &str, syntax_name: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_extension(syntax_name)
            .or_else(|| self.syntax_set.find_syntax_by_name(syntax_name))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self.theme_set.get(self.theme);
        let mut highlighter = HighlightLines::new(syntax, theme);

        let mut output = String::new();
        for line in LinesWithEndings::from(content) {
            let ranges: Vec<(Style, &str)> = highlighter
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_else(|_| vec![(Style::default(), line)]);
            output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
        }
        output.push_str(colors::RESET);
        output
    }
}

/// ANSI color codes for terminal output.
pub mod colors {
    /// Bold text.
    pub const BOLD: &str = "\x1b[1m";
    /// Cyan text (for headers and scopes).
    pub const CYAN: &str = "\x1b[36m";
    /// Green text (for success).
    pub const GREEN: &str = "\x1b[32m";
    /// Yellow text (for warnings and connectives).
    pub const YELLOW: &str = "\x1b[33m";
    /// Red text (for errors and negation).
    pub const RED: &str = "\x1b[31m";
    /// Magenta text (for numbers).
    pub const MAGENTA: &str = "\x1b[35m";
    /// Dim/gray text (for less important info).
    pub const DIM: &str = "\x1b[2m";
    /// Reset all formatting.
    pub const RESET: &str = "\x1b[0m";
}

/// Formats a header with bold cyan styling.
pub fn header(text: &str) -> String {
    format!("{}{}{}{}", colors::BOLD, colors::CYAN, text, colors::RESET)
}

/// Formats text as a subheader (bold).
pub fn subheader(text: &str) -> String {
    paint(colors::BOLD, text)
}

/// Formats text as dimmed/less important.
pub fn dim(text: &str) -> String {
    paint(colors::DIM, text)
}

/// Formats text as a success message (green).
pub fn success(text: &str) -> String {
    paint(colors::GREEN, text)
}

/// Formats text as a warning (yellow).
pub fn warning(text: &str) -> String {
    paint(colors::YELLOW, text)
}

/// Formats text as an error (red).
pub fn error(text: &str) -> String {
    paint(colors::RED, text)
}

/// Returns a dimmed horizontal rule for visual separation.
pub fn rule(width: usize) -> String {
    dim(&"─".repeat(width))
}

/// Indents every non-empty line by two spaces.
pub fn indent_content(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("  {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wraps `text` in a color code and a reset.
fn paint(color: &str, text: &str) -> String {
    format!("{color}{text}{}", colors::RESET)
}
