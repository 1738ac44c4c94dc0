//! Named terminal styles. Rendering code asks for a style by what the text *is*
//! (a path, a title, a count) and never picks colors itself.
//!
//! `console` drops the escape codes on its own when stdout is not a terminal.

use console::Style;

pub fn path() -> Style {
    Style::new().yellow()
}

pub fn title() -> Style {
    Style::new().bold()
}

pub fn muted() -> Style {
    Style::new().color256(246)
}

pub fn highlight() -> Style {
    Style::new().black().on_yellow()
}

pub fn info() -> Style {
    Style::new().dim()
}

pub fn success() -> Style {
    Style::new().green()
}

pub fn warning() -> Style {
    Style::new().yellow()
}

pub fn error() -> Style {
    Style::new().red()
}
