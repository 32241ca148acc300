pub mod render;
pub mod span;
pub mod style;
pub mod theme;

pub use span::{Span, SpanLine, line_text};
pub use style::{Color, Style};
pub use theme::Theme;
