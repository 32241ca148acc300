//! Line-oriented render helpers shared by the page: bordered blocks for
//! toasts and modal prompts.

use unicode_width::UnicodeWidthStr;

use crate::notify::Toaster;
use crate::ui::span::{Span, SpanLine};
use crate::ui::style::Style;
use crate::ui::theme::Theme;

/// Wrap `body` in a single-line border, sized to its widest line. The
/// title is woven into the top border.
pub fn framed(title: &str, body: &[String], border: Style, text: Style) -> Vec<SpanLine> {
    let title_width = UnicodeWidthStr::width(title);
    let body_width = body
        .iter()
        .map(|line| UnicodeWidthStr::width(line.as_str()))
        .max()
        .unwrap_or(0);
    let inner = body_width.max(title_width + 1);

    let top = if title.is_empty() {
        format!("\u{250c}{}\u{2510}", "\u{2500}".repeat(inner + 2))
    } else {
        let dashes = inner - title_width - 1;
        format!(
            "\u{250c}\u{2500} {title} {}\u{2510}",
            "\u{2500}".repeat(dashes)
        )
    };

    let mut lines = vec![vec![Span::styled(top, border)]];
    for line in body {
        let pad = inner - UnicodeWidthStr::width(line.as_str());
        lines.push(vec![
            Span::styled("\u{2502} ", border),
            Span::styled(line.clone(), text),
            Span::styled(format!("{} \u{2502}", " ".repeat(pad)), border),
        ]);
    }
    lines.push(vec![Span::styled(
        format!("\u{2514}{}\u{2518}", "\u{2500}".repeat(inner + 2)),
        border,
    )]);
    lines
}

/// One bordered block per queued toast, oldest first.
pub fn toast_lines(toaster: &Toaster, theme: &Theme) -> Vec<SpanLine> {
    let mut lines = Vec::new();
    for toast in toaster.iter() {
        let style = theme.toast(toast.severity);
        let mut body: Vec<String> = toast.message.lines().map(str::to_string).collect();
        if body.is_empty() {
            body.push(String::new());
        }
        lines.extend(framed(&toast.title, &body, style, theme.value));
    }
    lines
}

/// A modal prompt block with its key hint on the last line.
pub fn modal_lines(title: &str, message: &str, hint: &str, theme: &Theme) -> Vec<SpanLine> {
    let mut body: Vec<String> = message.lines().map(str::to_string).collect();
    body.push(String::new());
    body.push(hint.to_string());
    framed(title, &body, theme.modal_title, theme.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Toast;
    use crate::ui::span::line_text;

    fn texts(lines: &[SpanLine]) -> Vec<String> {
        lines.iter().map(|line| line_text(line)).collect()
    }

    #[test]
    fn framed_lines_share_one_width() {
        let lines = framed(
            "Confirm",
            &["Do you really want to?".to_string(), "yes".to_string()],
            Style::new(),
            Style::new(),
        );
        let texts = texts(&lines);
        assert_eq!(texts.len(), 4);
        let width = UnicodeWidthStr::width(texts[0].as_str());
        assert!(texts
            .iter()
            .all(|line| UnicodeWidthStr::width(line.as_str()) == width));
        assert!(texts[0].contains("Confirm"));
        assert!(texts[1].contains("Do you really want to?"));
    }

    #[test]
    fn long_titles_still_fit_the_top_border() {
        let lines = framed("A much longer title", &["x".to_string()], Style::new(), Style::new());
        let texts = texts(&lines);
        assert!(texts[0].contains("A much longer title"));
        let width = UnicodeWidthStr::width(texts[0].as_str());
        assert_eq!(UnicodeWidthStr::width(texts[1].as_str()), width);
    }

    #[test]
    fn each_toast_renders_as_its_own_block() {
        let mut toaster = Toaster::new();
        toaster.push(Toast::success("Success", "Data stored successfully"));
        toaster.push(Toast::warning("Data could not be stored", "taken\ntoo short"));
        let lines = toast_lines(&toaster, &Theme::default());
        // 3 lines for the first block, 4 for the two-line message.
        assert_eq!(lines.len(), 7);
    }
}
