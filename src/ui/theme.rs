use crate::notify::Severity;
use crate::ui::style::{Color, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    pub caption: Style,
    pub value: Style,
    pub placeholder: Style,
    pub hint: Style,
    pub error: Style,
    pub focused: Style,
    pub editing: Style,
    pub chip: Style,
    pub flag_on: Style,
    pub flag_off: Style,
    pub modal_title: Style,
    pub toast_info: Style,
    pub toast_success: Style,
    pub toast_warning: Style,
    pub toast_error: Style,
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            caption: Style::new().bold(),
            value: Style::new(),
            placeholder: Style::new().color(Color::DarkGrey),
            hint: Style::new().color(Color::DarkGrey),
            error: Style::new().color(Color::Red).bold(),
            focused: Style::new().color(Color::Cyan).bold(),
            editing: Style::new().color(Color::Yellow),
            chip: Style::new().color(Color::Blue),
            flag_on: Style::new().color(Color::Green),
            flag_off: Style::new().color(Color::Red),
            modal_title: Style::new().color(Color::Magenta).bold(),
            toast_info: Style::new().color(Color::Cyan),
            toast_success: Style::new().color(Color::Green),
            toast_warning: Style::new().color(Color::Yellow),
            toast_error: Style::new().color(Color::Red).bold(),
        }
    }

    pub fn toast(&self, severity: Severity) -> Style {
        match severity {
            Severity::Info => self.toast_info,
            Severity::Success => self.toast_success,
            Severity::Warning => self.toast_warning,
            Severity::Error => self.toast_error,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}
