use crate::core::value::{CalendarDate, YEAR_MAX, YEAR_MIN};
use crate::gateway::payload::Payload;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::{Span, SpanLine};
use crate::validate::INVALID_INPUT;
use crate::widget::traits::{DrawCtx, EditOutput, Editor, RevertPolicy, VariantKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentType {
    Year,
    Month,
    Day,
}

impl SegmentType {
    fn min_value(&self) -> u32 {
        match self {
            Self::Year => YEAR_MIN as u32,
            Self::Month | Self::Day => 1,
        }
    }

    fn max_value(&self) -> u32 {
        match self {
            Self::Year => YEAR_MAX as u32,
            Self::Month => 12,
            Self::Day => 31,
        }
    }

    fn length(&self) -> usize {
        match self {
            Self::Year => 4,
            _ => 2,
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            Self::Year => "yyyy",
            Self::Month => "mm",
            Self::Day => "dd",
        }
    }
}

#[derive(Debug, Clone)]
struct DateSegment {
    segment_type: SegmentType,
    value: String,
}

impl DateSegment {
    fn new(segment_type: SegmentType) -> Self {
        Self {
            segment_type,
            value: String::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    fn is_complete(&self) -> bool {
        self.value.len() == self.segment_type.length()
    }

    fn numeric_value(&self) -> u32 {
        self.value.parse().unwrap_or(0)
    }

    fn set_numeric(&mut self, value: u32) {
        self.value = format!("{:0width$}", value, width = self.segment_type.length());
    }

    fn increment(&mut self) {
        let current = self.numeric_value();
        let (min, max) = (self.segment_type.min_value(), self.segment_type.max_value());
        let next = if current >= max || current < min { min } else { current + 1 };
        self.set_numeric(next);
    }

    fn decrement(&mut self) {
        let current = self.numeric_value();
        let (min, max) = (self.segment_type.min_value(), self.segment_type.max_value());
        let prev = if current <= min || current == 0 { max } else { current - 1 };
        self.set_numeric(prev);
    }

    fn insert_digit(&mut self, digit: char) -> bool {
        if !digit.is_ascii_digit() {
            return false;
        }
        if self.value.len() >= self.segment_type.length() {
            self.value = digit.to_string();
            return true;
        }
        self.value.push(digit);
        if let Ok(val) = self.value.parse::<u32>() {
            if val > self.segment_type.max_value() {
                self.value = digit.to_string();
            }
        }
        true
    }

    fn delete_digit(&mut self) -> bool {
        if self.value.is_empty() {
            return false;
        }
        self.value.pop();
        true
    }

    fn display_string(&self) -> String {
        if self.value.is_empty() {
            self.segment_type.placeholder().to_string()
        } else {
            self.value.clone()
        }
    }
}

/// `yyyy-mm-dd` segment editor. An entirely empty date saves as the
/// empty string; a partially filled one is blocked before dispatch.
/// A failed save keeps whatever the user entered.
pub struct DateEditor {
    segments: [DateSegment; 3],
    active: usize,
}

impl DateEditor {
    pub fn new() -> Self {
        Self {
            segments: [
                DateSegment::new(SegmentType::Year),
                DateSegment::new(SegmentType::Month),
                DateSegment::new(SegmentType::Day),
            ],
            active: 0,
        }
    }

    pub fn with_date(mut self, date: CalendarDate) -> Self {
        self.set_date(date);
        self
    }

    pub fn with_label_text(mut self, label_text: &str) -> Self {
        if let Some(date) = CalendarDate::parse(label_text) {
            self.set_date(date);
        }
        self
    }

    fn set_date(&mut self, date: CalendarDate) {
        self.segments[0].set_numeric(date.year as u32);
        self.segments[1].set_numeric(date.month as u32);
        self.segments[2].set_numeric(date.day as u32);
    }

    fn clear(&mut self) {
        for segment in &mut self.segments {
            segment.value.clear();
        }
        self.active = 0;
    }

    fn is_blank(&self) -> bool {
        self.segments.iter().all(DateSegment::is_empty)
    }

    pub fn date(&self) -> Option<CalendarDate> {
        if !self.segments.iter().all(DateSegment::is_complete) {
            return None;
        }
        CalendarDate::new(
            self.segments[0].numeric_value() as u16,
            self.segments[1].numeric_value() as u8,
            self.segments[2].numeric_value() as u8,
        )
    }

    fn wire_text(&self) -> String {
        self.date().map(|d| d.to_string()).unwrap_or_default()
    }

    fn advance_if_complete(&mut self) {
        if self.segments[self.active].is_complete() && self.active + 1 < self.segments.len() {
            self.active += 1;
        }
    }
}

impl Default for DateEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor for DateEditor {
    fn kind(&self) -> VariantKind {
        VariantKind::Date
    }

    fn draw(&self, ctx: &DrawCtx) -> Vec<SpanLine> {
        let theme = ctx.theme;
        let mut line = Vec::new();
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                line.push(Span::styled("-", theme.hint));
            }
            let style = if segment.is_empty() {
                theme.placeholder
            } else if ctx.focused && idx == self.active {
                theme.editing
            } else {
                theme.value
            };
            line.push(Span::styled(segment.display_string(), style));
        }
        vec![line]
    }

    fn on_key(&mut self, key: KeyEvent) -> EditOutput {
        match key.code {
            KeyCode::Char(ch) if ch.is_ascii_digit() => {
                if self.segments[self.active].insert_digit(ch) {
                    self.advance_if_complete();
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Char('-') | KeyCode::Tab | KeyCode::Right => {
                if self.active + 1 >= self.segments.len() {
                    return EditOutput::ignored();
                }
                self.active += 1;
                EditOutput::handled()
            }
            KeyCode::BackTab | KeyCode::Left => {
                if self.active == 0 {
                    return EditOutput::ignored();
                }
                self.active -= 1;
                EditOutput::handled()
            }
            KeyCode::Up => {
                self.segments[self.active].increment();
                EditOutput::handled()
            }
            KeyCode::Down => {
                self.segments[self.active].decrement();
                EditOutput::handled()
            }
            KeyCode::Backspace => {
                if self.segments[self.active].delete_digit() {
                    EditOutput::handled()
                } else if self.active > 0 {
                    self.active -= 1;
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Delete => {
                self.clear();
                EditOutput::handled()
            }
            KeyCode::Enter => EditOutput::submit(),
            _ => EditOutput::ignored(),
        }
    }

    fn payload(&self) -> Payload {
        Payload::Single(self.wire_text())
    }

    fn validate(&self) -> Result<(), String> {
        if self.is_blank() || self.date().is_some() {
            Ok(())
        } else {
            Err(INVALID_INPUT.to_string())
        }
    }

    fn saved_label(&self) -> String {
        self.wire_text()
    }

    fn reset(&mut self, label_text: &str) {
        match CalendarDate::parse(label_text) {
            Some(date) => self.set_date(date),
            None => self.clear(),
        }
    }

    fn revert_policy(&self) -> RevertPolicy {
        RevertPolicy::NEVER
    }
}
