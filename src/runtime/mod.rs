pub mod page;

pub use page::{Frame, Page};

use std::io;
use std::time::Duration;

use crate::terminal::{KeyCode, KeyEvent, Terminal, TerminalEvent, TerminalSize};

const POLL_TIMEOUT: Duration = Duration::from_millis(120);
const SCROLL_STEP: i32 = 5;

/// Owns the terminal and drives one page: poll input, apply settled
/// saves, redraw when anything changed.
pub struct Console {
    page: Page,
    terminal: Terminal,
}

impl Console {
    pub fn new(page: Page, terminal: Terminal) -> Self {
        Self { page, terminal }
    }

    pub fn run(&mut self) -> io::Result<()> {
        self.terminal.enter()?;

        let run_result = (|| -> io::Result<()> {
            self.render()?;

            while !self.page.should_exit() {
                let event = self.terminal.poll_event(POLL_TIMEOUT)?;
                let mut dirty = match event {
                    TerminalEvent::Key(KeyEvent {
                        code: KeyCode::PageUp,
                        ..
                    }) => {
                        self.terminal.scroll(-SCROLL_STEP);
                        true
                    }
                    TerminalEvent::Key(KeyEvent {
                        code: KeyCode::PageDown,
                        ..
                    }) => {
                        self.terminal.scroll(SCROLL_STEP);
                        true
                    }
                    other => {
                        let changed = self.page.handle_event(other);
                        if changed {
                            // Content changed, so the window follows the
                            // focus again.
                            self.terminal.reset_scroll();
                        }
                        changed
                    }
                };
                dirty |= self.page.pump();
                if dirty {
                    self.render()?;
                }
            }

            Ok(())
        })();

        let exit_result = self.terminal.exit();
        run_result.and(exit_result)
    }

    fn render(&mut self) -> io::Result<()> {
        let frame = self.page.render();
        self.terminal.render_frame(&frame.lines, frame.focus_line)
    }

    pub fn size(&self) -> TerminalSize {
        self.terminal.size()
    }
}
