use std::env;
use std::error::Error;
use std::sync::Arc;

use flipfield::gateway::HttpTransport;
use flipfield::manifest::PageManifest;
use flipfield::runtime::{Console, Page};
use flipfield::terminal::Terminal;

const DEMO_PAGE: &str = include_str!("../demos/admin.yaml");

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let manifest = match env::args().nth(1) {
        Some(path) => PageManifest::load(path)?,
        None => PageManifest::parse(DEMO_PAGE)?,
    };

    let transport = Arc::new(HttpTransport::new());
    let page = Page::new(&manifest, transport)?;
    let terminal = Terminal::new()?;

    Console::new(page, terminal).run()?;
    Ok(())
}
