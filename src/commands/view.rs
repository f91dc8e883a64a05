use anyhow::Result;

use crate::tui::app;

pub fn run(demo: bool, path: Option<&str>) -> Result<()> {
    app::run(demo, path)
}
