use std::io::{self, Write};

use crate::probe::prelude::ProgressObserver;

const BAR_WIDTH: usize = 30;
const LABEL: &str = "Pinging relays";

fn render_bar(completed: usize, total: usize, width: usize) -> String {
    let total = total.max(1);
    let completed = completed.min(total);
    let filled = completed * width / total;

    let mut bar = "=".repeat(filled);
    if filled < width {
        bar.push('>');
        bar.push_str(&" ".repeat(width - filled - 1));
    }
    format!("{LABEL} [{bar}] {completed}/{total}")
}

/// Redraws a single progress line on stderr as probes complete.
#[derive(Debug, Default)]
pub struct ProgressLine;

impl ProgressObserver for ProgressLine {
    fn on_progress(&self, completed: usize, total: usize) {
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r{}", render_bar(completed, total, BAR_WIDTH));
        if completed >= total {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}
