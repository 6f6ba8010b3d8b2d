//! Text dumps of the navigator's rendered state.

use std::fmt::Write;

use threadnav_core::{PerfStats, RenderKey};

use crate::recording::PanelSnapshot;

/// One line per list entry, then one line listing the collapsed dots.
pub fn format_panel(snapshot: &PanelSnapshot) -> String {
    let mut out = String::new();
    for (id, entry) in &snapshot.entries {
        let _ = writeln!(
            out,
            "{:>3}. [{:<9}] {id}: {}",
            entry.display_index,
            entry.role.as_str(),
            entry.text.title
        );
    }
    let dots: Vec<&str> = snapshot.dots.iter().map(|(id, _)| id.as_str()).collect();
    let _ = write!(out, "dots: {}", dots.join(" "));
    out
}

pub fn format_stats(stats: &PerfStats, key: Option<&RenderKey>) -> String {
    let key = key.map_or_else(|| "none".to_string(), |key| format!("{:016x}", key.fingerprint()));
    format!(
        "refreshes={} full_renders={} patches={} key={key}",
        stats.refreshes, stats.full_renders, stats.patches
    )
}

pub fn log_panel(snapshot: &PanelSnapshot) {
    for line in format_panel(snapshot).lines() {
        log::debug!("{line}");
    }
}
