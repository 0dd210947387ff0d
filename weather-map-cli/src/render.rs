use std::fmt::Write;

use weather_map_core::{
    View,
    presentation::{SEARCH_PLACEHOLDER, TITLE},
};

/// Lay out the view as plain text, top to bottom the way the page reads.
pub fn render(view: &View, query: &str) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "== {TITLE} ==");
    if query.is_empty() {
        let _ = writeln!(out, "[ {SEARCH_PLACEHOLDER} ]");
    } else {
        let _ = writeln!(out, "[ {query} ]");
    }

    if let Some(panel) = &view.panel {
        let _ = writeln!(out, "-- Search result --");
        let _ = writeln!(out, "{panel}");
    }

    match (&view.marker, &view.popup) {
        (Some(marker), Some(popup)) => {
            let _ = writeln!(out, "-- Marker at {} ({}) --", marker.position, marker.icon.url);
            let _ = writeln!(out, "{popup}");
        }
        (None, Some(popup)) => {
            let _ = writeln!(out, "-- Selected point --");
            let _ = writeln!(out, "{popup}");
        }
        _ => {}
    }

    if let Some(banner) = &view.banner {
        let _ = writeln!(out, "!! {banner}");
    }

    out
}
