#![cfg(feature = "egui")]

use egui::text::LayoutJob;
use egui::Color32;

use crate::highlight::SEARCH_ACCENT;

/// Simple case-insensitive highlighter that builds a LayoutJob for `text`,
/// highlighting occurrences of `query` with the search accent colour.
pub fn highlight_query_job(text: &str, query: &str) -> LayoutJob {
    let mut job = LayoutJob::default();
    let t = text;
    let tl = t.to_lowercase();
    let ql = query.trim().to_lowercase();
    // Lowercasing can change byte lengths for some scripts; fall back to plain text then.
    if ql.is_empty() || tl.len() != t.len() {
        job.append(t, 0.0, egui::TextFormat::default());
        return job;
    }
    let accent = Color32::from_rgb(
        (SEARCH_ACCENT >> 16) as u8,
        (SEARCH_ACCENT >> 8) as u8,
        SEARCH_ACCENT as u8,
    );
    let mut i = 0;
    while let Some(pos) = tl[i..].find(&ql) {
        let start = i + pos;
        if start > i {
            job.append(&t[i..start], 0.0, egui::TextFormat::default());
        }
        let end = start + ql.len();
        let fmt = egui::TextFormat {
            background: accent,
            color: Color32::BLACK,
            ..Default::default()
        };
        job.append(&t[start..end], 0.0, fmt);
        i = end;
    }
    if i < t.len() {
        job.append(&t[i..], 0.0, egui::TextFormat::default());
    }
    job
}
