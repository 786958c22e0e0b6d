//! Pure HTML/SVG renderers for the dashboard panels.

pub mod table;
pub mod bar_chart;
pub mod pie_chart;
pub mod layout;

pub use bar_chart::{bars, render_bar_chart, Bar};
pub use pie_chart::{render_pie_chart, slices, PieSlice};
pub use table::render_assay_table;

/// Escape text for use inside HTML element content or a quoted attribute.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
