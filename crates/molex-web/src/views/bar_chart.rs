//! IC50 bar chart. Lower IC50 means higher potency.

use molex_common::{color_for, Dataset};

use super::escape_html;

const PLOT_HEIGHT: f64 = 180.0;
const BAR_WIDTH: f64 = 28.0;
const BAR_GAP: f64 = 12.0;
const MARGIN_LEFT: f64 = 48.0;
const MARGIN_TOP: f64 = 12.0;
const MARGIN_BOTTOM: f64 = 56.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub compound_id: String,
    /// Raw IC50 (nM), NaN preserved.
    pub ic50: f64,
    /// Drawn value: NaN and negatives become zero.
    pub height: f64,
    pub fill: &'static str,
    pub title: String,
}

/// One bar per record, in dataset order.
pub fn bars(dataset: &Dataset) -> Vec<Bar> {
    dataset
        .iter()
        .map(|r| {
            let height = if r.ic50.is_finite() && r.ic50 > 0.0 { r.ic50 } else { 0.0 };
            Bar {
                compound_id: r.compound_id.clone(),
                ic50: r.ic50,
                height,
                fill: color_for(&r.toxicity).css,
                title: format!("{}: {} nM ({})", r.compound_id, r.ic50_display(), r.toxicity),
            }
        })
        .collect()
}

pub fn render_bar_chart(dataset: &Dataset) -> String {
    let bars = bars(dataset);
    let width = MARGIN_LEFT + (bars.len().max(1) as f64) * (BAR_WIDTH + BAR_GAP) + BAR_GAP;
    let height = MARGIN_TOP + PLOT_HEIGHT + MARGIN_BOTTOM;
    let baseline = MARGIN_TOP + PLOT_HEIGHT;

    if bars.is_empty() {
        return format!(
            r#"<svg class="chart bar-chart" viewBox="0 0 {w} {h}" role="img" aria-label="IC50 distribution">
    <text class="chart-empty" x="{cx}" y="{cy}" text-anchor="middle">No data</text>
</svg>"#,
            w = width.max(240.0),
            h = height,
            cx = width.max(240.0) / 2.0,
            cy = height / 2.0,
        );
    }

    let max = bars.iter().map(|b| b.height).fold(0.0_f64, f64::max);
    let scale = if max > 0.0 { PLOT_HEIGHT / max } else { 0.0 };

    let rects: String = bars.iter().enumerate().map(|(i, bar)| {
        let x = MARGIN_LEFT + BAR_GAP + i as f64 * (BAR_WIDTH + BAR_GAP);
        let h = bar.height * scale;
        let id = escape_html(&bar.compound_id);
        format!(r#"
    <rect class="bar" data-compound="{id}" x="{x:.1}" y="{y:.1}" width="{BAR_WIDTH}" height="{h:.1}" fill="{fill}"><title>{title}</title></rect>
    <text class="bar-label" x="{lx:.1}" y="{ly:.1}" transform="rotate(-45 {lx:.1} {ly:.1})" text-anchor="end">{id}</text>"#,
            y = baseline - h,
            fill = bar.fill,
            title = escape_html(&bar.title),
            lx = x + BAR_WIDTH / 2.0,
            ly = baseline + 14.0,
        )
    }).collect();

    format!(r#"<svg class="chart bar-chart" viewBox="0 0 {width:.0} {height:.0}" role="img" aria-label="IC50 distribution">
    <line class="axis" x1="{MARGIN_LEFT}" y1="{MARGIN_TOP}" x2="{MARGIN_LEFT}" y2="{baseline}"/>
    <line class="axis" x1="{MARGIN_LEFT}" y1="{baseline}" x2="{width:.0}" y2="{baseline}"/>
    <text class="axis-label" x="{MARGIN_LEFT}" y="{MARGIN_TOP}" dx="-6" text-anchor="end">{max_label}</text>
    <text class="axis-label" x="{MARGIN_LEFT}" y="{baseline}" dx="-6" text-anchor="end">0</text>
    <text class="axis-title" x="12" y="{mid:.0}" transform="rotate(-90 12 {mid:.0})" text-anchor="middle">IC50 (nM)</text>{rects}
</svg>"#,
        max_label = format!("{:.1}", max),
        mid = MARGIN_TOP + PLOT_HEIGHT / 2.0,
    )
}
