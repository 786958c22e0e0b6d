//! Toxicity distribution pie chart.

use molex_common::{color_for, Dataset, Toxicity};
use std::f64::consts::{FRAC_PI_2, TAU};

use super::escape_html;

const RADIUS: f64 = 80.0;
const CENTER: f64 = 90.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub name: String,
    pub value: usize,
    pub fill: &'static str,
    /// `"{name}: {pct}%"`
    pub label: String,
}

/// Count per toxicity level, one slice per level present, ordered by first
/// appearance in the dataset.
pub fn slices(dataset: &Dataset) -> Vec<PieSlice> {
    let mut groups: Vec<(&Toxicity, usize)> = Vec::new();
    for record in dataset {
        match groups.iter_mut().find(|(t, _)| **t == record.toxicity) {
            Some((_, count)) => *count += 1,
            None => groups.push((&record.toxicity, 1)),
        }
    }

    let total = dataset.len();
    groups
        .into_iter()
        .map(|(toxicity, value)| {
            let pct = (value as f64 / total as f64 * 100.0).round() as u32;
            PieSlice {
                name: toxicity.label().to_string(),
                value,
                fill: color_for(toxicity).css,
                label: format!("{}: {}%", toxicity.label(), pct),
            }
        })
        .collect()
}

fn point(angle: f64) -> (f64, f64) {
    (CENTER + RADIUS * angle.cos(), CENTER + RADIUS * angle.sin())
}

pub fn render_pie_chart(dataset: &Dataset) -> String {
    let slices = slices(dataset);
    let total: usize = slices.iter().map(|s| s.value).sum();

    let shapes: String = match slices.as_slice() {
        [] => format!(
            r#"<text class="chart-empty" x="{CENTER}" y="{CENTER}" text-anchor="middle">No data</text>"#
        ),
        // A single arc from a point back to itself draws nothing.
        [only] => format!(
            r#"<circle class="slice" cx="{CENTER}" cy="{CENTER}" r="{RADIUS}" fill="{}"><title>{}</title></circle>"#,
            only.fill,
            escape_html(&only.label),
        ),
        _ => {
            let mut start = -FRAC_PI_2;
            slices.iter().map(|slice| {
                let sweep = slice.value as f64 / total as f64 * TAU;
                let (x1, y1) = point(start);
                let (x2, y2) = point(start + sweep);
                let large_arc = u8::from(sweep > std::f64::consts::PI);
                start += sweep;
                format!(r#"
    <path class="slice" d="M {CENTER} {CENTER} L {x1:.2} {y1:.2} A {RADIUS} {RADIUS} 0 {large_arc} 1 {x2:.2} {y2:.2} Z" fill="{}"><title>{}</title></path>"#,
                    slice.fill,
                    escape_html(&slice.label),
                )
            }).collect()
        }
    };

    let legend: String = slices.iter().map(|slice| {
        format!(r#"
        <li><span class="swatch" style="background:{}"></span>{}</li>"#,
            slice.fill,
            escape_html(&slice.label),
        )
    }).collect();

    format!(r#"<div class="pie-chart">
    <svg class="chart" viewBox="0 0 180 180" role="img" aria-label="Toxicity distribution">
    {shapes}
    </svg>
    <ul class="legend">{legend}
    </ul>
</div>"#)
}
