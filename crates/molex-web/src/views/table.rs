//! Compound assay results table.

use molex_common::{color_for, Dataset};

use super::escape_html;
use crate::orchestrator::Selection;

/// One row per record with a toxicity badge. Rows carry `data-compound` so
/// the page script can post row activations.
pub fn render_assay_table(dataset: &Dataset, selection: &Selection) -> String {
    let rows: String = if dataset.is_empty() {
        r#"<tr class="empty-row"><td colspan="3" class="text-center text-muted">No assay data for this protein.</td></tr>"#.to_string()
    } else {
        dataset.iter().map(|record| {
            let color = color_for(&record.toxicity);
            let id = escape_html(&record.compound_id);
            let active = selection.focused_compound.as_deref() == Some(record.compound_id.as_str());
            format!(r#"
            <tr class="assay-row{}" data-compound="{}" tabindex="0">
                <td class="compound-id">{}</td>
                <td class="text-end ic50">{}</td>
                <td><span class="badge {}" style="background:{}">{}</span></td>
            </tr>"#,
                if active { " active" } else { "" },
                id,
                id,
                record.ic50_display(),
                color.class,
                color.css,
                escape_html(record.toxicity.label()),
            )
        }).collect()
    };

    format!(r#"<div class="table-container">
    <table class="table assay-table">
        <thead>
            <tr>
                <th>Compound ID</th>
                <th class="text-end">IC50 (nM)</th>
                <th>Toxicity</th>
            </tr>
        </thead>
        <tbody>
            {}
        </tbody>
    </table>
</div>"#, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use molex_common::{AssayRecord, ProteinId, Toxicity};

    fn selection() -> Selection {
        Selection::new(ProteinId::parse("6LU7").unwrap())
    }

    #[test]
    fn test_renders_record_row() {
        let dataset = Dataset::new(vec![AssayRecord::new("C001", 12.5, Toxicity::Moderate)]);
        let html = render_assay_table(&dataset, &selection());

        assert!(html.contains(r#"data-compound="C001""#));
        assert!(html.contains(">12.5<"));
        assert!(html.contains("badge tox-moderate"));
        assert!(html.contains(">Moderate<"));
        assert!(!html.contains("empty-row"));
    }

    #[test]
    fn test_empty_dataset() {
        let html = render_assay_table(&Dataset::empty(), &selection());
        assert!(html.contains("empty-row"));
        assert_eq!(html.matches("assay-row").count(), 0);
    }

    #[test]
    fn test_nan_and_unclassified() {
        let dataset = Dataset::new(vec![AssayRecord::new("X", f64::NAN, Toxicity::parse("Severe"))]);
        let html = render_assay_table(&dataset, &selection());
        assert!(html.contains(">NaN<"));
        assert!(html.contains("tox-unknown"));
        assert!(html.contains(">Severe<"));
    }

    #[test]
    fn test_focused_row_is_marked_and_ids_escaped() {
        let dataset = Dataset::new(vec![
            AssayRecord::new("C1", 1.0, Toxicity::Low),
            AssayRecord::new("<b>", 2.0, Toxicity::High),
        ]);
        let mut sel = selection();
        sel.focused_compound = Some("C1".into());
        let html = render_assay_table(&dataset, &sel);
        assert_eq!(html.matches("assay-row active").count(), 1);
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("<b>"));
    }
}
