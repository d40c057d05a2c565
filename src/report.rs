/// Plain-text rendering of an entity's list view.
///
/// One row per section showing its effective values, an `ALT` marker when an
/// alternate is in use, optional alternate rows, and an alt-adjusted totals
/// footer.
use std::fmt::Write;

use crate::amount::{format_hours, format_money};
use crate::model::{LineItem, Section};
use crate::resolve::aggregate;

const DESCRIPTION_WIDTH: usize = 28;
const SUPPLIER_WIDTH: usize = 18;
const LABOR_TYPE_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Show every alternate under its primary.
    pub expand_alternates: bool,
}

#[must_use]
pub fn render(title: &str, sections: &[Section], options: ReportOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");

    let header = format!(
        "{:<8} {:<dw$} {:<sw$} {:>12} {:<lw$} {:>8} {:>12}",
        "#",
        "Description",
        "Supplier",
        "Cost",
        "Labor Type",
        "Hours",
        "Labor Cost",
        dw = DESCRIPTION_WIDTH,
        sw = SUPPLIER_WIDTH,
        lw = LABOR_TYPE_WIDTH,
    );
    let rule = "─".repeat(header.chars().count());
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{rule}");

    if sections.is_empty() {
        let _ = writeln!(out, "No records found");
    }

    for (i, section) in sections.iter().enumerate() {
        let marker = if section.has_used_alternate() {
            format!("{} ALT", i + 1)
        } else {
            (i + 1).to_string()
        };
        let _ = writeln!(out, "{}", row(&marker, section.effective()));

        if options.expand_alternates {
            if section.alternates.is_empty() {
                let _ = writeln!(out, "{:<8} (no alternates)", "");
            }
            for alt in &section.alternates {
                let marker = if alt.used { "  * alt" } else { "    alt" };
                let _ = writeln!(out, "{}", row(marker, &alt.item));
            }
        }
    }

    let totals = aggregate(sections);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "{:<width$} {:>12} {:<lw$} {:>8} {:>12}",
        "Totals (alt-adjusted)",
        format_money(totals.material_cost),
        "",
        format_hours(totals.labor_hours),
        format_money(totals.labor_cost),
        width = 8 + DESCRIPTION_WIDTH + SUPPLIER_WIDTH + 2,
        lw = LABOR_TYPE_WIDTH,
    );
    out
}

fn row(marker: &str, item: &LineItem) -> String {
    format!(
        "{:<8} {:<dw$} {:<sw$} {:>12} {:<lw$} {:>8} {:>12}",
        marker,
        clip(&item.description, DESCRIPTION_WIDTH),
        clip(&item.supplier, SUPPLIER_WIDTH),
        format_money(item.cost_amount()),
        clip(item.labor_type.as_deref().unwrap_or(""), LABOR_TYPE_WIDTH),
        format_hours(item.labor_hours_amount()),
        format_money(item.labor_cost_amount()),
        dw = DESCRIPTION_WIDTH,
        sw = SUPPLIER_WIDTH,
        lw = LABOR_TYPE_WIDTH,
    )
}

fn clip(text: &str, width: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Alternate;

    fn sample() -> Vec<Section> {
        vec![
            Section::new(
                LineItem::new("Rooftop unit", "Carrier", "8000", ""),
                vec![Alternate::new(
                    LineItem::new("Rooftop unit (Trane)", "Trane", "$7,250.50", "")
                        .with_labor("Sheet metal", "6", "540"),
                    true,
                )],
            ),
            Section::new(LineItem::new("Exhaust fan", "Greenheck", "450", ""), vec![]),
        ]
    }

    #[test]
    fn test_render_effective_rows_and_totals() {
        let text = render("Equipment", &sample(), ReportOptions::default());
        assert!(text.starts_with("Equipment\n"));
        assert!(text.contains("1 ALT"));
        assert!(text.contains("Rooftop unit (Trane)"));
        assert!(text.contains("$7250.50"));
        assert!(!text.contains("$8000.00"));
        assert!(text.contains("Totals (alt-adjusted)"));
        assert!(text.contains("$7700.50"));
        assert!(text.contains("6.00"));
        assert!(text.contains("$540.00"));
    }

    #[test]
    fn test_render_expanded_alternates() {
        let text = render("Equipment", &sample(), ReportOptions { expand_alternates: true });
        assert!(text.contains("  * alt"));
        assert!(text.contains("(no alternates)"));
        // Effective row plus the alternate row itself
        assert_eq!(text.matches("$7250.50").count(), 2);
    }

    #[test]
    fn test_render_empty() {
        let text = render("Demo", &[], ReportOptions::default());
        assert!(text.contains("No records found"));
        assert!(text.contains("$0.00"));
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefghij", 5), "abcd…");
    }
}
