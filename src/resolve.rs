//! Effective-row resolution and alt-adjusted totals.
use crate::model::{Alternate, LineItem, Section, Totals};

/// Pick the row that represents a section: the first alternate flagged as
/// used, in sequence order, or the primary when none is.
///
/// Several used alternates are not an error; the earliest one wins.
#[must_use]
pub fn resolve_effective<'a>(primary: &'a LineItem, alternates: &'a [Alternate]) -> &'a LineItem {
    alternates
        .iter()
        .find(|alt| alt.used)
        .map_or(primary, |alt| &alt.item)
}

/// Sum material cost, labor hours and labor cost of every section's
/// effective row. Blank sections contribute zero.
#[must_use]
pub fn aggregate(sections: &[Section]) -> Totals {
    sections.iter().fold(Totals::default(), |mut totals, section| {
        totals.add(section.effective());
        totals
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alt(description: &str, cost: &str, used: bool) -> Alternate {
        Alternate::new(LineItem::new(description, "", cost, ""), used)
    }

    #[test]
    fn test_no_alternates_returns_primary() {
        let primary = LineItem::new("Primary", "ACME", "50", "");
        assert_eq!(resolve_effective(&primary, &[]), &primary);
    }

    #[test]
    fn test_unused_alternates_return_primary() {
        let primary = LineItem::new("Primary", "", "50", "");
        let alts = vec![alt("A", "10", false), alt("B", "20", false)];
        assert_eq!(resolve_effective(&primary, &alts).description, "Primary");
    }

    #[test]
    fn test_used_alternate_wins() {
        let primary = LineItem::new("Primary", "", "50", "");
        let alts = vec![alt("A", "10", false), alt("B", "20", true)];
        assert_eq!(resolve_effective(&primary, &alts), &alts[1].item);
    }

    #[test]
    fn test_first_used_alternate_wins() {
        let primary = LineItem::new("Primary", "", "50", "");
        let alts = vec![alt("A", "10", true), alt("B", "20", true)];
        assert_eq!(resolve_effective(&primary, &alts).description, "A");
    }

    #[test]
    fn test_aggregate_empty() {
        assert_eq!(aggregate(&[]), Totals::default());
        let totals = aggregate(&[]);
        assert_eq!(totals.material_cost, 0.0);
        assert_eq!(totals.labor_hours, 0.0);
        assert_eq!(totals.labor_cost, 0.0);
    }

    #[test]
    fn test_aggregate_uses_effective_rows() {
        let sections = vec![
            Section::new(
                LineItem::new("Chiller", "", "500", ""),
                vec![alt("Used alt", "100", true)],
            ),
            Section::new(
                LineItem::new("Pump", "", "50", ""),
                vec![alt("Unused alt", "999", false)],
            ),
        ];
        assert_eq!(aggregate(&sections).material_cost, 150.0);
    }

    #[test]
    fn test_aggregate_labor_and_blank_sections() {
        let sections = vec![
            Section::new(
                LineItem::new("Duct", "", "$200", "").with_labor("Sheet metal", "4", "$320"),
                vec![Alternate::new(
                    LineItem::new("Flex duct", "", "$80", "").with_labor("Sheet metal", "1.5", "120"),
                    true,
                )],
            ),
            Section::default(),
            Section::new(LineItem::new("Valve", "", "garbage", "").with_labor("", "", ""), vec![]),
        ];
        let totals = aggregate(&sections);
        assert_eq!(totals.material_cost, 80.0);
        assert_eq!(totals.labor_hours, 1.5);
        assert_eq!(totals.labor_cost, 120.0);
    }

    #[test]
    fn test_aggregate_order_independent_and_repeatable() {
        let mut sections = vec![
            Section::new(LineItem::new("a", "", "1.25", ""), vec![]),
            Section::new(LineItem::new("b", "", "2.50", ""), vec![alt("c", "4", true)]),
            Section::new(LineItem::new("d", "", "8", ""), vec![]),
        ];
        let forward = aggregate(&sections);
        assert_eq!(aggregate(&sections), forward);
        sections.reverse();
        assert_eq!(aggregate(&sections), forward);
        assert_eq!(forward.material_cost, 13.25);
    }
}
