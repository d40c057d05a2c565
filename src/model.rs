//! Typed records for estimate line items.
//!
//! These are the in-memory / draft-file shapes. Wire (PascalCase) mapping
//! lives in [`crate::api::wire`].
use serde::{Deserialize, Serialize};

use crate::amount::{parse_amount, parse_amount_opt};

/// One estimate line: a primary or the body of an alternate.
///
/// Cost and labor fields are kept as entered; use [`crate::amount`] to read
/// them as numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub description: String,
    pub supplier: String,
    pub cost: String,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor_hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor_cost: Option<String>,
}

/// A subordinate option for a primary. Overrides the primary in totals when
/// `used` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alternate {
    #[serde(flatten)]
    pub item: LineItem,
    pub used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// A primary plus its alternates; the unit of editing and submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    pub primary: LineItem,
    pub alternates: Vec<Alternate>,
}

/// Alt-adjusted sums over a set of sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub material_cost: f64,
    pub labor_hours: f64,
    pub labor_cost: f64,
}

fn is_blank_text(s: &str) -> bool {
    s.trim().is_empty()
}

fn is_blank_opt(s: Option<&String>) -> bool {
    s.is_none_or(|v| is_blank_text(v))
}

impl LineItem {
    #[must_use]
    pub fn new(description: &str, supplier: &str, cost: &str, notes: &str) -> Self {
        Self {
            description: description.to_string(),
            supplier: supplier.to_string(),
            cost: cost.to_string(),
            notes: notes.to_string(),
            ..Self::default()
        }
    }

    /// Builder-style labor fields.
    #[must_use]
    pub fn with_labor(mut self, labor_type: &str, hours: &str, cost: &str) -> Self {
        self.labor_type = Some(labor_type.to_string());
        self.labor_hours = Some(hours.to_string());
        self.labor_cost = Some(cost.to_string());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// True when no user-editable field carries any content. The id is not a
    /// field for this purpose.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        is_blank_text(&self.description)
            && is_blank_text(&self.supplier)
            && is_blank_text(&self.cost)
            && is_blank_text(&self.notes)
            && is_blank_opt(self.labor_type.as_ref())
            && is_blank_opt(self.labor_hours.as_ref())
            && is_blank_opt(self.labor_cost.as_ref())
    }

    /// The server-assigned id, if any (blank ids count as absent).
    #[must_use]
    pub fn existing_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    #[must_use]
    pub fn cost_amount(&self) -> f64 {
        parse_amount(&self.cost)
    }

    #[must_use]
    pub fn labor_hours_amount(&self) -> f64 {
        parse_amount_opt(self.labor_hours.as_deref())
    }

    #[must_use]
    pub fn labor_cost_amount(&self) -> f64 {
        parse_amount_opt(self.labor_cost.as_deref())
    }
}

impl Alternate {
    #[must_use]
    pub fn new(item: LineItem, used: bool) -> Self {
        Self {
            item,
            used,
            parent_id: None,
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.item.is_blank()
    }
}

impl Section {
    #[must_use]
    pub fn new(primary: LineItem, alternates: Vec<Alternate>) -> Self {
        Self {
            primary,
            alternates,
        }
    }

    /// The row whose values feed display and totals.
    #[must_use]
    pub fn effective(&self) -> &LineItem {
        crate::resolve::resolve_effective(&self.primary, &self.alternates)
    }

    #[must_use]
    pub fn has_used_alternate(&self) -> bool {
        self.alternates.iter().any(|a| a.used)
    }

    /// Number of alternates flagged as used. Anything above one means the
    /// first-wins tie-break is in effect.
    #[must_use]
    pub fn used_count(&self) -> usize {
        self.alternates.iter().filter(|a| a.used).count()
    }
}

impl Totals {
    pub fn add(&mut self, item: &LineItem) {
        self.material_cost += item.cost_amount();
        self.labor_hours += item.labor_hours_amount();
        self.labor_cost += item.labor_cost_amount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_detection() {
        assert!(LineItem::default().is_blank());
        assert!(LineItem::new("  ", "", "\t", "").is_blank());
        assert!(LineItem::default().with_id("12").is_blank());
        assert!(!LineItem::new("", "", "0", "").is_blank());
        assert!(!LineItem::default().with_labor("", "", "5").is_blank());
    }

    #[test]
    fn test_existing_id_ignores_blank() {
        assert_eq!(LineItem::default().existing_id(), None);
        assert_eq!(LineItem::default().with_id(" ").existing_id(), None);
        assert_eq!(LineItem::default().with_id("7").existing_id(), Some("7"));
    }

    #[test]
    fn test_used_counters() {
        let section = Section::new(
            LineItem::new("RTU", "", "100", ""),
            vec![
                Alternate::new(LineItem::new("A", "", "1", ""), true),
                Alternate::new(LineItem::new("B", "", "2", ""), false),
                Alternate::new(LineItem::new("C", "", "3", ""), true),
            ],
        );
        assert!(section.has_used_alternate());
        assert_eq!(section.used_count(), 2);
        assert_eq!(section.effective().description, "A");
    }

    #[test]
    fn test_draft_json_shape() {
        let json = r#"{
            "primary": {"id": "4", "description": "Boiler", "cost": "$1200"},
            "alternates": [{"description": "Smaller boiler", "cost": "900", "used": true}]
        }"#;
        let section: Section = serde_json::from_str(json).unwrap();
        assert_eq!(section.primary.existing_id(), Some("4"));
        assert_eq!(section.primary.cost_amount(), 1200.0);
        assert!(section.alternates[0].used);
        assert_eq!(section.alternates[0].item.description, "Smaller boiler");
        assert_eq!(section.alternates[0].item.labor_hours, None);
    }

    #[test]
    fn test_totals_add() {
        let mut totals = Totals::default();
        totals.add(&LineItem::new("x", "", "$10", "").with_labor("Pipefitter", "2.5", "$150"));
        totals.add(&LineItem::new("y", "", "5", ""));
        assert_eq!(totals.material_cost, 15.0);
        assert_eq!(totals.labor_hours, 2.5);
        assert_eq!(totals.labor_cost, 150.0);
    }
}
