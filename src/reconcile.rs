//! Classify edited sections into the server calls needed to persist them.
use std::fmt;

use crate::model::Section;

/// What to do with one alternate of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AltAction {
    /// `PUT /<entity>/alternates/<alternate_id>`
    Update { alternate_id: String },
    /// `POST /<entity>/alternates` tagged with the parent id
    Create,
    /// Entirely blank; nothing is sent.
    Skip,
}

/// Persistence plan for one section. `alternates` is index-aligned with
/// [`Section::alternates`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Skip,
    UpdatePrimaryAndSyncAlts {
        primary_id: String,
        alternates: Vec<AltAction>,
    },
    CreatePrimaryAndChildren {
        alternates: Vec<AltAction>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    Skip,
    UpdatePrimaryAndSyncAlts,
    CreatePrimaryAndChildren,
}

impl Plan {
    #[must_use]
    pub fn kind(&self) -> PlanKind {
        match self {
            Plan::Skip => PlanKind::Skip,
            Plan::UpdatePrimaryAndSyncAlts { .. } => PlanKind::UpdatePrimaryAndSyncAlts,
            Plan::CreatePrimaryAndChildren { .. } => PlanKind::CreatePrimaryAndChildren,
        }
    }

    /// Number of network calls the plan will issue.
    #[must_use]
    pub fn call_count(&self) -> usize {
        match self {
            Plan::Skip => 0,
            Plan::UpdatePrimaryAndSyncAlts { alternates, .. }
            | Plan::CreatePrimaryAndChildren { alternates } => {
                1 + alternates
                    .iter()
                    .filter(|a| **a != AltAction::Skip)
                    .count()
            }
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlanKind::Skip => "skip",
            PlanKind::UpdatePrimaryAndSyncAlts => "update-primary-and-sync-alts",
            PlanKind::CreatePrimaryAndChildren => "create-primary-and-children",
        })
    }
}

/// Decide how a section is persisted.
///
/// A blank primary skips the whole section, whatever its alternates hold.
/// A primary with an id is updated and its alternates are updated or created;
/// a primary without one is created first and every non-blank alternate is
/// created under the new id.
#[must_use]
pub fn classify(section: &Section) -> Plan {
    if section.primary.is_blank() {
        return Plan::Skip;
    }

    match section.primary.existing_id() {
        Some(primary_id) => Plan::UpdatePrimaryAndSyncAlts {
            primary_id: primary_id.to_string(),
            alternates: section
                .alternates
                .iter()
                .map(|alt| {
                    if alt.is_blank() {
                        AltAction::Skip
                    } else if let Some(alternate_id) = alt.item.existing_id() {
                        AltAction::Update {
                            alternate_id: alternate_id.to_string(),
                        }
                    } else {
                        AltAction::Create
                    }
                })
                .collect(),
        },
        None => Plan::CreatePrimaryAndChildren {
            alternates: section
                .alternates
                .iter()
                .map(|alt| {
                    if alt.is_blank() {
                        AltAction::Skip
                    } else {
                        AltAction::Create
                    }
                })
                .collect(),
        },
    }
}
