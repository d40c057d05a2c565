//! Push edited sections back to the server.
//!
//! Sections are processed one at a time in order, and within a section the
//! primary goes first, then each alternate. The first failing call stops the
//! pass: whatever was already written stays written, nothing after it is
//! attempted.
use indicatif::ProgressBar;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::client::EntityClient;
use crate::api::{ApiError, Transport};
use crate::model::Section;
use crate::reconcile::{AltAction, Plan, classify};

/// Counts of what a submission pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubmitReport {
    pub skipped: usize,
    pub primaries_created: usize,
    pub primaries_updated: usize,
    pub alternates_created: usize,
    pub alternates_updated: usize,
}

#[derive(Error, Debug)]
pub enum SyncError {
    /// `index` is the zero-based section position; `completed` covers every
    /// call that succeeded before the failure.
    #[error("item {}: {source}", .index + 1)]
    Row {
        index: usize,
        source: ApiError,
        completed: SubmitReport,
    },
}

impl SubmitReport {
    #[must_use]
    pub fn writes(&self) -> usize {
        self.primaries_created
            + self.primaries_updated
            + self.alternates_created
            + self.alternates_updated
    }
}

/// Submit every section, fail-fast.
pub fn submit<T: Transport + ?Sized>(
    client: &EntityClient<'_, T>,
    sections: &[Section],
    progress: &ProgressBar,
) -> Result<SubmitReport, SyncError> {
    let mut report = SubmitReport::default();
    progress.set_length(sections.len() as u64);

    for (index, section) in sections.iter().enumerate() {
        let plan = classify(section);
        progress.set_message(format!("item {} ({})", index + 1, plan.kind()));

        if let Err(source) = apply(client, section, &plan, &mut report) {
            progress.abandon();
            return Err(SyncError::Row {
                index,
                source,
                completed: report,
            });
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    info!(
        "Submitted {} section(s): {} created, {} updated, {} skipped",
        sections.len(),
        report.primaries_created,
        report.primaries_updated,
        report.skipped
    );
    Ok(report)
}

fn apply<T: Transport + ?Sized>(
    client: &EntityClient<'_, T>,
    section: &Section,
    plan: &Plan,
    report: &mut SubmitReport,
) -> Result<(), ApiError> {
    let (parent_id, actions) = match plan {
        Plan::Skip => {
            warn!("Skipping empty primary row");
            report.skipped += 1;
            return Ok(());
        }
        Plan::UpdatePrimaryAndSyncAlts {
            primary_id,
            alternates,
        } => {
            client.update_primary(primary_id, &section.primary)?;
            report.primaries_updated += 1;
            (primary_id.clone(), alternates)
        }
        Plan::CreatePrimaryAndChildren { alternates } => {
            let id = client.create_primary(&section.primary)?;
            report.primaries_created += 1;
            (id, alternates)
        }
    };

    for (alt, action) in section.alternates.iter().zip(actions) {
        match action {
            AltAction::Skip => {}
            AltAction::Update { alternate_id } => {
                client.update_alternate(alternate_id, alt)?;
                report.alternates_updated += 1;
            }
            AltAction::Create => {
                client.create_alternate(&parent_id, alt)?;
                report.alternates_created += 1;
            }
        }
    }
    Ok(())
}
