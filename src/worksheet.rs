//! Editable in-memory list of sections for one entity.
use thiserror::Error;
use tracing::info;

use crate::api::client::EntityClient;
use crate::api::{ApiError, Transport};
use crate::model::{Alternate, LineItem, Section, Totals};
use crate::resolve::aggregate;

/// Upper bound on alternates per item.
pub const MAX_ALTERNATES: usize = 8;

/// Blank alternates a freshly added item starts with.
pub const STARTER_ALTERNATES: usize = 2;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WorksheetError {
    #[error("no item at position {0}")]
    NoSuchItem(usize),

    #[error("item {item} has no alternate at position {alternate}")]
    NoSuchAlternate { item: usize, alternate: usize },

    #[error("item {0} already has the maximum of {max} alternates", max = MAX_ALTERNATES)]
    AlternateLimit(usize),

    #[error("the last remaining item cannot be removed")]
    LastItem,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    sections: Vec<Section>,
}

impl Worksheet {
    #[must_use]
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Load the current server state (degrades to empty, see
    /// [`EntityClient::load_sections`]).
    pub fn load<T: Transport + ?Sized>(client: &EntityClient<'_, T>) -> Self {
        Self::new(client.load_sections())
    }

    /// Append one empty alternate slot to every section that still has room,
    /// ready for the user to fill in.
    #[must_use]
    pub fn with_blank_slots(mut self) -> Self {
        for section in &mut self.sections {
            if section.alternates.len() < MAX_ALTERNATES {
                section.alternates.push(Alternate::default());
            }
        }
        self
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }

    pub fn item_mut(&mut self, item: usize) -> Result<&mut Section, WorksheetError> {
        self.sections
            .get_mut(item)
            .ok_or(WorksheetError::NoSuchItem(item))
    }

    #[must_use]
    pub fn totals(&self) -> Totals {
        aggregate(&self.sections)
    }

    /// Add a blank item with [`STARTER_ALTERNATES`] blank alternates; returns
    /// its position.
    pub fn add_item(&mut self) -> usize {
        self.sections.push(Section::new(
            LineItem::default(),
            vec![Alternate::default(); STARTER_ALTERNATES],
        ));
        self.sections.len() - 1
    }

    /// Remove an item. The list never becomes empty through this call.
    pub fn remove_item(&mut self, item: usize) -> Result<Section, WorksheetError> {
        if item >= self.sections.len() {
            return Err(WorksheetError::NoSuchItem(item));
        }
        if self.sections.len() <= 1 {
            return Err(WorksheetError::LastItem);
        }
        Ok(self.sections.remove(item))
    }

    /// Add a blank alternate; returns its position within the item.
    pub fn add_alternate(&mut self, item: usize) -> Result<usize, WorksheetError> {
        let section = self.item_mut(item)?;
        if section.alternates.len() >= MAX_ALTERNATES {
            return Err(WorksheetError::AlternateLimit(item));
        }
        section.alternates.push(Alternate::default());
        Ok(section.alternates.len() - 1)
    }

    pub fn remove_alternate(
        &mut self,
        item: usize,
        alternate: usize,
    ) -> Result<Alternate, WorksheetError> {
        let section = self.item_mut(item)?;
        if alternate >= section.alternates.len() {
            return Err(WorksheetError::NoSuchAlternate { item, alternate });
        }
        Ok(section.alternates.remove(alternate))
    }

    /// Delete a primary on the server, then drop it from the list. On failure
    /// the list is left untouched.
    pub fn delete<T: Transport + ?Sized>(
        &mut self,
        client: &EntityClient<'_, T>,
        primary_id: &str,
    ) -> Result<(), ApiError> {
        client.delete_primary(primary_id)?;
        let before = self.sections.len();
        self.sections
            .retain(|s| s.primary.existing_id() != Some(primary_id));
        info!(
            "Removed {} item(s) with id {primary_id} from worksheet",
            before - self.sections.len()
        );
        Ok(())
    }
}
