/// Per-entity REST client.
///
/// One implementation serves every entity kind; the route table entry
/// supplies paths and the id key.
use serde_json::Value;
use tracing::{debug, info, warn};

use super::wire;
use super::{ApiError, ApiPath, Method, Transport};
use crate::config::EntityRoute;
use crate::model::{Alternate, LineItem, Section};

pub struct EntityClient<'a, T: Transport + ?Sized> {
    transport: &'a T,
    route: &'a EntityRoute,
}

impl<'a, T: Transport + ?Sized> EntityClient<'a, T> {
    pub fn new(transport: &'a T, route: &'a EntityRoute) -> Self {
        Self { transport, route }
    }

    #[must_use]
    pub fn route(&self) -> &EntityRoute {
        self.route
    }

    /// Issue one call; non-2xx becomes [`ApiError::Status`] carrying the
    /// server's payload. Success bodies that are empty or not JSON read as
    /// `Value::Null`.
    fn call(
        &self,
        operation: &str,
        method: Method,
        path: ApiPath,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        debug!("{operation}: {method} {path}");
        let response = self.transport.send(method, &path, body)?;
        if !response.is_success() {
            return Err(ApiError::Status {
                operation: operation.to_string(),
                status: response.status,
                payload: response.error_payload(),
            });
        }
        Ok(response.json().unwrap_or(Value::Null))
    }

    /// `GET /<entity>`
    pub fn list_primaries(&self) -> Result<Vec<LineItem>, ApiError> {
        let path = ApiPath::expand(&self.route.list_template(), None);
        let payload = self.call(
            &format!("{} list", self.route.display_name()),
            Method::Get,
            path,
            None,
        )?;
        Ok(wire::list_records(payload)
            .iter()
            .map(|r| wire::line_item_from_wire(r, &self.route.id_field))
            .collect())
    }

    /// `GET /<entity>/alternates/<parent_id>`
    pub fn list_alternates(&self, parent_id: &str) -> Result<Vec<Alternate>, ApiError> {
        let path = ApiPath::expand(&self.route.alternates_list_template(), Some(parent_id));
        let payload = self.call("Alternates list", Method::Get, path, None)?;
        Ok(wire::list_records(payload)
            .iter()
            .map(|r| wire::alternate_from_wire(r, &self.route.id_field))
            .collect())
    }

    /// Fetch every primary with its alternates.
    ///
    /// Never fails: a failed list yields no sections and a failed alternates
    /// fetch yields a section without alternates. Both are logged.
    pub fn load_sections(&self) -> Vec<Section> {
        let primaries = match self.list_primaries() {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to load {}: {e}", self.route.display_name());
                return Vec::new();
            }
        };

        let sections: Vec<Section> = primaries
            .into_iter()
            .map(|primary| {
                let alternates = match primary.existing_id() {
                    Some(id) => self.list_alternates(id).unwrap_or_else(|e| {
                        warn!("Failed to load alternates for {id}: {e}");
                        Vec::new()
                    }),
                    None => Vec::new(),
                };
                let section = Section::new(primary, alternates);
                if section.used_count() > 1 {
                    warn!(
                        "{} {} has {} alternates marked used; the first one counts",
                        self.route.display_name(),
                        section.primary.existing_id().unwrap_or("?"),
                        section.used_count()
                    );
                }
                section
            })
            .collect();

        info!(
            "Loaded {} {} section(s)",
            sections.len(),
            self.route.display_name()
        );
        sections
    }

    /// `POST /<entity>`; returns the id the server assigned.
    pub fn create_primary(&self, item: &LineItem) -> Result<String, ApiError> {
        let path = ApiPath::expand(self.route.root(), None);
        let body = wire::primary_body(item);
        let response = self.call(
            &format!("{} POST", self.route.display_name()),
            Method::Post,
            path,
            Some(&body),
        )?;
        wire::created_id(&response, &self.route.id_field).ok_or_else(|| ApiError::MissingId {
            entity: self.route.display_name().to_string(),
            id_field: self.route.id_field.clone(),
        })
    }

    /// `PUT /<entity>/<id>`
    pub fn update_primary(&self, id: &str, item: &LineItem) -> Result<(), ApiError> {
        let path = ApiPath::expand(&self.route.item_template(), Some(id));
        let body = wire::primary_body(item);
        self.call(
            &format!("{} UPDATE", self.route.display_name()),
            Method::Put,
            path,
            Some(&body),
        )?;
        Ok(())
    }

    /// `POST /<entity>/alternates`; returns the new alternate id when the
    /// server reports one.
    pub fn create_alternate(
        &self,
        parent_id: &str,
        alt: &Alternate,
    ) -> Result<Option<String>, ApiError> {
        let path = ApiPath::expand(&self.route.alternates_template(), None);
        let body = wire::alternate_body(alt, Some((self.route.id_field.as_str(), parent_id)));
        let response = self.call("Alternate POST", Method::Post, path, Some(&body))?;
        Ok(wire::created_id(&response, wire::ALTERNATE_ID_FIELD))
    }

    /// `PUT /<entity>/alternates/<alternate_id>`
    pub fn update_alternate(&self, alternate_id: &str, alt: &Alternate) -> Result<(), ApiError> {
        let path = ApiPath::expand(&self.route.alternate_item_template(), Some(alternate_id));
        let body = wire::alternate_body(alt, None);
        self.call("Alternate UPDATE", Method::Put, path, Some(&body))?;
        Ok(())
    }

    /// `DELETE /<entity>/<id>`
    pub fn delete_primary(&self, id: &str) -> Result<(), ApiError> {
        let path = ApiPath::expand(&self.route.item_template(), Some(id));
        self.call(
            &format!("{} DELETE", self.route.display_name()),
            Method::Delete,
            path,
            None,
        )?;
        info!("Deleted {} {id}", self.route.display_name());
        Ok(())
    }

    /// `DELETE /<entity>/clear`
    pub fn clear_all(&self) -> Result<(), ApiError> {
        let path = ApiPath::expand(&self.route.clear_template(), None);
        self.call(
            &format!("{} CLEAR", self.route.display_name()),
            Method::Delete,
            path,
            None,
        )?;
        info!("Cleared all {}", self.route.display_name());
        Ok(())
    }
}
