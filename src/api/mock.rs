/// In-memory backend for tests.
///
/// Emulates the per-entity REST surface (list, alternates, create, update,
/// delete, clear) for routes using the standard templates, records every
/// request, and can be told to fail specific calls.
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value, json};

use super::wire::ALTERNATE_ID_FIELD;
use super::{ApiError, ApiPath, Method, RawResponse, Transport};
use crate::config::EntityRoute;

#[derive(Default)]
struct Table {
    id_field: String,
    primaries: BTreeMap<u64, Map<String, Value>>,
    alternates: BTreeMap<u64, Map<String, Value>>,
}

struct Failure {
    method: Method,
    path: String,
    status: u16,
    payload: String,
}

#[derive(Default)]
struct State {
    tables: BTreeMap<String, Table>,
    next_id: u64,
    failures: Vec<Failure>,
    unreachable: Vec<String>,
    requests: Vec<(Method, String)>,
    wrap_lists: bool,
}

/// A recorded request: method plus the unencoded path.
pub type RecordedRequest = (Method, String);

pub struct MockTransport {
    state: Mutex<State>,
}

impl MockTransport {
    /// A backend serving one table per route (keyed by [`EntityRoute::root`]).
    #[must_use]
    pub fn new(routes: &[EntityRoute]) -> Self {
        let tables = routes
            .iter()
            .map(|r| {
                (
                    r.root().to_string(),
                    Table {
                        id_field: r.id_field.clone(),
                        ..Table::default()
                    },
                )
            })
            .collect();
        Self {
            state: Mutex::new(State {
                tables,
                next_id: 1,
                ..State::default()
            }),
        }
    }

    /// Serve list responses as `{ "sample": [...] }` instead of a bare array.
    #[must_use]
    pub fn wrapping_lists(self) -> Self {
        self.lock().wrap_lists = true;
        self
    }

    /// Answer `method path` with `status` and `payload` from now on.
    pub fn fail(&self, method: Method, path: &str, status: u16, payload: &str) {
        self.lock().failures.push(Failure {
            method,
            path: path.to_string(),
            status,
            payload: payload.to_string(),
        });
    }

    /// Make every request to `path` fail at the transport level.
    pub fn disconnect(&self, path: &str) {
        self.lock().unreachable.push(path.to_string());
    }

    /// Insert a primary directly; returns its id.
    ///
    /// # Panics
    /// If no route was registered under `entity`.
    pub fn seed_primary(&self, entity: &str, record: Value) -> String {
        let mut state = self.lock();
        let id = state.take_id();
        let table = state.seed_table(entity);
        let mut map = as_object(record);
        map.insert(table.id_field.clone(), json!(id));
        table.primaries.insert(id, map);
        id.to_string()
    }

    /// Insert an alternate under `parent_id`; returns its id.
    ///
    /// # Panics
    /// If no route was registered under `entity`.
    pub fn seed_alternate(&self, entity: &str, parent_id: &str, record: Value) -> String {
        let mut state = self.lock();
        let id = state.take_id();
        let table = state.seed_table(entity);
        let mut map = as_object(record);
        map.insert(ALTERNATE_ID_FIELD.to_string(), json!(id));
        map.insert(table.id_field.clone(), parent_value(parent_id));
        table.alternates.insert(id, map);
        id.to_string()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Requests other than `GET`s.
    #[must_use]
    pub fn writes(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|(m, _)| *m != Method::Get)
            .collect()
    }

    #[must_use]
    pub fn primaries(&self, entity: &str) -> Vec<Value> {
        self.lock()
            .tables
            .get(entity)
            .map(|t| t.primaries.values().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn alternates(&self, entity: &str) -> Vec<Value> {
        self.lock()
            .tables
            .get(entity)
            .map(|t| t.alternates.values().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MockTransport {
    fn send(
        &self,
        method: Method,
        path: &ApiPath,
        body: Option<&Value>,
    ) -> Result<RawResponse, ApiError> {
        let mut state = self.lock();
        let path_text = path.to_string();
        state.requests.push((method, path_text.clone()));

        if state.unreachable.iter().any(|p| *p == path_text) {
            return Err(ApiError::Transport {
                path: path_text,
                message: "connection refused".to_string(),
            });
        }

        if let Some(f) = state
            .failures
            .iter()
            .find(|f| f.method == method && f.path == path_text)
        {
            return Ok(RawResponse::new(f.status, f.payload.clone()));
        }

        Ok(state.route(method, path.segments(), body))
    }
}

impl State {
    fn seed_table(&mut self, entity: &str) -> &mut Table {
        let known: Vec<String> = self.tables.keys().cloned().collect();
        self.tables
            .get_mut(entity)
            .unwrap_or_else(|| panic!("no mock table {entity:?} (known: {})", known.join(", ")))
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn route(&mut self, method: Method, segments: &[String], body: Option<&Value>) -> RawResponse {
        let Some((root, rest)) = segments.split_first() else {
            return not_found();
        };
        if !self.tables.contains_key(root.as_str()) {
            return not_found();
        }
        let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

        match (method, rest.as_slice()) {
            (Method::Get, []) => {
                let items: Vec<Value> = self
                    .table(root)
                    .primaries
                    .values()
                    .cloned()
                    .map(Value::Object)
                    .collect();
                self.list_response(items)
            }
            (Method::Get, ["alternates", parent]) => {
                let table = self.table(root);
                let items: Vec<Value> = table
                    .alternates
                    .values()
                    .filter(|a| id_matches(a.get(&table.id_field), parent))
                    .cloned()
                    .map(Value::Object)
                    .collect();
                self.list_response(items)
            }
            (Method::Post, []) => {
                let id = self.take_id();
                let table = self.table_mut(root);
                let mut record = body.cloned().map(as_object).unwrap_or_default();
                record.insert(table.id_field.clone(), json!(id));
                table.primaries.insert(id, record);
                let key = table.id_field.clone();
                RawResponse::new(201, json!({ key: id }).to_string())
            }
            (Method::Post, ["alternates"]) => {
                let table_id_field = self.table(root).id_field.clone();
                let record = body.cloned().map(as_object).unwrap_or_default();
                let parent = record
                    .get(&table_id_field)
                    .and_then(id_of)
                    .filter(|p| self.table(root).primaries.contains_key(p));
                if parent.is_none() {
                    return RawResponse::new(
                        400,
                        json!({ "error": format!("{table_id_field} missing or unknown") })
                            .to_string(),
                    );
                }
                let id = self.take_id();
                let mut record = record;
                record.insert(ALTERNATE_ID_FIELD.to_string(), json!(id));
                self.table_mut(root).alternates.insert(id, record);
                RawResponse::new(201, json!({ ALTERNATE_ID_FIELD: id }).to_string())
            }
            (Method::Put, ["alternates", alt_id]) => {
                let table = self.table_mut(root);
                match parse_id(alt_id).and_then(|id| table.alternates.get_mut(&id)) {
                    Some(existing) => {
                        merge(existing, body);
                        RawResponse::new(200, json!({ "updated": 1 }).to_string())
                    }
                    None => not_found(),
                }
            }
            (Method::Delete, ["clear"]) => {
                let table = self.table_mut(root);
                let deleted = table.primaries.len();
                table.primaries.clear();
                table.alternates.clear();
                RawResponse::new(200, json!({ "deleted": deleted }).to_string())
            }
            (Method::Put, [id]) => {
                let table = self.table_mut(root);
                match parse_id(id).and_then(|id| table.primaries.get_mut(&id)) {
                    Some(existing) => {
                        merge(existing, body);
                        RawResponse::new(200, json!({ "updated": 1 }).to_string())
                    }
                    None => not_found(),
                }
            }
            (Method::Delete, [id]) => {
                let table = self.table_mut(root);
                match parse_id(id).and_then(|id| table.primaries.remove(&id)) {
                    Some(_) => {
                        let id_field = table.id_field.clone();
                        table
                            .alternates
                            .retain(|_, a| !id_matches(a.get(&id_field), id));
                        RawResponse::new(200, json!({ "deleted": 1 }).to_string())
                    }
                    None => not_found(),
                }
            }
            _ => not_found(),
        }
    }

    fn list_response(&self, items: Vec<Value>) -> RawResponse {
        let payload = if self.wrap_lists {
            json!({ "sample": items })
        } else {
            Value::Array(items)
        };
        RawResponse::new(200, payload.to_string())
    }

    fn table(&self, root: &str) -> &Table {
        &self.tables[root]
    }

    fn table_mut(&mut self, root: &str) -> &mut Table {
        self.tables.entry(root.to_string()).or_default()
    }
}

fn not_found() -> RawResponse {
    RawResponse::new(404, json!({ "error": "not found" }).to_string())
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn merge(existing: &mut Map<String, Value>, body: Option<&Value>) {
    if let Some(Value::Object(update)) = body {
        for (k, v) in update {
            existing.insert(k.clone(), v.clone());
        }
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

fn id_of(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => parse_id(s),
        _ => None,
    }
}

fn id_matches(value: Option<&Value>, raw: &str) -> bool {
    value.and_then(id_of).is_some_and(|id| Some(id) == parse_id(raw))
}

fn parent_value(parent_id: &str) -> Value {
    parse_id(parent_id).map_or_else(|| json!(parent_id), |n| json!(n))
}
