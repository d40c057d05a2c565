//! # estimate-sync — construction estimate line items
//!
//! Loads equipment-like estimate sections (a primary line item plus its
//! alternates) from a REST backend, works out alt-adjusted totals, and pushes
//! edits back row by row.
//!
//! ## Architecture
//!
//! - **[`config`]** — API base URL, timeout, and the entity-route table
//! - **[`model`]** — `LineItem`, `Alternate`, `Section`, `Totals`
//! - **[`amount`]** — Free-form cost/hour text to numbers, money/hour formatting
//! - **[`resolve`]** — Effective-row resolution and totals aggregation
//! - **[`reconcile`]** — Skip / update / create classification per section
//! - **[`api`]** — `Transport` seam (reqwest + in-memory mock) and the generic entity client
//! - **[`sync`]** — Sequential, fail-fast submission of edited sections
//! - **[`worksheet`]** — Editable section list (item/alternate limits, confirmed deletes)
//! - **[`report`]** — Text list view with totals footer

pub mod amount;
pub mod api;
pub mod config;
pub mod model;
pub mod reconcile;
pub mod report;
pub mod resolve;
pub mod sync;
pub mod worksheet;
