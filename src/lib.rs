//! Water quality classification service.
//!
//! Classifies water samples (pH, TDS, temperature, dissolved oxygen) as
//! suitable, marginally suitable or not suitable, using a trained decision
//! tree when one is available and a deterministic threshold table otherwise.
//!
//! Modules:
//! - `model`      — shared domain types and errors.
//! - `parameters` — the per-parameter threshold table.
//! - `classify`   — threshold classifier, label mapping, model predictors.
//! - `handler`    — transport-independent request handling.
//! - `server`     — blocking HTTP server.
//! - `config`     — layered TOML / environment configuration.
//! - `logging`    — structured console and file logging.

pub mod classify;
pub mod config;
pub mod handler;
pub mod logging;
pub mod model;
pub mod parameters;
pub mod server;

pub use classify::{classify_reading, classify_threshold};
pub use model::{ClassificationResult, ClassifyError, Label, Method, Reading};
