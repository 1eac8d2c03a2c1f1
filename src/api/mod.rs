//! Purpose: Define the public Rust API boundary for fetching and populating models.
//! Exports: Model traits and types, the fetcher, its options and transports, errors.
//! Role: Single import path for applications; mirrors what the CLI uses.
//! Invariants: The promise form (`Fetcher::fetch`) is a thin adapter over `Fetcher::fetch_with`.
//! Invariants: Parsing is infallible; only fetching produces `Error`.

mod fetch;
mod options;
mod transport;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::dynamic::DynamicModel;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::matcher::{FieldKind, FieldValue, JsonObject};
pub use crate::core::model::{Declared, Model, Reflect, Resource};
pub use crate::core::parser::parse;
pub use crate::core::reflect::{DeclaredField, attribute, attributes, levels};
pub use fetch::{Fetcher, decode_object};
pub use options::FetchOptions;
pub use transport::{FetchConfig, Request, Transport, UreqTransport, form_pairs};
