//! Eventide primitive types, schemas, error and configuration types shared by every crate
//! of the workspace.
#![warn(missing_docs)]

mod backend;
mod config;
mod dtype;
/// Error type shared by every crate of the workspace, with its constructors.
pub mod error;
mod operator;
mod schema;
mod value;

pub use backend::BackendKey;
pub use config::{EvaluationConfig, InputPolicy};
pub use dtype::{DType, StorageType};
pub use error::EventideError;
pub use operator::OperatorTag;
pub use schema::{FeatureSchema, IndexSchema, Schema};
pub use value::Value;
