//! Banking data-product agents.
//!
//! Routes free-text banking use cases onto one of four data products
//! and suggests source-to-target field mappings, using a local model
//! endpoint when one is up and deterministic fallbacks when it is not.
//! The supporting agents (sample data, customer processing, report
//! export, health) round out the pipeline.

pub mod designer;
pub mod error;
pub mod extract;
pub mod health;
pub mod interpreter;
pub mod mapper;
pub mod processor;
pub mod prompt;
pub mod reporter;
pub mod schema;

mod routing;

pub use designer::{SampleBatch, SampleDataGenerator};
pub use error::RequestError;
pub use health::{health, Health};
pub use interpreter::UseCaseInterpreter;
pub use mapper::FieldMapper;
pub use processor::{CustomerProcessor, ProcessingSummary};
pub use reporter::{Report, ReportError, ReportPaths, ReportWriter};
pub use schema::target_schema;
