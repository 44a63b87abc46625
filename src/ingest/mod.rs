//! Submission ingestion
//!
//! Readers turn `.xlsx` templates and `.csv` files into format-agnostic
//! `Submission`s; the importer writes the rows of a checked submission to an
//! `EventStore`.

mod delimited;
mod errors;
mod importer;
mod reader;
mod workbook;

pub use delimited::{metadata_sidecar, read_csv};
pub use errors::{IngestError, IngestResult};
pub use importer::{ImportSummary, Importer};
pub use reader::{collect_inputs, read_submission, SubmissionFormat};
pub use workbook::{read_workbook, SheetLayout};
