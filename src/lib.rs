//! Fetches a GEDCOM export from a webtrees server with one blocking GET and
//! streams it to disk, logging each step.

pub mod checksum;
pub mod download;
pub mod error;
pub mod logging;
pub mod request;

pub use download::{Download, FileFetcher, SavedFile, CHUNK_SIZE};
pub use error::FetchError;
pub use request::{
    Encoding, ExportFormat, ExportQuery, LineEndings, OutputTarget, Privacy, RequestSpec,
    ResponseStatus,
};
