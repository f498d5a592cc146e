pub mod autotag;
pub mod pipeline;
pub mod store_adapter;
pub mod traits;
pub mod worker;

pub use pipeline::{parse_document, PipelineDeps};
pub use store_adapter::{DbDuplicateFinder, DbValidationStore};
pub use traits::{object_key, DocumentParser, ObjectStorage, ParseError, ParseInput, ParseOutput, UploadInput, UploadOutput};
pub use worker::{Worker, WorkerConfig};
