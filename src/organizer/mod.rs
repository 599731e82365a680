pub mod job;
pub mod naming;
pub mod pipeline;
pub mod placement;
pub mod scanner;
pub mod taxonomy;
pub mod types;


pub use job::{FileOutcome, RunState, RunSummary, StepResult, UnclassifiedReason};
pub use naming::AttributePathBuilder;
pub use pipeline::{OrganizerPipeline, OrganizerRun, PDF_EXTENSION};
pub use placement::{PlacementMode, UNCLASSIFIED_DIR};
pub use scanner::list_files;
pub use types::{Attribute, ClassificationRecord, ContentType};
