pub mod analytics;
pub mod config;
pub mod errors;
pub mod formatting;
pub mod report;
pub mod sources;
pub mod videos;

// Re-exports
pub use config::ReportConfig;
pub use errors::{AggregationError, SourceError};
pub use report::{Report, ReportBuilder};
pub use sources::{ChannelRef, VideoSource};
pub use videos::{Category, ClassifiedRecord, DateRange, VideoRecord};
