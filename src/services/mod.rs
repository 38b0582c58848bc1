pub mod status_classifier;
pub mod status_log_writer;

pub use status_classifier::StatusClassifier;
pub use status_log_writer::StatusLogWriter;
