pub mod correction;
pub mod loaders;

pub use correction::{
    BatchEntry, BatchResult, BatchSummary, CorrectionBatch, CorrectionRecord, Outcome, Progress,
    StepOutcome,
};
pub use loaders::{
    clear_statuses, load_all_batches, load_batch, save_batch, write_result, write_template,
};
