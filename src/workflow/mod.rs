pub mod correction_flow;
pub mod record_ctx;

pub use correction_flow::{CorrectionFlow, ERROR_STATUS_PREFIX};
pub use record_ctx::RecordCtx;
