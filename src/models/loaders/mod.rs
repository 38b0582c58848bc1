pub mod toml_loader;

pub use toml_loader::{
    clear_statuses, load_all_batches, load_batch, save_batch, write_result, write_template,
};
