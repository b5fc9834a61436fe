mod cache;
mod collect;
mod files;
mod parse;

pub use cache::{LoadCache, LoadState};
pub use collect::{DataSource, Dataset, collect_dataset, load_matrix};
