pub mod record;

pub use record::{Record, Stats, UNLABELED, normalize_label};
