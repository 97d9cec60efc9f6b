mod store;
mod types;

pub use store::FsModelRegistry;
pub use types::{ModelUri, RunRecord, VersionInfo};
