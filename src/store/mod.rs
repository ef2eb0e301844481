pub mod jsonl;

use crate::app::Result;
use crate::domain::PostRecord;

pub use jsonl::JsonlStore;

/// Destination for scraped records
pub trait Store {
    fn append(&self, record: &PostRecord) -> Result<()>;
}
