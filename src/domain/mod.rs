pub mod date;
pub mod post;

pub use date::normalize_date;
pub use post::{parse_like_label, CommentRecord, PostRecord, SearchResultItem};
