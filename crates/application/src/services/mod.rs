mod authority_directory;
mod query_cache;

pub use authority_directory::AuthorityDirectory;
pub use query_cache::{QueryCache, QuestionKey};
