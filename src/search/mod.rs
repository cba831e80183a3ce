//! Search backends behind a common trait.
//!
//! This module contains:
//! - `traits` - the `Search` trait, `Backend` selector and `ResultItem` shape
//! - `normalize` - query cleanup for keyword search
//! - `keyword` - Solr keyword search
//! - `vector` - Milvus vector search with lazy collection setup
//! - `error` - the two user-facing error kinds

pub mod error;
pub mod keyword;
pub mod normalize;
pub mod traits;
pub mod vector;

pub use error::SearchError;
pub use keyword::KeywordSearcher;
pub use normalize::normalize_query;
pub use traits::{Backend, ResultId, ResultItem, Search};
pub use vector::{MilvusCollection, VectorSearcher, VectorStore};
