//! Clients for the two external engines.
//!
//! - `solr` - keyword engine (`/select`, `/update`)
//! - `milvus` - vector engine (RESTful v2 API)

pub mod milvus;
pub mod solr;

pub use milvus::{CollectionSchema, InsertRow, MilvusClient, MilvusError, SearchHit};
pub use solr::{SolrClient, SolrDoc, SolrDocument, SolrError};
