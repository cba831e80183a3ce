//! Offline indexers that populate each backend from CSV corpora.

pub mod corpus;
pub mod milvus;
pub mod solr;

pub use corpus::{read_rows, CorpusError, CorpusRow};
pub use milvus::{index_milvus, prepare_corpus, MilvusIndexReport};
pub use solr::{index_solr, SolrIndexReport};
