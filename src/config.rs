use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ragcompare.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub solr: SolrConfig,

    #[serde(default)]
    pub milvus: MilvusConfig,

    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    #[serde(default)]
    pub corpus: CorpusConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP query router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_server_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

/// Keyword engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolrConfig {
    /// Core URL, e.g. `http://solr:8983/solr/rag_collection`
    #[serde(default = "default_solr_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            url: default_solr_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SolrConfig {
    pub fn select_url(&self) -> String {
        format!("{}/select", self.url.trim_end_matches('/'))
    }

    pub fn update_url(&self) -> String {
        format!("{}/update?commit=true", self.url.trim_end_matches('/'))
    }
}

fn default_solr_url() -> String {
    "http://solr:8983/solr/rag_collection".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Vector engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilvusConfig {
    /// Whether the vector backend is available at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_milvus_host")]
    pub host: String,

    #[serde(default = "default_milvus_port")]
    pub port: u16,

    /// Target collection name
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of IVF partitions probed at search time
    #[serde(default = "default_nprobe")]
    pub nprobe: u32,

    /// Number of IVF partitions built at index time
    #[serde(default = "default_nlist")]
    pub nlist: u32,
}

impl Default for MilvusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_milvus_host(),
            port: default_milvus_port(),
            collection: default_collection(),
            timeout_secs: default_timeout_secs(),
            nprobe: default_nprobe(),
            nlist: default_nlist(),
        }
    }
}

impl MilvusConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn default_true() -> bool {
    true
}

fn default_milvus_host() -> String {
    "milvus".to_string()
}

fn default_milvus_port() -> u16 {
    19530
}

fn default_collection() -> String {
    "rag_collection".to_string()
}

fn default_nprobe() -> u32 {
    10
}

fn default_nlist() -> u32 {
    1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// Embedding model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Output dimension; must match the collection schema
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Batch size for embedding generation
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Where model files are cached (fastembed default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            dimension: default_dimension(),
            batch_size: default_batch_size(),
            cache_dir: None,
        }
    }
}

fn default_model() -> String {
    "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2".to_string()
}

fn default_dimension() -> usize {
    384
}

fn default_batch_size() -> usize {
    64
}

/// One CSV dataset fed to the offline indexers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusFile {
    pub path: PathBuf,
    /// Source label stored with every vector-engine row from this file
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_files")]
    pub files: Vec<CorpusFile>,

    /// Stored text is cut to this many characters at index time
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    #[serde(default = "default_max_source_chars")]
    pub max_source_chars: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            files: default_corpus_files(),
            max_text_chars: default_max_text_chars(),
            max_source_chars: default_max_source_chars(),
        }
    }
}

fn default_corpus_files() -> Vec<CorpusFile> {
    vec![
        CorpusFile {
            path: PathBuf::from("data/corpus/entrevistas_preprocesado.csv"),
            source: "entrevista".to_string(),
        },
        CorpusFile {
            path: PathBuf::from("data/corpus/libro_preprocesado.csv"),
            source: "libro".to_string(),
        },
    ]
}

fn default_max_text_chars() -> usize {
    2000
}

fn default_max_source_chars() -> usize {
    256
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write logs to rotating files
    #[serde(default)]
    pub enabled: bool,

    /// Write logs to stderr
    #[serde(default = "default_true")]
    pub stderr: bool,

    /// Level for the file layer: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory, relative paths resolve against the working directory
    #[serde(default = "default_log_dir")]
    pub directory: PathBuf,

    #[serde(default = "default_log_prefix")]
    pub file_prefix: String,

    /// hourly, daily, minutely or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stderr: true,
            level: default_log_level(),
            directory: default_log_dir(),
            file_prefix: default_log_prefix(),
            rotation: default_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_prefix() -> String {
    "ragcompare.log".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", path))
        } else {
            Ok(Config::default())
        }
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SOLR_URL") {
            self.solr.url = url;
        }
        if let Some(host) = lookup("MILVUS_HOST") {
            self.milvus.host = host;
        }
        if let Some(port) = lookup("MILVUS_PORT") {
            self.milvus.port = port
                .parse()
                .with_context(|| format!("Invalid MILVUS_PORT: {}", port))?;
        }
        if let Some(collection) = lookup("MILVUS_COLLECTION") {
            self.milvus.collection = collection;
        }
        if let Some(enabled) = lookup("MILVUS_ENABLED") {
            self.milvus.enabled = parse_bool(&enabled)
                .with_context(|| format!("Invalid MILVUS_ENABLED: {}", enabled))?;
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.embeddings.model = model;
        }
        if let Some(host) = lookup("RAG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("RAG_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid RAG_PORT: {}", port))?;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}
