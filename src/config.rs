use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub openai: OpenAIConfig,
    pub chroma: ChromaConfig,
    pub dataset: DatasetConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChromaConfig {
    pub url: String,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub path: String,
    pub batch_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3001".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            openai: OpenAIConfig {
                api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                embedding_model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "text-embedding-ada-002".to_string()),
                chat_model: env::var("CHAT_MODEL")
                    .unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            },
            chroma: ChromaConfig {
                url: env::var("CHROMA_URL")
                    .unwrap_or_else(|_| "http://localhost:8000".to_string()),
                collection: env::var("CHROMA_COLLECTION")
                    .unwrap_or_else(|_| "space_events".to_string()),
            },
            dataset: DatasetConfig {
                path: env::var("DATASET_PATH")
                    .unwrap_or_else(|_| "dataset/dataset.csv".to_string()),
                batch_size: env::var("INGEST_BATCH_SIZE")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
            },
        })
    }
}
