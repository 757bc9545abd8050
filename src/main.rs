//! Model Repository demo
//!
//! Deserializes two articles sharing an author, then resolves authors by
//! email through the lookup fallbacks.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use model_repository::{AutoRetriever, Model, ModelRegistry, RegistryConfig, RepositoryBacked};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Author {
    name: Option<String>,
    first_name: Option<String>,
    email: Option<String>,
}

impl Model for Author {
    type Id = String;

    fn identifier(&self) -> Option<&String> {
        self.email.as_ref()
    }
}

impl RepositoryBacked for Author {
    const REPOSITORY_NAME: &'static str = "Author";

    fn as_auto_retriever(&self) -> Option<&dyn AutoRetriever<Self>> {
        Some(self)
    }
}

#[async_trait]
impl AutoRetriever<Author> for Author {
    async fn auto_retrieve(&self, email: String) -> anyhow::Result<Author> {
        // Placeholder until the real profile is loaded
        Ok(Author {
            name: None,
            first_name: None,
            email: Some(email),
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Article {
    id: Option<u64>,
    title: Option<String>,
    #[serde(with = "model_repository::reference::vec", default)]
    authors: Vec<Arc<Author>>,
}

impl Model for Article {
    type Id = u64;

    fn identifier(&self) -> Option<&u64> {
        self.id.as_ref()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crates
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("model_repository=info,model_repository_demo=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = RegistryConfig::from_env();
    info!("Configuration loaded: {:?}", config);

    let registry = ModelRegistry::with_config(config);

    let (first, second): (Article, Article) = registry.in_scope(|| -> anyhow::Result<_> {
        let first = serde_json::from_value(json!({
            "id": 1,
            "title": "Identity maps",
            "authors": [{ "name": "Doe", "firstName": "Jane", "email": "jane@example.com" }],
        }))?;
        let second = serde_json::from_value(json!({
            "id": 2,
            "title": "Shared references",
            "authors": [{ "name": "Doe-Smith", "firstName": "Jane", "email": "jane@example.com" }],
        }))?;
        Ok((first, second))
    })?;

    info!(
        "Articles {:?} and {:?} share their author: {}",
        first.title,
        second.title,
        Arc::ptr_eq(&first.authors[0], &second.authors[0])
    );
    info!("Shared author: {}", serde_json::to_string(second.authors[0].as_ref())?);

    let jane = registry.find::<Author>("jane@example.com".to_string()).await?;
    info!("Cached lookup: {:?}", jane);

    let john = registry
        .find_with::<Author, _, _>("john@example.com".to_string(), |email| async move {
            Ok(Some(Author {
                name: Some("Doe".into()),
                first_name: Some("John".into()),
                email: Some(email),
            }))
        })
        .await?;
    info!("Retrieved lookup: {:?}", john);

    let unknown = registry.find::<Author>("unknown@example.com".to_string()).await?;
    info!("Auto-retrieved lookup: {:?}", unknown);

    info!("Registry state: {:?}", registry);

    Ok(())
}
