//! Models shared by unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::{AutoRetriever, Model, RepositoryBacked};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct A {
    pub id: Option<u32>,
    pub foo: Option<String>,
}

impl Model for A {
    type Id = u32;

    fn identifier(&self) -> Option<&u32> {
        self.id.as_ref()
    }
}

impl RepositoryBacked for A {
    const REPOSITORY_NAME: &'static str = "A";
}

/// Holds an `A` by reference.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct B {
    pub id: Option<u32>,
    #[serde(with = "crate::reference")]
    pub a: Arc<A>,
}

impl Model for B {
    type Id = u32;

    fn identifier(&self) -> Option<&u32> {
        self.id.as_ref()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Editor {
    pub id: Option<u32>,
    pub name: Option<String>,
}

impl Model for Editor {
    type Id = u32;

    fn identifier(&self) -> Option<&u32> {
        self.id.as_ref()
    }
}

impl RepositoryBacked for Editor {
    const REPOSITORY_NAME: &'static str = "Editor";
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
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

/// Auto-retrieve calls per identifier, so tests can use unique identifiers.
pub static AUTO_RETRIEVALS: Lazy<DashMap<String, usize>> = Lazy::new(DashMap::new);

pub fn auto_retrievals(identifier: &str) -> usize {
    AUTO_RETRIEVALS.get(identifier).map(|count| *count).unwrap_or(0)
}

#[async_trait]
impl AutoRetriever<Author> for Author {
    async fn auto_retrieve(&self, identifier: String) -> anyhow::Result<Author> {
        *AUTO_RETRIEVALS.entry(identifier.clone()).or_insert(0) += 1;

        Ok(Author {
            name: Some("autoretrieved".into()),
            first_name: Some("autoretrieved".into()),
            email: Some(identifier),
        })
    }
}

/// Holds several authors by reference.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Article {
    pub id: Option<u32>,
    pub title: Option<String>,
    #[serde(with = "crate::reference::vec", default)]
    pub authors: Vec<Arc<Author>>,
    #[serde(with = "crate::reference::option", default)]
    pub reviewer: Option<Arc<Author>>,
}

impl Model for Article {
    type Id = u32;

    fn identifier(&self) -> Option<&u32> {
        self.id.as_ref()
    }
}

/// Only ever registered in the global registry.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalNote {
    pub id: Option<String>,
    pub text: Option<String>,
}

impl Model for GlobalNote {
    type Id = String;

    fn identifier(&self) -> Option<&String> {
        self.id.as_ref()
    }
}

impl RepositoryBacked for GlobalNote {
    const REPOSITORY_NAME: &'static str = "GlobalNote";
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(with = "crate::reference")]
    pub note: Arc<GlobalNote>,
}
