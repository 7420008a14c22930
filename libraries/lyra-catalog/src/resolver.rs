//! Reference graph resolver
//!
//! Turns a stored document into a reference-free JSON aggregate following a
//! [`Shape`]. Sibling references resolve concurrently and are joined before
//! the aggregate is returned; array references keep their stored order.
//!
//! A reference whose target does not exist becomes `null` (the absent
//! marker). Backend failures propagate. References the shape does not name
//! are rendered as the plain target id.

use futures::future::{try_join_all, BoxFuture, FutureExt};
use lyra_core::types::{fields_to_json, DocRef, Document};
use lyra_core::{DocumentStore, LyraError, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};

/// Which fields of a document are references, and how to resolve their targets
///
/// Depth is fixed by construction, so resolution always terminates.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    refs: Vec<(&'static str, Node)>,
}

#[derive(Debug, Clone)]
enum Node {
    /// Field holds one reference
    Single(Shape),
    /// Field holds an array of references
    Many(Shape),
}

impl Shape {
    /// Resolve nothing below this level
    pub fn leaf() -> Self {
        Self::default()
    }

    /// `field` holds a single reference whose target is resolved with `target`
    #[must_use]
    pub fn single(mut self, field: &'static str, target: Shape) -> Self {
        self.refs.push((field, Node::Single(target)));
        self
    }

    /// `field` holds an ordered array of references
    #[must_use]
    pub fn many(mut self, field: &'static str, target: Shape) -> Self {
        self.refs.push((field, Node::Many(target)));
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.refs.is_empty()
    }
}

/// Resolves documents against a [`DocumentStore`]
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Resolve `doc` into `{id, ...fields}` following `shape`
    pub async fn resolve(&self, doc: &Document, shape: &Shape) -> Result<Json> {
        self.resolve_document(doc, shape).await
    }

    /// Fetch and resolve the target of `doc_ref`; `None` when it does not exist
    pub async fn resolve_ref(&self, doc_ref: &DocRef, shape: &Shape) -> Result<Option<Json>> {
        self.resolve_target(doc_ref, shape).await
    }

    /// Resolve every document concurrently, keeping their order
    pub async fn resolve_all(&self, docs: &[Document], shape: &Shape) -> Result<Vec<Json>> {
        try_join_all(docs.iter().map(|doc| self.resolve_document(doc, shape))).await
    }

    /// Resolve and decode into a typed entity
    pub async fn resolve_as<T: DeserializeOwned>(&self, doc: &Document, shape: &Shape) -> Result<T> {
        let json = self.resolve_document(doc, shape).await?;
        decode(&doc.doc_ref, json)
    }

    /// Resolve and decode a result set
    pub async fn resolve_all_as<T: DeserializeOwned>(
        &self,
        docs: &[Document],
        shape: &Shape,
    ) -> Result<Vec<T>> {
        try_join_all(docs.iter().map(|doc| self.resolve_as(doc, shape))).await
    }

    fn resolve_document<'s>(
        &'s self,
        doc: &'s Document,
        shape: &'s Shape,
    ) -> BoxFuture<'s, Result<Json>> {
        async move {
            let mut object: Map<String, Json> = fields_to_json(&doc.fields);
            object.insert("id".to_string(), Json::String(doc.id().to_string()));

            let resolved = try_join_all(shape.refs.iter().map(|(field, node)| async move {
                let value = match node {
                    Node::Single(target) => match doc.get_ref(field) {
                        Some(doc_ref) => self
                            .resolve_target(doc_ref, target)
                            .await?
                            .unwrap_or(Json::Null),
                        None => Json::Null,
                    },
                    Node::Many(target) => {
                        let items = try_join_all(
                            doc.get_refs(field)
                                .into_iter()
                                .map(|doc_ref| self.resolve_target(doc_ref, target)),
                        )
                        .await?;
                        Json::Array(
                            items
                                .into_iter()
                                .map(|item| item.unwrap_or(Json::Null))
                                .collect(),
                        )
                    }
                };
                Ok::<_, LyraError>((*field, value))
            }))
            .await?;

            for (field, value) in resolved {
                object.insert(field.to_string(), value);
            }
            Ok(Json::Object(object))
        }
        .boxed()
    }

    fn resolve_target<'s>(
        &'s self,
        doc_ref: &'s DocRef,
        shape: &'s Shape,
    ) -> BoxFuture<'s, Result<Option<Json>>> {
        async move {
            match self.store.fetch_document(doc_ref).await? {
                Some(target) => Ok(Some(self.resolve_document(&target, shape).await?)),
                None => {
                    tracing::debug!(doc = %doc_ref, "Reference target missing");
                    Ok(None)
                }
            }
        }
        .boxed()
    }
}

/// Decode an aggregate into a typed entity
pub fn decode<T: DeserializeOwned>(doc_ref: &DocRef, json: Json) -> Result<T> {
    serde_json::from_value(json).map_err(|e| LyraError::malformed(doc_ref, e.to_string()))
}

/// Decode a stored document without resolving anything
pub fn decode_plain<T: DeserializeOwned>(doc: &Document) -> Result<T> {
    decode(&doc.doc_ref, doc.to_json())
}
