//! Cloud Firestore collection over the REST API.
//!
//! Only string fields are written or read. Values of any other Firestore type
//! are ignored on read, which the repository treats as a missing field.

use super::{CollectionError, CollectionFuture, Document, DocumentCollection, Fields};
use reqwest::{Client, IntoUrl, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Public REST root of Cloud Firestore
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Database id used when none is configured
pub const DEFAULT_DATABASE: &str = "(default)";

/// Documents requested per page when listing
const PAGE_SIZE: u32 = 300;

#[derive(Debug, Deserialize)]
struct WireDocument {
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

impl WireDocument {
    fn into_document(self) -> Result<Document, CollectionError> {
        let id = self
            .name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                CollectionError::Malformed(format!("document name {:?} has no id", self.name))
            })?
            .to_string();

        let fields = self
            .fields
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .get("stringValue")
                    .and_then(Value::as_str)
                    .map(|text| (key, text.to_string()))
            })
            .collect();

        Ok(Document { id, fields })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<WireDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Encode string fields as a Firestore document body
fn encode_fields(fields: &Fields) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| (key.clone(), json!({ "stringValue": value })))
        .collect();
    json!({ "fields": encoded })
}

/// Firestore-backed document collection
///
/// # Example
///
/// ```no_run
/// use tasklist::collection::{DocumentCollection, FirestoreCollection};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let collection = FirestoreCollection::new("my-project", "tasks")
///     .with_access_token(std::env::var("FIRESTORE_ACCESS_TOKEN")?);
///
/// for document in collection.list().await? {
///     println!("{}: {:?}", document.id, document.field("title"));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FirestoreCollection {
    client: Client,
    base_url: String,
    project_id: String,
    database: String,
    collection: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl FirestoreCollection {
    /// Create a collection handle in the project's default database
    #[must_use]
    pub fn new(project_id: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: project_id.into(),
            database: DEFAULT_DATABASE.to_string(),
            collection: collection.into(),
            api_key: None,
            access_token: None,
        }
    }

    /// Use another REST root (emulator, proxy, test server)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a named database instead of `(default)`
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Send `key=<api_key>` with every request
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Send `Authorization: Bearer <token>` with every request
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents/{}",
            self.base_url, self.project_id, self.database, self.collection
        )
    }

    /// URL of one document, with the id percent-encoded as a single path segment
    fn document_url(&self, id: &str) -> Result<Url, CollectionError> {
        if id.is_empty() || id.contains('/') {
            return Err(CollectionError::InvalidId(id.to_string()));
        }

        let mut url = Url::parse(&self.collection_url())
            .map_err(|e| CollectionError::Request(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| {
                CollectionError::Request(format!("{} cannot be a base URL", self.base_url))
            })?
            .push(id);
        Ok(url)
    }

    fn request(&self, method: Method, url: impl IntoUrl) -> RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Send a request and map error statuses; `subject` names what a 404 refers to
    async fn execute(
        &self,
        request: RequestBuilder,
        subject: &str,
    ) -> Result<Response, CollectionError> {
        let response = request
            .send()
            .await
            .map_err(|e| CollectionError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), %body, "Firestore request failed");

        Err(match status {
            StatusCode::NOT_FOUND => CollectionError::NotFound(subject.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                CollectionError::PermissionDenied(body)
            }
            StatusCode::SERVICE_UNAVAILABLE => CollectionError::Unavailable(body),
            status => CollectionError::Backend {
                status: status.as_u16(),
                message: body,
            },
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, CollectionError> {
        response
            .json::<T>()
            .await
            .map_err(|e| CollectionError::Malformed(e.to_string()))
    }
}

impl std::fmt::Debug for FirestoreCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreCollection")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl DocumentCollection for FirestoreCollection {
    fn name(&self) -> &str {
        &self.collection
    }

    fn insert(&self, fields: Fields) -> CollectionFuture<'_, String> {
        Box::pin(async move {
            let request = self
                .request(Method::POST, self.collection_url())
                .json(&encode_fields(&fields));
            let response = self.execute(request, &self.collection).await?;
            let document = Self::decode::<WireDocument>(response).await?.into_document()?;
            tracing::debug!(collection = %self.collection, id = %document.id, "Inserted document");
            Ok(document.id)
        })
    }

    fn list(&self) -> CollectionFuture<'_, Vec<Document>> {
        Box::pin(async move {
            let mut documents = Vec::new();
            let mut page_token: Option<String> = None;

            loop {
                let mut request = self
                    .request(Method::GET, self.collection_url())
                    .query(&[("pageSize", PAGE_SIZE.to_string())]);
                if let Some(token) = &page_token {
                    request = request.query(&[("pageToken", token)]);
                }

                let response = self.execute(request, &self.collection).await?;
                let page = Self::decode::<ListResponse>(response).await?;
                for document in page.documents {
                    match document.into_document() {
                        Ok(document) => documents.push(document),
                        Err(error) => tracing::warn!(
                            collection = %self.collection,
                            %error,
                            "Skipping unreadable document"
                        ),
                    }
                }

                match page.next_page_token {
                    Some(token) if !token.is_empty() => page_token = Some(token),
                    _ => break,
                }
            }

            tracing::debug!(
                collection = %self.collection,
                count = documents.len(),
                "Listed documents"
            );
            Ok(documents)
        })
    }

    fn delete(&self, id: String) -> CollectionFuture<'_, ()> {
        Box::pin(async move {
            let request = self.request(Method::DELETE, self.document_url(&id)?);
            self.execute(request, &id).await?;
            Ok(())
        })
    }

    fn update(&self, id: String, fields: Fields) -> CollectionFuture<'_, ()> {
        Box::pin(async move {
            let mut query: Vec<(&str, &str)> = fields
                .keys()
                .map(|key| ("updateMask.fieldPaths", key.as_str()))
                .collect();
            // Without a precondition PATCH would create the document
            query.push(("currentDocument.exists", "true"));

            let request = self
                .request(Method::PATCH, self.document_url(&id)?)
                .query(&query)
                .json(&encode_fields(&fields));
            self.execute(request, &id).await?;
            Ok(())
        })
    }
}
