use async_trait::async_trait;
use notes_shared::{
    api::{CreateDocumentRequest, DeleteDocumentResponse, UpdateDocumentRequest},
    Document, DocumentId,
};
use notes_sync::{Transport, TransportError};
use reqwest::{Client, Method, RequestBuilder, StatusCode};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Resource not found")]
    NotFound,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl From<ApiError> for TransportError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::NotFound => TransportError::NotFound,
            ApiError::Validation(msg) => TransportError::Validation(msg),
            ApiError::Server(msg) => TransportError::Server(msg),
            ApiError::Network(e) => TransportError::Network(e.to_string()),
        }
    }
}

/// HTTP client for the documents API.
pub struct ApiClient {
    client: Client,
    base_url: String,
    username: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, username: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
        }
    }

    /// Build URL for endpoint
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request, adding the user header if configured
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.client.request(method, self.url(path));
        match &self.username {
            Some(username) => request.header("x-username", username),
            None => request,
        }
    }

    /// Handle API response
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::CREATED => {
                response.json().await.map_err(ApiError::Network)
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let text = response.text().await.unwrap_or_default();
                Err(ApiError::Validation(text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ApiError::Server(format!("{}: {}", status, text)))
            }
        }
    }

    // ============ Documents ============

    pub async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        let response = self.request(Method::GET, "/documents").send().await?;
        self.handle_response(response).await
    }

    pub async fn get_document(&self, id: DocumentId) -> Result<Document, ApiError> {
        let response = self
            .request(Method::GET, &format!("/documents/{}", id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn create_document(&self, req: &CreateDocumentRequest) -> Result<Document, ApiError> {
        let response = self
            .request(Method::POST, "/documents")
            .json(req)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn update_document(
        &self,
        id: DocumentId,
        req: &UpdateDocumentRequest,
    ) -> Result<Document, ApiError> {
        let response = self
            .request(Method::PUT, &format!("/documents/{}", id))
            .json(req)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn delete_document(&self, id: DocumentId) -> Result<DeleteDocumentResponse, ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/documents/{}", id))
            .send()
            .await?;
        self.handle_response(response).await
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn fetch_document_tree(&self) -> Result<Vec<Document>, TransportError> {
        Ok(self.list_documents().await?)
    }

    async fn fetch_document(&self, id: DocumentId) -> Result<Document, TransportError> {
        Ok(self.get_document(id).await?)
    }

    async fn create_document(&self, parent: Option<DocumentId>) -> Result<Document, TransportError> {
        let req = CreateDocumentRequest {
            title: String::new(),
            parent,
        };
        Ok(ApiClient::create_document(self, &req).await?)
    }

    async fn update_document(
        &self,
        id: DocumentId,
        update: &UpdateDocumentRequest,
    ) -> Result<Document, TransportError> {
        Ok(ApiClient::update_document(self, id, update).await?)
    }

    async fn delete_document(&self, id: DocumentId) -> Result<Option<DocumentId>, TransportError> {
        let res = ApiClient::delete_document(self, id).await?;
        Ok(res.parent_id())
    }
}
