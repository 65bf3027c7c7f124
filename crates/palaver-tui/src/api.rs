//! HTTP transport for the chatroom API.
//!
//! Maps [`ApiRequest`] values onto the server's endpoints. The session
//! cookie set by `/login` rides along automatically through the cookie
//! store; transport failures collapse into [`ApiError`] for the client
//! state machine to classify.

use std::{path::Path, time::Duration};

use palaver_proto::{
    ApiError, ApiRequest, ApiResponse, LoginRequest, PrivateExitRequest, PrivateSendRequest,
    SendRequest, UploadReply,
};
use serde::de::DeserializeOwned;

/// Per-request timeout. Long enough for a slow upload, short enough that a
/// dead server surfaces as a poll failure within one relax cycle.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client bound to one server base URL.
pub struct HttpApi {
    http: reqwest::Client,
    base: String,
}

impl HttpApi {
    /// Build a client for the given base URL (e.g. `http://host:8080`).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying TLS backend fails to initialize.
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, base: base_url.trim_end_matches('/').to_string() })
    }

    /// Execute one request against the server.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on non-success status, timeout, connection
    /// failure, or an undecodable body.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        match request {
            ApiRequest::Login { nickname, password } => {
                let body = LoginRequest { nickname, password };
                Ok(ApiResponse::Login(self.post_json("/login", &body).await?))
            },
            ApiRequest::Logout => {
                self.post_empty("/logout").await?;
                Ok(ApiResponse::Logout)
            },
            ApiRequest::Heartbeat => {
                self.post_empty("/heartbeat").await?;
                Ok(ApiResponse::Heartbeat)
            },
            ApiRequest::FetchMessages { count, version } => {
                let path = format!("/msg?k={count}&v={version}");
                Ok(ApiResponse::Messages(self.get_json(&path).await?))
            },
            ApiRequest::SendMessage { text } => {
                let body = SendRequest { msg: text };
                Ok(ApiResponse::Send(self.post_json("/send", &body).await?))
            },
            ApiRequest::Upload { paths } => Ok(ApiResponse::Upload(self.upload(&paths).await?)),
            ApiRequest::FetchPrivateChats => {
                Ok(ApiResponse::PrivateChats(self.get_json("/private/chats").await?))
            },
            ApiRequest::FetchPrivateMessages { chat_id } => {
                let path = format!("/private/messages/{chat_id}");
                let reply = self.get_json(&path).await?;
                Ok(ApiResponse::PrivateMessages { chat_id, reply })
            },
            ApiRequest::SendPrivateMessage { chat_id, text } => {
                let body = PrivateSendRequest { chat_id, message: text };
                Ok(ApiResponse::PrivateSend(self.post_json("/private/send", &body).await?))
            },
            ApiRequest::ExitPrivateChat { chat_id } => {
                let body = PrivateExitRequest { chat_id: chat_id.clone() };
                let reply = self.post_json("/private/exit", &body).await?;
                Ok(ApiResponse::PrivateExit { chat_id, reply })
            },
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.http.get(self.url(path)).send().await.map_err(map_transport)?;
        decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, ApiError> {
        let response =
            self.http.post(self.url(path)).json(body).send().await.map_err(map_transport)?;
        decode(response).await
    }

    /// Fire-and-forget POST; only the status matters.
    async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let response = self.http.post(self.url(path)).send().await.map_err(map_transport)?;
        check_status(&response)
    }

    /// Multipart `files[]` upload; paths are read here, off the state
    /// machines.
    async fn upload(&self, paths: &[String]) -> Result<UploadReply, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for path in paths {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|err| ApiError::Transport(format!("read {path}: {err}")))?;
            let name = Path::new(path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("file")
                .to_string();
            form = form.part("files[]", reqwest::multipart::Part::bytes(bytes).file_name(name));
        }
        let response =
            self.http.post(self.url("/upload")).multipart(form).send().await.map_err(map_transport)?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    check_status(&response)?;
    response.json().await.map_err(|err| ApiError::Decode(err.to_string()))
}

fn check_status(response: &reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() { Ok(()) } else { Err(ApiError::Status(status.as_u16())) }
}

fn map_transport(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Transport(err.to_string())
    }
}
