//! An agent service backed by OCI Generative AI Agents.
//!
//! Requests are signed with the API key (or session token) configured in
//! the OCI config file. Agent and tool management go to the management
//! host, sessions and chat go to the runtime host.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod config;
mod profile;
mod signer;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use bytes::Bytes;
use mime::Mime;
use reqwest::{Client, Method, RequestBuilder, Response, Url, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use taxagent_model::{
    AgentEndpoint, AgentService, AgentServiceError, ChatDetails, ChatResult,
    Collection, CreateSessionDetails, CreateToolDetails, ErrorKind,
    RemoteAgent, RemoteTool, Session, UpdateAgentDetails, UpdateToolDetails,
};

pub use config::{AuthType, ConfigError, OciConfig, OciConfigBuilder};
use signer::{JSON_CONTENT_TYPE, RequestSigner, http_date_now};

const API_VERSION: &str = "20240531";
const REQUEST_ID_HEADER: &str = "opc-request-id";
const NEXT_PAGE_HEADER: &str = "opc-next-page";

/// Error type for [`OciAgentService`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl AgentServiceError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Error body returned by the service.
#[derive(serde::Deserialize)]
struct ServiceErrorBody {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug)]
struct Inner {
    client: Client,
    signer: RequestSigner,
    management_endpoint: Url,
    runtime_endpoint: Url,
}

/// Agent service talking to OCI over HTTPS.
#[derive(Clone, Debug)]
pub struct OciAgentService {
    inner: Arc<Inner>,
}

impl OciAgentService {
    /// Creates a new `OciAgentService` with the given configuration.
    #[inline]
    pub fn new(config: OciConfig) -> Self {
        let OciConfig {
            key_id,
            private_key,
            region: _,
            management_endpoint,
            runtime_endpoint,
        } = config;
        Self {
            inner: Arc::new(Inner {
                client: Client::new(),
                signer: RequestSigner::new(key_id, private_key),
                management_endpoint,
                runtime_endpoint,
            }),
        }
    }

    fn management_url(&self, segments: &[&str]) -> Url {
        api_url(&self.inner.management_endpoint, segments)
    }

    fn runtime_url(&self, segments: &[&str]) -> Url {
        api_url(&self.inner.runtime_endpoint, segments)
    }
}

impl Inner {
    fn prepare(
        &self,
        method: Method,
        url: Url,
        body: Option<Bytes>,
    ) -> RequestBuilder {
        let signed = self.signer.sign(
            &method,
            &url,
            body.as_deref(),
            &http_date_now(),
        );
        trace!(%method, %url, "signed request");

        let mut builder = self
            .client
            .request(method, url)
            .header(header::DATE, signed.date)
            .header(header::AUTHORIZATION, signed.authorization)
            .header(header::ACCEPT, JSON_CONTENT_TYPE);
        if let Some(digest) = signed.content_sha256 {
            builder = builder
                .header("x-content-sha256", digest)
                .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }
        builder
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Bytes>,
    ) -> Result<Response, Error> {
        debug!(%method, path = url.path(), "sending request");
        let resp = self
            .prepare(method, url, body)
            .send()
            .await
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
        check_status(resp).await
    }
}

impl AgentService for OciAgentService {
    type Error = Error;

    fn get_agent_endpoint(
        &self,
        endpoint_id: &str,
    ) -> impl Future<Output = Result<AgentEndpoint, Self::Error>> + Send + 'static
    {
        let url = self.management_url(&["agentEndpoints", endpoint_id]);
        fetch(Arc::clone(&self.inner), Method::GET, url, Ok(None))
    }

    fn get_agent(
        &self,
        agent_id: &str,
    ) -> impl Future<Output = Result<RemoteAgent, Self::Error>> + Send + 'static
    {
        let url = self.management_url(&["agents", agent_id]);
        fetch(Arc::clone(&self.inner), Method::GET, url, Ok(None))
    }

    fn update_agent(
        &self,
        agent_id: &str,
        details: &UpdateAgentDetails,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        let url = self.management_url(&["agents", agent_id]);
        execute(Arc::clone(&self.inner), Method::PUT, url, encode_body(details))
    }

    fn list_tools(
        &self,
        agent_id: &str,
        compartment_id: &str,
    ) -> impl Future<Output = Result<Vec<RemoteTool>, Self::Error>> + Send + 'static
    {
        let mut url = self.management_url(&["tools"]);
        url.query_pairs_mut()
            .append_pair("agentId", agent_id)
            .append_pair("compartmentId", compartment_id);
        let inner = Arc::clone(&self.inner);

        async move {
            let mut tools = Vec::new();
            let mut page: Option<String> = None;
            loop {
                let mut page_url = url.clone();
                if let Some(page) = &page {
                    page_url.query_pairs_mut().append_pair("page", page);
                }
                let resp = inner.send(Method::GET, page_url, None).await?;
                let next_page = resp
                    .headers()
                    .get(NEXT_PAGE_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .map(ToOwned::to_owned);
                let collection: Collection<RemoteTool> =
                    decode_json(resp).await?;
                tools.extend(collection.items);

                match next_page {
                    Some(next) if !next.is_empty() => page = Some(next),
                    _ => break,
                }
            }
            Ok(tools)
        }
    }

    fn get_tool(
        &self,
        tool_id: &str,
    ) -> impl Future<Output = Result<RemoteTool, Self::Error>> + Send + 'static
    {
        let url = self.management_url(&["tools", tool_id]);
        fetch(Arc::clone(&self.inner), Method::GET, url, Ok(None))
    }

    fn create_tool(
        &self,
        details: &CreateToolDetails,
    ) -> impl Future<Output = Result<RemoteTool, Self::Error>> + Send + 'static
    {
        let url = self.management_url(&["tools"]);
        fetch(Arc::clone(&self.inner), Method::POST, url, encode_body(details))
    }

    fn update_tool(
        &self,
        tool_id: &str,
        details: &UpdateToolDetails,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        let url = self.management_url(&["tools", tool_id]);
        execute(Arc::clone(&self.inner), Method::PUT, url, encode_body(details))
    }

    fn delete_tool(
        &self,
        tool_id: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        let url = self.management_url(&["tools", tool_id]);
        execute(Arc::clone(&self.inner), Method::DELETE, url, Ok(None))
    }

    fn create_session(
        &self,
        endpoint_id: &str,
        details: &CreateSessionDetails,
    ) -> impl Future<Output = Result<Session, Self::Error>> + Send + 'static {
        let url = self.runtime_url(&["agentEndpoints", endpoint_id, "sessions"]);
        fetch(Arc::clone(&self.inner), Method::POST, url, encode_body(details))
    }

    fn chat(
        &self,
        endpoint_id: &str,
        details: &ChatDetails,
    ) -> impl Future<Output = Result<ChatResult, Self::Error>> + Send + 'static
    {
        let url = self.runtime_url(&[
            "agentEndpoints",
            endpoint_id,
            "actions",
            "chat",
        ]);
        fetch(Arc::clone(&self.inner), Method::POST, url, encode_body(details))
    }
}

/// Sends a request and decodes the JSON response.
async fn fetch<T: DeserializeOwned + Send + 'static>(
    inner: Arc<Inner>,
    method: Method,
    url: Url,
    body: Result<Option<Bytes>, Error>,
) -> Result<T, Error> {
    let resp = inner.send(method, url, body?).await?;
    decode_json(resp).await
}

/// Sends a request and discards the response body.
async fn execute(
    inner: Arc<Inner>,
    method: Method,
    url: Url,
    body: Result<Option<Bytes>, Error>,
) -> Result<(), Error> {
    inner.send(method, url, body?).await?;
    Ok(())
}

/// Appends the API version and `segments` to `base`. Segments are
/// percent-encoded, so identifiers can't escape their position.
fn api_url(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    // Endpoints are validated to be base URLs when the config is built.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().push(API_VERSION).extend(segments);
    }
    url
}

fn encode_body<T: Serialize>(value: &T) -> Result<Option<Bytes>, Error> {
    serde_json::to_vec(value)
        .map(|body| Some(Bytes::from(body)))
        .map_err(|err| {
            Error::new(
                format!("failed to encode request: {err}"),
                ErrorKind::InvalidRequest,
            )
        })
}

async fn check_status(resp: Response) -> Result<Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let request_id = resp
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("<none>")
        .to_owned();
    let body = resp.bytes().await.unwrap_or_default();
    let message = describe_failure(status.as_u16(), &body, &request_id);
    warn!("{message}");
    Err(Error::new(message, ErrorKind::from_status(status.as_u16())))
}

fn describe_failure(status: u16, body: &[u8], request_id: &str) -> String {
    match serde_json::from_slice::<ServiceErrorBody>(body) {
        Ok(ServiceErrorBody { code, message }) => format!(
            "service returned {status} {}: {} (opc-request-id: {request_id})",
            code.as_deref().unwrap_or("Unknown"),
            message.as_deref().unwrap_or("no message"),
        ),
        Err(_) => format!(
            "service returned {status}: {} (opc-request-id: {request_id})",
            String::from_utf8_lossy(body).trim(),
        ),
    }
}

async fn decode_json<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    let is_json = content_type
        .as_deref()
        .and_then(|v| v.parse().ok())
        .map(|m: Mime| m.subtype() == mime::JSON)
        .unwrap_or(false);
    if !is_json {
        return Err(Error::new(
            format!("Unexpected content type: {content_type:?}"),
            ErrorKind::Other,
        ));
    }

    let body = resp
        .bytes()
        .await
        .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
    serde_json::from_slice(&body).map_err(|err| {
        Error::new(format!("failed to decode response: {err}"), ErrorKind::Other)
    })
}
