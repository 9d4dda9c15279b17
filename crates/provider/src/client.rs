//! Provider adapter for the Files and Threads/Runs endpoints.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::{json, Value};

use lg_domain::config::ProviderConfig;
use lg_domain::{Error, Result};

use crate::schemas;
use crate::util::{from_reqwest, truncate_body};

/// Text of the single user message seeded into every new thread. The
/// uploaded files ride along as attachments.
const ATTACHMENT_PROMPT: &str = "Please review the attached spreadsheets. Follow the run \
     instructions to generate the required financial summaries.";

/// Instructions sent when the caller supplies none (after trimming).
const DEFAULT_RUN_INSTRUCTIONS: &str = "Read the uploaded spreadsheets and produce the structured JSON \
     outputs defined by the schema.";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Thin client over the provider's HTTP API.
///
/// The credential is resolved once at construction but checked per
/// call, so a server booted without one starts fine and fails each
/// upload/run request with a configuration error before any network
/// I/O is attempted.
pub struct ProviderClient {
    base_url: String,
    api_key: Option<String>,
    assistant_id: Option<String>,
    beta_header: String,
    http: reqwest::Client,
}

impl ProviderClient {
    /// Build a client from the provider section of the config.
    pub fn from_config(cfg: &ProviderConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("building HTTP client: {e}")))?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key: cfg.resolve_api_key(),
            assistant_id: cfg.resolve_assistant_id(),
            beta_header: cfg.beta_header.clone(),
            http,
        })
    }

    fn credential(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::Config("API credential is not configured".into()))
    }

    /// The assistant id this deployment runs against, or a
    /// configuration error when none is set.
    pub fn assistant_id(&self) -> Result<&str> {
        self.assistant_id
            .as_deref()
            .ok_or_else(|| Error::Config("assistant id is not configured".into()))
    }

    fn authed_post(&self, url: &str) -> Result<reqwest::RequestBuilder> {
        let key = self.credential()?;
        Ok(self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {key}"))
            .header("OpenAI-Beta", &self.beta_header))
    }

    // ── Files ─────────────────────────────────────────────────────

    /// Multipart POST to `/files` with `purpose=assistants`.
    pub async fn upload_file(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<FileObject> {
        let url = format!("{}/files", self.base_url);
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_owned())
            .mime_str(content_type)
            .map_err(|e| Error::Config(format!("content type '{content_type}': {e}")))?;
        let form = reqwest::multipart::Form::new()
            .text("purpose", "assistants")
            .part("file", part);

        tracing::info!(filename = %filename, "uploading file to provider");
        let payload = self
            .execute(self.authed_post(&url)?.multipart(form), "files")
            .await?;

        let id = required_id(&payload, "files response did not include a file id")?;
        Ok(FileObject {
            id,
            filename: payload
                .get("filename")
                .and_then(Value::as_str)
                .map(String::from),
        })
    }

    // ── Threads ───────────────────────────────────────────────────

    /// Create a thread seeded with one user message carrying the given
    /// file ids as attachments, in caller order.
    pub async fn create_thread(&self, file_ids: &[String]) -> Result<ThreadObject> {
        let url = format!("{}/threads", self.base_url);
        let body = build_thread_body(file_ids);

        tracing::info!(attachments = file_ids.len(), "creating provider thread");
        let payload = self
            .execute(self.authed_post(&url)?.json(&body), "threads")
            .await?;

        let id = required_id(&payload, "threads response did not include a thread id")?;
        Ok(ThreadObject { id })
    }

    // ── Runs ──────────────────────────────────────────────────────

    /// Create a run on an existing thread against the configured
    /// assistant.
    pub async fn create_run(&self, thread_id: &str, opts: &RunOptions) -> Result<RunObject> {
        let assistant_id = self.assistant_id()?;
        let url = format!("{}/threads/{}/runs", self.base_url, thread_id);
        let body = build_run_body(assistant_id, opts);

        tracing::info!(thread_id = %thread_id, schema_profile = %opts.schema_profile, "creating provider run");
        let payload = self
            .execute(self.authed_post(&url)?.json(&body), "runs")
            .await?;

        parse_run_object(&payload)
    }

    // ── Transport ─────────────────────────────────────────────────

    /// Send a request and decode the response under the shared error
    /// taxonomy: non-2xx carries the status and a clipped body,
    /// network failures split into timeout vs. connectivity.
    async fn execute(&self, req: reqwest::RequestBuilder, endpoint: &str) -> Result<Value> {
        let resp = req.send().await.map_err(|e| {
            let err = from_reqwest(e);
            tracing::error!(endpoint, error = %err, "provider unreachable");
            err
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            let body = truncate_body(&text);
            tracing::error!(endpoint, status = status.as_u16(), body = %body, "provider call failed");
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request/response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Caller-facing options for a run creation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Requested structured-output profile. Unrecognized names simply
    /// produce a run without a `response_format` constraint.
    pub schema_profile: String,
    /// Free-text instructions; blank input falls back to the fixed
    /// default.
    pub instructions: String,
    /// Opaque key/value pairs stored with the run on the provider
    /// side. Omitted from the wire body when empty.
    pub metadata: BTreeMap<String, String>,
}

/// Normalized `/files` response.
#[derive(Debug, Clone)]
pub struct FileObject {
    pub id: String,
    /// Filename as echoed by the provider, when present.
    pub filename: Option<String>,
}

/// Normalized `/threads` response.
#[derive(Debug, Clone)]
pub struct ThreadObject {
    pub id: String,
}

/// Normalized run-creation response.
#[derive(Debug, Clone)]
pub struct RunObject {
    pub id: String,
    /// Provider-reported status; `"queued"` when the field is absent.
    pub status: String,
    /// Unix epoch seconds, when the provider reported a numeric value.
    pub created_at: Option<i64>,
    pub dashboard_url: Option<String>,
    /// Assistant id echoed by the provider.
    pub assistant_id: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Body builders & response parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn build_thread_body(file_ids: &[String]) -> Value {
    let attachments: Vec<Value> = file_ids
        .iter()
        .map(|file_id| json!({ "file_id": file_id }))
        .collect();

    json!({
        "messages": [{
            "role": "user",
            "content": [{ "type": "text", "text": ATTACHMENT_PROMPT }],
            "attachments": attachments,
        }]
    })
}

fn build_run_body(assistant_id: &str, opts: &RunOptions) -> Value {
    let mut body = json!({ "assistant_id": assistant_id });

    if !opts.metadata.is_empty() {
        body["metadata"] = json!(opts.metadata);
    }
    if let Some(format) = schemas::response_format(&opts.schema_profile) {
        body["response_format"] = format;
    }

    let instructions = opts.instructions.trim();
    body["instructions"] = if instructions.is_empty() {
        Value::String(DEFAULT_RUN_INSTRUCTIONS.into())
    } else {
        Value::String(instructions.into())
    };

    body
}

fn parse_run_object(payload: &Value) -> Result<RunObject> {
    let id = required_id(payload, "runs response did not include a run id")?;

    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("queued")
        .to_owned();

    // Accept integer or float epochs; anything else means "no
    // usable timestamp" and the caller stamps the current time.
    let created_at = payload.get("created_at").and_then(|v| {
        v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))
    });

    Ok(RunObject {
        id,
        status,
        created_at,
        dashboard_url: payload
            .get("dashboard_url")
            .and_then(Value::as_str)
            .map(String::from),
        assistant_id: payload
            .get("assistant_id")
            .and_then(Value::as_str)
            .map(String::from),
    })
}

fn required_id(payload: &Value, missing_message: &str) -> Result<String> {
    payload
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .ok_or_else(|| Error::Protocol(missing_message.into()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
