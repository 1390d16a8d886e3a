use super::advisor::{Advisor, AdvisoryError, AdvisoryRequest};
use async_trait::async_trait;

#[derive(serde::Serialize)]
struct GuidanceBody<'a> {
    #[serde(flatten)]
    request: &'a AdvisoryRequest,
    prompt: String,
}

#[derive(serde::Deserialize)]
struct GuidanceReply {
    #[serde(default)]
    text: String,
}

/// Advisory collaborator reached over HTTP.
///
/// Requests are `POST`ed as JSON to `<base_url>/guidance`; the service answers with
/// `{"text": "..."}`.
#[derive(Debug)]
pub struct HttpAdvisor {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAdvisor {
    const CLIENT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

    /// Builds a client with a fixed request timeout of 5 seconds.
    ///
    /// # Arguments
    /// * `base_url` – Root URL of the advisory service, e.g. `"http://localhost:8000"`.
    pub fn new(base_url: &str) -> Result<Self, AdvisoryError> {
        let client = reqwest::Client::builder().timeout(Self::CLIENT_TIMEOUT).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn url(&self) -> &str { self.base_url.as_str() }
}

#[async_trait]
impl Advisor for HttpAdvisor {
    async fn guidance(&self, request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
        let body = GuidanceBody { request, prompt: request.summary() };
        let response = self.client.post(format!("{}/guidance", self.base_url)).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdvisoryError::BadResponse { reason: format!("status {status}") });
        }
        Ok(response.json::<GuidanceReply>().await?.text)
    }
}
