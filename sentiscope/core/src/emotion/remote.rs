use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{ClassifierError, EmotionClassifier, EmotionDistribution};

const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScoresPayload {
    Batched(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// Client for a text-classification endpoint that returns every label's
/// score (Hugging Face inference style).
#[derive(Debug, Clone)]
pub struct HttpEmotionClassifier {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpEmotionClassifier {
    /// Creates a client for `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClassifierError> {
        let client = Client::builder().user_agent("sentiscope/0.1").build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: None,
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Interprets a response body of `[[{label, score}…]]` or `[{label, score}…]`.
pub fn parse_scores(body: &str) -> Result<EmotionDistribution, ClassifierError> {
    let payload: ScoresPayload = serde_json::from_str(body)
        .map_err(|err| ClassifierError::InvalidResponse(err.to_string()))?;
    let scores = match payload {
        ScoresPayload::Batched(batches) => batches.into_iter().next().ok_or_else(|| {
            ClassifierError::InvalidResponse("empty batch in response".into())
        })?,
        ScoresPayload::Flat(scores) => scores,
    };
    Ok(EmotionDistribution::new(
        scores.into_iter().map(|entry| (entry.label, entry.score)),
    )?)
}

#[async_trait]
impl EmotionClassifier for HttpEmotionClassifier {
    async fn classify(&self, sentence: &str) -> Result<EmotionDistribution, ClassifierError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "inputs": sentence, "options": { "wait_for_model": true } }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|idx| body.is_char_boundary(*idx))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_scores(&body)
    }

    fn name(&self) -> &str {
        "http"
    }
}
