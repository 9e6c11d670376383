use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;

use crate::oracle::domain::similarity_oracle::SimilarityOracle;
use crate::shared::prepared_image::PreparedImage;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("no message content in chat completion response")]
    MissingContent,
}

/// Vision oracle backed by an OpenAI-compatible chat completion endpoint
/// (LM Studio, llama.cpp server, ...).
///
/// Each call sends one user message: the prompt, then the reference and the
/// candidate as `image_url` parts. The client timeout bounds every call.
pub struct ChatCompletionOracle {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
}

impl ChatCompletionOracle {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self, OracleError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(OracleError::Client)?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, prompt: &str, images: [&PreparedImage; 2]) -> Value {
        build_request_body(&self.model, prompt, images)
    }
}

fn build_request_body(model: &str, prompt: &str, images: [&PreparedImage; 2]) -> Value {
    let mut content = vec![json!({"type": "text", "text": prompt})];
    content.extend(images.iter().map(|img| {
        json!({
            "type": "image_url",
            "image_url": {"url": img.payload()},
        })
    }));

    json!({
        "model": model,
        "messages": [{"role": "user", "content": content}],
        "temperature": 0.0,
    })
}

fn message_content(response: &Value) -> Result<String, OracleError> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or(OracleError::MissingContent)
}

impl SimilarityOracle for ChatCompletionOracle {
    fn respond(
        &mut self,
        prompt: &str,
        images: [&PreparedImage; 2],
    ) -> Result<String, Box<dyn std::error::Error>> {
        let request_err = |e| OracleError::Request {
            endpoint: self.endpoint.clone(),
            source: e,
        };

        let body = self.request_body(prompt, images);
        let response: Value = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(request_err)?
            .json()
            .map_err(request_err)?;

        Ok(message_content(&response)?)
    }
}
