pub mod groq;
pub mod openai;
pub mod types;
pub mod unified;

pub use groq::GroqProvider;
pub use openai::OpenAiProvider;
pub use types::{ChatResponse, CompletionRequest, LlmError, LlmProvider, Role, Turn};
pub use unified::Provider;

use reqwest::StatusCode;
use serde_json::Value;

pub(crate) fn build_llm_http_client(proxy: Option<&str>) -> Result<reqwest::Client, LlmError> {
    let mut builder = reqwest::Client::builder();

    if let Some(raw) = proxy {
        let t = raw.trim();
        if !t.is_empty() {
            let url = if t.contains("://") {
                t.to_string()
            } else {
                format!("socks5h://{}", t)
            };
            let proxy = reqwest::Proxy::all(&url).map_err(|e| LlmError::Http(e.to_string()))?;
            builder = builder.proxy(proxy);
        }
    }

    builder.build().map_err(|e| LlmError::Http(e.to_string()))
}

/// Shared `POST {base_url}/chat/completions` used by both providers.
pub(crate) async fn post_chat_completion(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    req: &CompletionRequest,
) -> Result<ChatResponse, LlmError> {
    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));

    let resp = client
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .json(req)
        .send()
        .await
        .map_err(|e| LlmError::Http(e.to_string()))?;

    match resp.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(LlmError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => return Err(LlmError::RateLimited),
        _ => {}
    }

    let status = resp.status();
    let raw = resp
        .text()
        .await
        .map_err(|e| LlmError::Http(e.to_string()))?;

    if !status.is_success() {
        return Err(LlmError::Http(format!("{} {}", status.as_u16(), raw)));
    }

    let text = extract_reply_text(&raw)?;
    Ok(ChatResponse {
        text,
        raw: Some(raw),
    })
}

/// Pulls the reply out of `choices[0]`.
///
/// `message.content` may be a string, an array of content parts, or null. Null or missing
/// content (e.g. a refusal) yields an empty string; a missing `choices[0]` is malformed.
pub(crate) fn extract_reply_text(raw: &str) -> Result<String, LlmError> {
    let v: Value = serde_json::from_str(raw)
        .map_err(|e| LlmError::InvalidResponse(format!("json parse failed: {e}, raw={raw}")))?;

    let choice0 = v
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| LlmError::InvalidResponse(format!("missing choices[0], raw={raw}")))?;

    let content = choice0.get("message").and_then(|m| m.get("content"));

    match content {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Array(arr)) => {
            let parts: Vec<&str> = arr
                .iter()
                .filter_map(|it| it.get("text").and_then(|x| x.as_str()).or(it.as_str()))
                .collect();
            Ok(parts.join("\n"))
        }
        Some(_) => Err(LlmError::InvalidResponse(format!(
            "unexpected message.content type, raw={raw}"
        ))),
    }
}
