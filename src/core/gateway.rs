use crate::core::GameGateway;
use crate::domain::wire::{GetGameRequest, RawGameResponse, RawPlayResponse, WirePlayRequest};
use crate::utils::error::{GameError, Result, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

pub const SERVICE_PATH: &str = "game_engine.v1.GameEngineService";
pub const GET_GAME: &str = "GetGame";
pub const PLAY_HAND: &str = "PlayHand";

/// Connect-protocol (JSON) client for the game engine.
///
/// Every failure, including a 2xx body carrying an error `code`, comes back as
/// a [`TransportError`]. Nothing is retried.
#[derive(Debug, Clone)]
pub struct ConnectGateway {
    client: Client,
    base_url: Url,
}

impl ConnectGateway {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let mut url = Url::parse(base_url).map_err(|e| GameError::InvalidConfigValueError {
            field: "remote.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        // join() 會取代最後一段路徑，先補上結尾斜線
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url: url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn method_url(&self, method: &str) -> std::result::Result<Url, TransportError> {
        self.base_url
            .join(&format!("{}/{}", SERVICE_PATH, method))
            .map_err(|e| TransportError::new(format!("invalid method URL: {}", e)))
    }

    async fn call<T: Serialize + ?Sized>(
        &self,
        method: &str,
        request: &T,
    ) -> std::result::Result<Value, TransportError> {
        let url = self.method_url(method)?;
        tracing::debug!("Calling {} at {}", method, url);

        let response = self
            .client
            .post(url)
            .header("Connect-Protocol-Version", "1")
            .json(request)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = response.status();
        tracing::debug!("{} response status: {}", method, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Game engine error: {} {}", status, body);
            return Err(error_from_body(status.as_u16(), &body));
        }

        let data: Value = response.json().await.map_err(|e| {
            TransportError::new(format!("invalid JSON response: {}", e))
                .with_status(status.as_u16())
        })?;

        // 200 但帶有 code 的回應一樣視為錯誤
        if let Some(code) = error_code(&data) {
            let message = data
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            tracing::error!("Game engine error: {} - {}", code, message);
            return Err(TransportError::new(message)
                .with_status(status.as_u16())
                .with_code(code));
        }

        Ok(data)
    }
}

#[async_trait]
impl GameGateway for ConnectGateway {
    async fn fetch_game(
        &self,
        request: &GetGameRequest,
    ) -> std::result::Result<RawGameResponse, TransportError> {
        self.call(GET_GAME, request).await.map(RawGameResponse)
    }

    async fn play_hand(
        &self,
        request: &WirePlayRequest,
    ) -> std::result::Result<RawPlayResponse, TransportError> {
        let data = self.call(PLAY_HAND, request).await?;
        serde_json::from_value(data)
            .map_err(|e| TransportError::new(format!("unexpected PlayHand response: {}", e)))
    }
}

fn from_reqwest(err: reqwest::Error) -> TransportError {
    let transport = TransportError::new(err.to_string());
    match err.status() {
        Some(status) => transport.with_status(status.as_u16()),
        None => transport,
    }
}

fn error_code(data: &Value) -> Option<String> {
    match data.get("code")? {
        Value::Null => None,
        Value::String(code) if code.is_empty() => None,
        Value::String(code) => Some(code.clone()),
        other => Some(other.to_string()),
    }
}

// Connect error bodies look like {"code": "...", "message": "..."}; anything
// else is passed through as text.
fn error_from_body(status: u16, body: &str) -> TransportError {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP {}", status)
            } else {
                trimmed.to_string()
            }
        });

    let transport = TransportError::new(message).with_status(status);
    match parsed.as_ref().and_then(error_code) {
        Some(code) => transport.with_code(code),
        None => transport,
    }
}
