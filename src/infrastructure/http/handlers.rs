//! HTTP Handlers
//!
//! /api/speak 接受 GET 查询参数或 POST JSON，校验后把流水线
//! 扔到后台执行（fire-and-forget），立即返回 202。

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::state::AppState;
use crate::domain::SpeechRequest;

/// /api/speak 请求参数
#[derive(Debug, Deserialize)]
pub struct SpeakParams {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub content: String,
}

/// 健康检查
pub async fn ping() -> &'static str {
    "pong"
}

/// GET /api/speak?language=fr&speed=0.8&content=...
pub async fn speak_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SpeakParams>,
) -> (StatusCode, String) {
    speak(state, params).await
}

/// POST /api/speak  {"language": "fr", "speed": 0.8, "content": "..."}
pub async fn speak_post(
    State(state): State<Arc<AppState>>,
    Json(params): Json<SpeakParams>,
) -> (StatusCode, String) {
    speak(state, params).await
}

async fn speak(state: Arc<AppState>, params: SpeakParams) -> (StatusCode, String) {
    if params.content.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing content\n".to_string());
    }

    let language = params
        .language
        .unwrap_or_else(|| state.default_language.clone());
    let profile = match state.registry.resolve(&language) {
        Ok(profile) => profile,
        Err(err) => return (StatusCode::BAD_REQUEST, format!("{}\n", err)),
    };

    let request =
        match SpeechRequest::build(params.content, profile, params.speed, &state.audio_dir) {
            Ok(request) => request,
            Err(err) => return (StatusCode::BAD_REQUEST, format!("{}\n", err)),
        };

    let accepted = format!(
        "Speak accepted: language={}, speed={:.2}, fingerprint={}\n",
        request.language(),
        request.speed(),
        request.fingerprint()
    );

    // 流水线在后台跑完；失败只记日志，错误不回传给已应答的客户端
    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        if let Err(err) = pipeline.run(request).await {
            tracing::error!(error = %err, "Background pipeline run failed");
        }
    });

    (StatusCode::ACCEPTED, accepted)
}
