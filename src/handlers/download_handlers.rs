use std::sync::Arc;
use std::time::Duration;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    error::{api_error, ApiError},
    models::download_models::{DownloadStats, Platform},
    services::{
        installers::Installer,
        site_content::{terms_document, TermsDocument},
        terms_gate::{AgreeOutcome, AnchorLauncher, DownloadPage, GateState, TermsGate},
    },
    AppState,
};

/// Open intents older than this are dropped.
pub const INTENT_TTL: Duration = Duration::from_secs(15 * 60);

/// One visitor's pass through the terms gate.
pub struct DownloadIntent {
    pub gate: TermsGate,
    pub created_at: Instant,
}

#[derive(Deserialize)]
pub struct CreateIntentRequest {
    pub platform: Platform,
    #[serde(default)]
    pub page: DownloadPage,
}

#[derive(Serialize)]
pub struct IntentResponse {
    pub intent_id: Uuid,
    pub state: GateState,
    pub installer: Installer,
    pub terms: TermsDocument,
}

#[derive(Serialize)]
pub struct TransitionResponse {
    pub intent_id: Uuid,
    pub state: GateState,
}

#[derive(Serialize)]
pub struct AgreeResponse {
    pub intent_id: Uuid,
    #[serde(flatten)]
    pub outcome: AgreeOutcome,
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<DownloadStats> {
    Json(state.tracker.stats().await)
}

pub async fn list_installers(State(state): State<Arc<AppState>>) -> Json<Vec<Installer>> {
    Json(state.installers.all().into_iter().cloned().collect())
}

pub async fn installer_file(
    State(state): State<Arc<AppState>>,
    Path(platform): Path<String>,
) -> Result<Redirect, ApiError> {
    let platform: Platform = platform
        .parse()
        .map_err(|e: crate::models::download_models::UnknownPlatform| {
            api_error(StatusCode::NOT_FOUND, e.to_string())
        })?;
    Ok(Redirect::temporary(&state.installers.get(platform).url))
}

pub async fn get_terms() -> Json<TermsDocument> {
    Json(terms_document())
}

pub async fn create_intent(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateIntentRequest>,
) -> Result<(StatusCode, Json<IntentResponse>), ApiError> {
    state
        .download_intents
        .retain(|_, intent| intent.created_at.elapsed() < INTENT_TTL);

    let mut gate = TermsGate::new(req.page);
    gate.request(req.platform)
        .map_err(|e| api_error(StatusCode::CONFLICT, e.to_string()))?;

    let intent_id = Uuid::new_v4();
    let gate_state = gate.state();
    state.download_intents.insert(
        intent_id,
        DownloadIntent {
            gate,
            created_at: Instant::now(),
        },
    );
    tracing::debug!(%intent_id, platform = %req.platform, "Terms shown");

    Ok((
        StatusCode::CREATED,
        Json(IntentResponse {
            intent_id,
            state: gate_state,
            installer: state.installers.get(req.platform).clone(),
            terms: terms_document(),
        }),
    ))
}

/// Takes the intent out of the map for the duration of a transition so no
/// map lock is held across an await and a concurrent duplicate gets a 404.
fn take_intent(state: &AppState, intent_id: Uuid) -> Result<DownloadIntent, ApiError> {
    match state.download_intents.remove(&intent_id) {
        Some((_, intent)) if intent.created_at.elapsed() < INTENT_TTL => Ok(intent),
        _ => Err(api_error(
            StatusCode::NOT_FOUND,
            "Download intent not found or expired",
        )),
    }
}

fn put_back(state: &AppState, intent_id: Uuid, intent: DownloadIntent) {
    if !intent.gate.is_idle() {
        state.download_intents.insert(intent_id, intent);
    }
}

pub async fn agree(
    State(state): State<Arc<AppState>>,
    Path(intent_id): Path<Uuid>,
) -> Result<Json<AgreeResponse>, ApiError> {
    let mut intent = take_intent(&state, intent_id)?;
    let result = intent
        .gate
        .agree(&state.tracker, &state.installers, &AnchorLauncher)
        .await;
    put_back(&state, intent_id, intent);

    let outcome = result.map_err(|e| api_error(StatusCode::CONFLICT, e.to_string()))?;
    Ok(Json(AgreeResponse { intent_id, outcome }))
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(intent_id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let mut intent = take_intent(&state, intent_id)?;
    let result = intent.gate.cancel();
    let gate_state = intent.gate.state();
    put_back(&state, intent_id, intent);

    result.map_err(|e| api_error(StatusCode::CONFLICT, e.to_string()))?;
    tracing::debug!(%intent_id, "Terms cancelled");
    Ok(Json(TransitionResponse { intent_id, state: gate_state }))
}

pub async fn dismiss_setup(
    State(state): State<Arc<AppState>>,
    Path(intent_id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let mut intent = take_intent(&state, intent_id)?;
    let result = intent.gate.dismiss_setup();
    let gate_state = intent.gate.state();
    put_back(&state, intent_id, intent);

    result.map_err(|e| api_error(StatusCode::CONFLICT, e.to_string()))?;
    Ok(Json(TransitionResponse { intent_id, state: gate_state }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SiteConfig, db::memory_pool};

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(
            SiteConfig::local(":memory:", "secret"),
            memory_pool().unwrap(),
        ))
    }

    async fn open_intent(state: &Arc<AppState>, platform: Platform) -> Uuid {
        let (status, Json(body)) = create_intent(
            State(state.clone()),
            Json(CreateIntentRequest {
                platform,
                page: DownloadPage::Overview,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        body.intent_id
    }

    #[tokio::test(start_paused = true)]
    async fn expired_intent_cannot_be_agreed_to() {
        let state = test_state();
        let intent_id = open_intent(&state, Platform::Windows).await;

        tokio::time::advance(INTENT_TTL + Duration::from_secs(1)).await;

        let result = agree(State(state.clone()), Path(intent_id)).await;
        assert_eq!(result.err().map(|(status, _)| status), Some(StatusCode::NOT_FOUND));
        assert!(state.download_intents.is_empty());
        assert_eq!(state.tracker.stats().await.total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn intent_inside_the_window_still_works() {
        let state = test_state();
        let intent_id = open_intent(&state, Platform::Mac).await;

        tokio::time::advance(INTENT_TTL - Duration::from_secs(1)).await;

        let Json(body) = cancel(State(state.clone()), Path(intent_id)).await.unwrap();
        assert_eq!(body.state, GateState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn creating_an_intent_sweeps_expired_ones() {
        let state = test_state();
        let stale = open_intent(&state, Platform::Mac).await;
        tokio::time::advance(INTENT_TTL + Duration::from_secs(1)).await;
        let fresh = open_intent(&state, Platform::Windows).await;

        assert_eq!(state.download_intents.len(), 1);
        assert!(state.download_intents.contains_key(&fresh));
        assert!(!state.download_intents.contains_key(&stale));
    }
}
