use crate::api::error::ApiResult;
use crate::api::types::*;
use crate::config::{ConfigError, Configuration};
use crate::engine::{Status, TrafficGenerator};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

pub struct RestApi {
    generator: TrafficGenerator,
}

impl RestApi {
    pub fn new(generator: TrafficGenerator) -> Self {
        Self { generator }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/api/config", get(get_config).post(update_config))
            .route("/api/start", post(start_generator))
            .route("/api/stop", post(stop_generator))
            .route("/api/status", get(get_status))
            .with_state(self.generator.clone())
    }
}

async fn health_check() -> &'static str {
    "OK"
}

async fn get_config(State(generator): State<TrafficGenerator>) -> Json<Configuration> {
    Json(generator.get_configuration())
}

/// The body is taken as text so malformed JSON surfaces as our own 400
/// instead of axum's extractor rejection.
async fn update_config(
    State(generator): State<TrafficGenerator>,
    body: String,
) -> ApiResult<Json<Configuration>> {
    let config: Configuration = serde_json::from_str(&body).map_err(ConfigError::from)?;
    generator.set_configuration(config.clone())?;
    Ok(Json(config))
}

async fn start_generator(
    State(generator): State<TrafficGenerator>,
) -> ApiResult<Json<StartResponse>> {
    let run_id = generator.start()?;

    Ok(Json(StartResponse {
        run_id,
        message: format!("Traffic generation started with run ID: {run_id}"),
    }))
}

async fn stop_generator(State(generator): State<TrafficGenerator>) -> Json<SuccessResponse> {
    generator.stop();

    Json(SuccessResponse {
        message: "Traffic generation stopped".to_string(),
    })
}

async fn get_status(State(generator): State<TrafficGenerator>) -> Json<Status> {
    Json(generator.status())
}
