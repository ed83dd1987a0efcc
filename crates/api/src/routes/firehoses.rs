//! Firehose management and message endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use firehose_core::Record;
use firehose_engine::Firehose;
use tracing::{debug, info, warn};

use crate::request::{CreateFirehoseRequest, MessageRequest};
use crate::response::{ApiError, MessageResponse, StatsResponse};
use crate::state::AppState;

/// POST /minifirehoses - Create, start and register a firehose.
pub async fn create_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let request = CreateFirehoseRequest::parse(&body)?;

    // Checked again on insert; this only avoids building a sink for a taken name.
    if state.registry.contains(&request.name) {
        return Err(firehose_core::Error::AlreadyExists(request.name).into());
    }

    let config = request.firehose_config()?;
    let sink = firehose_sinks::build(&request.sink_definition()?)?;

    let firehose =
        Firehose::with_options(&request.name, vec![sink], config, state.options.clone())?;
    firehose.start()?;

    if let Err(e) = state.registry.insert(firehose.clone()) {
        firehose.stop().await;
        return Err(e.into());
    }

    info!(
        firehose = %request.name,
        sink = %request.sink,
        "Firehose registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "MiniFirehose '{}' created",
            request.name
        ))),
    ))
}

/// GET /minifirehoses - Names of registered firehoses.
pub async fn list_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.registry.names())
}

/// DELETE /minifirehoses/:name - Unregister and stop, flushing what is buffered.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let firehose = state.registry.remove(&name)?;

    if let Some(report) = firehose.stop().await {
        if !report.all_delivered() {
            warn!(
                firehose = %name,
                failed = report.failed,
                "Final flush was not delivered to every sink"
            );
        }
    }

    info!(firehose = %name, "Firehose deleted");
    Ok(Json(MessageResponse::new(format!(
        "MiniFirehose '{}' deleted",
        name
    ))))
}

/// POST /minifirehoses/:name/message - Append one record.
pub async fn message_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let firehose = state.registry.get(&name)?;
    let request = MessageRequest::parse(&body)?;

    firehose.append(Record::new(request.message))?;
    debug!(firehose = %name, "Message added");

    Ok(Json(MessageResponse::new("Message added")))
}

/// GET /minifirehoses/:name/stats - Buffer statistics.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StatsResponse>, ApiError> {
    let firehose = state.registry.get(&name)?;
    Ok(Json(StatsResponse::from(firehose.stats())))
}
