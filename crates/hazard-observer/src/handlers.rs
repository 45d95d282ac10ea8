//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `POST` | `/ingest` | Classify and dispatch one hazard report |
//! | `GET` | `/events` | Recent simulation events, newest last |
//! | `GET` | `/api/status` | Track, subscribers, pending alerts, simulation |

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use hazard_core::dispatch::TrackStatus;
use hazard_types::{HazardEvent, HazardKind, IngestAck, IngestReport, Phase, Tier};
use tracing::{debug, info};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page with live counters and endpoint links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let counts = state.dispatcher.groups().counts().await;
    let track = state.dispatcher.track_status().await;
    let latest = state.latest.read().await;
    let cycle = latest.as_ref().map_or(0, |s| s.cycle);
    let phase = latest
        .as_ref()
        .map_or_else(|| "--".to_owned(), |s| format!("{:?}", s.phase).to_uppercase());
    drop(latest);
    let count = |tier: Tier| counts.get(&tier).copied().unwrap_or(0);

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Hazard Watch</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #f0883e; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #f0883e; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>Hazard Watch</h1>

    <div class="metric"><div class="label">Cycle</div><div class="value">{cycle}</div></div>
    <div class="metric"><div class="label">Phase</div><div class="value">{phase}</div></div>
    <div class="metric"><div class="label">Track points</div><div class="value">{points}</div></div>
    <div class="metric"><div class="label">Monitors</div><div class="value">{monitors}</div></div>
    <div class="metric"><div class="label">Authorities</div><div class="value">{authorities}</div></div>
    <div class="metric"><div class="label">Civilians</div><div class="value">{civilians}</div></div>

    <ul>
        <li>POST /ingest</li>
        <li><a href="/events">GET /events</a></li>
        <li><a href="/api/status">GET /api/status</a></li>
        <li><a href="/api/operator/status">GET /api/operator/status</a></li>
        <li>WS /ws/monitor, /ws/authority, /ws/civilian, /ws/simulation</li>
    </ul>
</body>
</html>"#,
        points = track.positions,
        monitors = count(Tier::Monitor),
        authorities = count(Tier::Authority),
        civilians = count(Tier::Civilian),
    ))
}

// ---------------------------------------------------------------------------
// POST /ingest
// ---------------------------------------------------------------------------

/// Classify a report, advance the track, and fan out to the tiers.
///
/// Missing or ill-typed fields are rejected by the JSON extractor before
/// this handler runs.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(report): Json<IngestReport>,
) -> Result<Json<IngestAck>, ObserverError> {
    debug!(
        latitude = report.latitude,
        longitude = report.longitude,
        affected_people = report.affected_people,
        "Ingest request"
    );
    let ack = state.dispatcher.ingest(report).await?;
    info!(density = ack.density, "Report processed");
    Ok(Json(ack))
}

// ---------------------------------------------------------------------------
// GET /events
// ---------------------------------------------------------------------------

/// Most recent simulation events, oldest first.
pub async fn list_events(State(state): State<Arc<AppState>>) -> Json<Vec<HazardEvent>> {
    Json(state.recent_events().await)
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Response body for `GET /api/status`.
#[derive(Debug, serde::Serialize)]
pub struct StatusResponse {
    /// Hazard track snapshot.
    pub track: TrackStatus,
    /// Connected subscribers per tier.
    pub subscribers: BTreeMap<Tier, usize>,
    /// Civilian alerts waiting for their delay to elapse.
    pub pending_civilian_alerts: usize,
    /// Last completed simulation cycle.
    pub cycle: Option<u64>,
    /// Current tectonic phase.
    pub phase: Option<Phase>,
    /// Anti-starvation gap counters.
    pub gap_counters: BTreeMap<HazardKind, u32>,
}

/// Aggregate status of dispatcher and simulation.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let dispatcher = &state.dispatcher;
    let latest = state.latest.read().await.clone();
    Json(StatusResponse {
        track: dispatcher.track_status().await,
        subscribers: dispatcher.groups().counts().await,
        pending_civilian_alerts: dispatcher.scheduler().pending().await,
        cycle: latest.as_ref().map(|s| s.cycle),
        phase: latest.as_ref().map(|s| s.phase),
        gap_counters: latest.map(|s| s.gap_counters).unwrap_or_default(),
    })
}
