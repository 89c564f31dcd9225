/// Operator and diagnostics endpoints
///
/// - `GET /api/debug/db` - Store connectivity and record counts
/// - `POST /api/debug/seed` - Seed sample communities into an empty store
/// - `GET /api/test` - Liveness probe

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use biddge_shared::{
    models::community::Community,
    seed::{seed_communities, SeedMode, SeedOutcome},
    store::{Store, StoreError},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Sample size included in the database report
const SAMPLE_SIZE: usize = 2;

/// Database report
///
/// On failure only `success: false`, `database` and `error` are set.
#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseReport {
    pub success: bool,
    pub database: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub communities: Option<CommunitiesReport>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<UsersReport>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommunitiesReport {
    pub count: u64,
    pub sample: Vec<Community>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersReport {
    pub count: u64,
}

/// Seed hook response
#[derive(Debug, Serialize, Deserialize)]
pub struct SeedResponse {
    pub seeded: bool,
    pub inserted: usize,
    pub existing: u64,
    pub message: String,
}

/// Liveness probe response
#[derive(Debug, Serialize, Deserialize)]
pub struct TestResponse {
    pub status: String,
    pub message: String,
    pub database: String,
    pub timestamp: String,
}

/// Reports store connectivity and record counts
///
/// Always 200; failures are reported in the body.
pub async fn database_status(State(state): State<AppState>) -> Json<DatabaseReport> {
    let database = state.config.database.name.clone();

    match collect_report(state.store.as_ref()).await {
        Ok((communities, users)) => Json(DatabaseReport {
            success: true,
            database,
            communities: Some(communities),
            users: Some(users),
            error: None,
        }),
        Err(e) => {
            warn!(error = %e, "Database report failed");
            Json(DatabaseReport {
                success: false,
                database,
                communities: None,
                users: None,
                error: Some(e.to_string()),
            })
        }
    }
}

async fn collect_report(store: &dyn Store) -> Result<(CommunitiesReport, UsersReport), StoreError> {
    store.ping().await?;
    let counts = store.counts().await?;
    let sample = store.list_communities(Some(SAMPLE_SIZE)).await?;

    Ok((
        CommunitiesReport {
            count: counts.communities,
            sample,
        },
        UsersReport { count: counts.users },
    ))
}

/// Seeds the sample communities unless some already exist
///
/// # Errors
///
/// - `500 Internal Server Error`: Store failure
pub async fn seed(State(state): State<AppState>) -> ApiResult<Json<SeedResponse>> {
    let outcome = seed_communities(state.store.as_ref(), SeedMode::SkipIfPresent).await?;

    let response = match outcome {
        SeedOutcome::Seeded { inserted } => SeedResponse {
            seeded: true,
            inserted,
            existing: 0,
            message: format!("Seeded {} communities", inserted),
        },
        SeedOutcome::Skipped { existing } => SeedResponse {
            seeded: false,
            inserted: 0,
            existing,
            message: format!("Database already has {} communities", existing),
        },
    };

    Ok(Json(response))
}

/// Liveness probe
pub async fn test_endpoint(State(state): State<AppState>) -> Json<TestResponse> {
    Json(TestResponse {
        status: "ok".to_string(),
        message: "Backend is running!".to_string(),
        database: state.config.database.name.clone(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
