use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::{error, info};

use crate::anime::model::{AnimeDetails, AnimeSummary, FeedResults, SearchEnvelope};
use crate::api::routes::ErrorResponse;
use crate::api::state::ApiState;
use crate::global::error::ClientError;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
    pub page: Option<u32>,
}

/// Home feed sections.
/// GET /api/feed
pub async fn get_feed(
    State(state): State<ApiState>,
) -> Result<Json<FeedResults>, (StatusCode, Json<ErrorResponse>)> {
    info!("API request: home feed");

    let mut feed = state.provider.fetch_feed().await.map_err(rejection)?;

    if state.config.relay.rewrite_poster_urls {
        rewrite_feed_posters(&mut feed, &state.config.server.public_base_url);
    }

    Ok(Json(feed))
}

/// Keyword search. Always answers 200: failures degrade to an empty
/// envelope with `success: false`, and callers branch on that flag.
/// GET /api/search?keyword=naruto&page=2
pub async fn search_anime(
    State(state): State<ApiState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchEnvelope> {
    info!(keyword = %query.keyword, page = ?query.page, "API request: search anime");

    let mut envelope = state
        .provider
        .search_lenient(&query.keyword, query.page)
        .await;

    if state.config.relay.rewrite_poster_urls {
        for summary in &mut envelope.results.data {
            rewrite_summary_poster(summary, &state.config.server.public_base_url);
        }
    }

    Json(envelope)
}

/// Details for one anime, unwrapped from the upstream envelope.
/// GET /api/details/{id}
pub async fn get_details(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<AnimeDetails>, (StatusCode, Json<ErrorResponse>)> {
    info!(id = %id, "API request: anime details");

    let mut details = state.provider.fetch_details(&id).await.map_err(rejection)?;

    if state.config.relay.rewrite_poster_urls && !details.poster.is_empty() {
        details.poster = proxied_image_url(&state.config.server.public_base_url, &details.poster);
    }

    Ok(Json(details))
}

fn rejection(err: ClientError) -> (StatusCode, Json<ErrorResponse>) {
    error!(error = %err, "API request failed");
    let status = match &err {
        ClientError::MissingParameter(_) => StatusCode::BAD_REQUEST,
        ClientError::RequestFailed { status: 404 } => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, Json(ErrorResponse { error: err.to_string() }))
}

/// Rewrite an upstream poster URL into relay form so the browser loads
/// images same-origin.
fn proxied_image_url(public_base_url: &str, poster: &str) -> String {
    format!(
        "{}/api/proxy?url={}",
        public_base_url.trim_end_matches('/'),
        urlencoding::encode(poster)
    )
}

fn rewrite_summary_poster(summary: &mut AnimeSummary, public_base_url: &str) {
    if !summary.poster.is_empty() {
        summary.poster = proxied_image_url(public_base_url, &summary.poster);
    }
}

fn rewrite_feed_posters(feed: &mut FeedResults, public_base_url: &str) {
    let sections = [
        &mut feed.spotlights,
        &mut feed.trending,
        &mut feed.most_popular,
        &mut feed.top_airing,
        &mut feed.most_favorite,
        &mut feed.latest_completed,
        &mut feed.latest_episode,
    ];
    for section in sections {
        for summary in section.iter_mut() {
            rewrite_summary_poster(summary, public_base_url);
        }
    }
}
