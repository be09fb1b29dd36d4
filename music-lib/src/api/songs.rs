//! Song endpoints
//!
//! Thin request binding around [`crate::service::SongService`].

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ApiError;
use crate::models::{Song, SongId, SongPartial};
use crate::pagination::Pagination;
use crate::AppState;

/// Query parameters for GET /api/songs
///
/// `limit` and `page` stay strings so garbage falls back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SongListQuery {
    pub name: String,
    pub artist: String,
    pub release_date: String,
    pub text: String,
    pub link: String,
    pub limit: Option<String>,
    pub page: Option<String>,
}

impl SongListQuery {
    fn filter(&self) -> Song {
        Song {
            name: self.name.clone(),
            artist: self.artist.clone(),
            release_date: self.release_date.clone(),
            text: self.text.clone(),
            link: self.link.clone(),
        }
    }

    fn pagination(&self) -> Pagination {
        let parse = |raw: &Option<String>| raw.as_deref().and_then(|v| v.trim().parse().ok());
        Pagination::new(parse(&self.limit), parse(&self.page))
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    fn ok() -> Json<Self> {
        Json(Self {
            status: "ok".to_string(),
        })
    }
}

/// Parse a path identifier; must be a positive integer
fn parse_id(raw: &str) -> Result<SongId, ApiError> {
    match raw.parse::<SongId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::bad_request(format!("invalid song id '{}'", raw))),
    }
}

/// POST /api/songs
///
/// Returns `{"id": <new id>}`.
pub async fn add_song(
    State(state): State<AppState>,
    payload: Result<Json<Song>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(song) = payload?;
    let id = state.service.add(song).await?;
    Ok(Json(json!({ "id": id })))
}

/// GET /api/songs?name=&artist=&release_date=&text=&link=&limit=&page=
pub async fn get_all_songs(
    State(state): State<AppState>,
    Query(query): Query<SongListQuery>,
) -> Result<Json<Vec<SongPartial>>, ApiError> {
    let songs = state
        .service
        .get_all(&query.filter(), query.pagination())
        .await?;
    Ok(Json(songs))
}

/// GET /api/songs/:id
///
/// An unknown id yields the empty song (`id` 0, null fields), not 404.
pub async fn get_song_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SongPartial>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.get_by_id(id).await?))
}

/// PUT /api/songs/:id
pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SongPartial>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id = parse_id(&id)?;
    let Json(song) = payload?;
    state.service.update(id, &song).await?;
    Ok(StatusResponse::ok())
}

/// DELETE /api/songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;
    Ok(StatusResponse::ok())
}

/// GET /api/songs/:id/text
///
/// Lyrics as a JSON string; empty for an unknown id.
pub async fn get_song_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<String>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.get_text(id).await?))
}
