use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::config::{API_LEVELS, NEWS_APP_VERSION};
use crate::db::ItemRef;
use crate::middleware::auth::BasicAuthUser;
use crate::types::news::{
    ApiLevels, FeedsResponse, FoldersResponse, ItemIdsBody, ItemsResponse, NewsFeed, NewsFolder,
    NewsItem, StarItemsBody, UserInfo, VersionInfo, decode_guid_hash,
};
use crate::types::params::{FeedReadParams, ItemsParams};
use crate::{RssError, router::NewsState};

/// GET /index.php/apps/news/api
pub async fn api_levels_handler(_user: BasicAuthUser) -> Json<ApiLevels> {
    Json(ApiLevels {
        api_levels: API_LEVELS.iter().map(|s| s.to_string()).collect(),
    })
}

/// GET /user -> the authenticated username echoed as id and display name.
pub async fn user_handler(BasicAuthUser(username): BasicAuthUser) -> Json<UserInfo> {
    Json(UserInfo {
        user_id: username.clone(),
        display_name: username,
        last_login_timestamp: Utc::now().timestamp(),
        avatar: None,
    })
}

/// GET /version and GET /status
pub async fn version_handler(_user: BasicAuthUser) -> Json<VersionInfo> {
    Json(VersionInfo {
        version: NEWS_APP_VERSION.to_string(),
    })
}

pub async fn feeds_handler(
    State(state): State<NewsState>,
    _user: BasicAuthUser,
) -> Result<Json<FeedsResponse>, RssError> {
    let feeds = state.db.list_feeds().await?;
    Ok(Json(FeedsResponse {
        feeds: feeds.iter().map(NewsFeed::from).collect(),
    }))
}

pub async fn folders_handler(
    State(state): State<NewsState>,
    _user: BasicAuthUser,
) -> Result<Json<FoldersResponse>, RssError> {
    let folders = state.db.list_folders().await?;
    Ok(Json(FoldersResponse {
        folders: folders.iter().map(NewsFolder::from).collect(),
    }))
}

pub async fn items_handler(
    State(state): State<NewsState>,
    _user: BasicAuthUser,
    Query(params): Query<ItemsParams>,
) -> Result<Json<ItemsResponse>, RssError> {
    let query = params.into_items_query()?;
    let items = state.db.query_items(query).await?;
    debug!(count = items.len(), "items fetched");
    Ok(Json(ItemsResponse {
        items: items.iter().map(NewsItem::from).collect(),
    }))
}

/// GET /items/updated -> items whose lastModified is at or after `lastModified`.
pub async fn updated_items_handler(
    State(state): State<NewsState>,
    _user: BasicAuthUser,
    Query(params): Query<ItemsParams>,
) -> Result<Json<ItemsResponse>, RssError> {
    let query = params.into_updated_query()?;
    let items = state.db.query_items(query).await?;
    Ok(Json(ItemsResponse {
        items: items.iter().map(NewsItem::from).collect(),
    }))
}

async fn set_single_read(
    state: &NewsState,
    item_id: i64,
    read: bool,
) -> Result<Json<Value>, RssError> {
    let touched = state.db.set_read(vec![item_id], read).await?;
    if touched == 0 {
        return Err(RssError::NotFound("Item not found".to_string()));
    }
    Ok(Json(json!({})))
}

/// PUT /items/{itemId}/read
pub async fn item_read_handler(
    State(state): State<NewsState>,
    _user: BasicAuthUser,
    Path(item_id): Path<i64>,
) -> Result<Json<Value>, RssError> {
    set_single_read(&state, item_id, true).await
}

/// PUT /items/{itemId}/unread
pub async fn item_unread_handler(
    State(state): State<NewsState>,
    _user: BasicAuthUser,
    Path(item_id): Path<i64>,
) -> Result<Json<Value>, RssError> {
    set_single_read(&state, item_id, false).await
}

/// PUT /feeds/{feedId}/read?newestItemId=
pub async fn feed_read_handler(
    State(state): State<NewsState>,
    _user: BasicAuthUser,
    Path(feed_id): Path<i64>,
    Query(params): Query<FeedReadParams>,
) -> Result<Json<Value>, RssError> {
    let newest_item_id = params.newest_item_id()?;
    let touched = state.db.mark_feed_read(feed_id, newest_item_id).await?;
    info!(feed_id, newest_item_id, touched, "feed marked read");
    Ok(Json(json!({})))
}

/// PUT /items/read/multiple
pub async fn items_read_multiple_handler(
    State(state): State<NewsState>,
    _user: BasicAuthUser,
    Json(body): Json<ItemIdsBody>,
) -> Result<Json<Value>, RssError> {
    state.db.set_read(body.items, true).await?;
    Ok(Json(json!({})))
}

/// PUT /items/unread/multiple
pub async fn items_unread_multiple_handler(
    State(state): State<NewsState>,
    _user: BasicAuthUser,
    Json(body): Json<ItemIdsBody>,
) -> Result<Json<Value>, RssError> {
    state.db.set_read(body.items, false).await?;
    Ok(Json(json!({})))
}

fn star_refs(body: StarItemsBody) -> Result<Vec<ItemRef>, RssError> {
    body.items
        .into_iter()
        .map(|target| {
            let guid = decode_guid_hash(&target.guid_hash)
                .ok_or_else(|| RssError::bad_request("Invalid guidHash"))?;
            Ok(ItemRef {
                feed_id: target.feed_id,
                guid,
            })
        })
        .collect()
}

/// PUT /items/star/multiple
pub async fn items_star_multiple_handler(
    State(state): State<NewsState>,
    _user: BasicAuthUser,
    Json(body): Json<StarItemsBody>,
) -> Result<Json<Value>, RssError> {
    state.db.set_starred(star_refs(body)?, true).await?;
    Ok(Json(json!({})))
}

/// PUT /items/unstar/multiple
pub async fn items_unstar_multiple_handler(
    State(state): State<NewsState>,
    _user: BasicAuthUser,
    Json(body): Json<StarItemsBody>,
) -> Result<Json<Value>, RssError> {
    state.db.set_starred(star_refs(body)?, false).await?;
    Ok(Json(json!({})))
}
