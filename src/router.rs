use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::db::{self, DbActorHandle, FeedStorage};
use crate::error::RssError;
use crate::handlers::news::{
    api_levels_handler, feed_read_handler, feeds_handler, folders_handler, item_read_handler,
    item_unread_handler, items_handler, items_read_multiple_handler, items_star_multiple_handler,
    items_unread_multiple_handler, items_unstar_multiple_handler, updated_items_handler,
    user_handler, version_handler,
};
use crate::middleware::auth::UserDirectory;

/// Namespace of the emulated News app API.
pub const NEWS_API_BASE: &str = "/index.php/apps/news/api";

#[derive(Clone)]
pub struct NewsState {
    pub db: DbActorHandle,
    pub users: Arc<UserDirectory>,
}

impl NewsState {
    pub fn new(db: DbActorHandle, users: UserDirectory) -> Self {
        Self {
            db,
            users: Arc::new(users),
        }
    }
}

/// Open storage, apply the schema, seed folders/feeds and start the storage actor.
///
/// Every error here is a startup error.
pub async fn build_state(cfg: &Config) -> Result<NewsState, RssError> {
    let pool = db::connect(&cfg.database).await?;
    let storage = FeedStorage::new(pool);
    storage.init_schema().await?;

    let seeded = storage.seed(&cfg.folders, &cfg.feeds).await?;
    info!(
        database = %cfg.database.display(),
        folders = seeded.folders,
        feeds = seeded.feeds,
        "storage ready"
    );

    let handle = db::spawn(storage).await?;
    Ok(NewsState::new(handle, UserDirectory::new(cfg.users.clone())))
}

pub fn news_router(state: NewsState) -> Router {
    let v1_2 = Router::new()
        .route("/user", get(user_handler))
        .route("/version", get(version_handler))
        .route("/status", get(version_handler))
        .route("/feeds", get(feeds_handler))
        .route("/feeds/{feed_id}/read", put(feed_read_handler))
        .route("/folders", get(folders_handler))
        .route("/items", get(items_handler))
        .route("/items/updated", get(updated_items_handler))
        .route("/items/{item_id}/read", put(item_read_handler))
        .route("/items/{item_id}/unread", put(item_unread_handler))
        .route("/items/read/multiple", put(items_read_multiple_handler))
        .route("/items/unread/multiple", put(items_unread_multiple_handler))
        .route("/items/star/multiple", put(items_star_multiple_handler))
        .route("/items/unstar/multiple", put(items_unstar_multiple_handler));

    Router::new()
        .route(NEWS_API_BASE, get(api_levels_handler))
        .route(&format!("{NEWS_API_BASE}/"), get(api_levels_handler))
        .nest(&format!("{NEWS_API_BASE}/v1-2"), v1_2)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
