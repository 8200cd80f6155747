use crate::db::models::{Feed, Folder, Item, ItemQuery, ItemRef};
use crate::db::sqlite::FeedStorage;
use crate::error::RssError;

use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use tracing::{debug, info, warn};

pub type Reply<T> = RpcReplyPort<Result<T, RssError>>;

/// Storage requests. The actor handles one message at a time, so every
/// statement runs alone on the single pooled connection.
#[derive(Debug)]
pub enum DbActorMessage {
    ListFolders(Reply<Vec<Folder>>),
    ListFeeds(Reply<Vec<Feed>>),
    QueryItems(ItemQuery, Reply<Vec<Item>>),
    SetRead(Vec<i64>, bool, Reply<u64>),
    /// `(feed_id, newest_item_id)`
    MarkFeedRead(i64, i64, Reply<u64>),
    SetStarred(Vec<ItemRef>, bool, Reply<u64>),
}

/// Handle for interacting with the storage actor.
#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

fn rpc_error(op: &str, e: impl std::fmt::Display) -> RssError {
    RssError::RactorError(format!("{op} RPC failed: {e}"))
}

impl DbActorHandle {
    pub async fn list_folders(&self) -> Result<Vec<Folder>, RssError> {
        ractor::call!(self.actor, DbActorMessage::ListFolders)
            .map_err(|e| rpc_error("ListFolders", e))?
    }

    pub async fn list_feeds(&self) -> Result<Vec<Feed>, RssError> {
        ractor::call!(self.actor, DbActorMessage::ListFeeds)
            .map_err(|e| rpc_error("ListFeeds", e))?
    }

    pub async fn query_items(&self, query: ItemQuery) -> Result<Vec<Item>, RssError> {
        ractor::call!(self.actor, DbActorMessage::QueryItems, query)
            .map_err(|e| rpc_error("QueryItems", e))?
    }

    pub async fn set_read(&self, ids: Vec<i64>, read: bool) -> Result<u64, RssError> {
        ractor::call!(self.actor, DbActorMessage::SetRead, ids, read)
            .map_err(|e| rpc_error("SetRead", e))?
    }

    pub async fn mark_feed_read(&self, feed_id: i64, newest_item_id: i64) -> Result<u64, RssError> {
        ractor::call!(
            self.actor,
            DbActorMessage::MarkFeedRead,
            feed_id,
            newest_item_id
        )
        .map_err(|e| rpc_error("MarkFeedRead", e))?
    }

    pub async fn set_starred(&self, refs: Vec<ItemRef>, starred: bool) -> Result<u64, RssError> {
        ractor::call!(self.actor, DbActorMessage::SetStarred, refs, starred)
            .map_err(|e| rpc_error("SetStarred", e))?
    }
}

/// ractor-based storage actor
struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = FeedStorage;
    type Arguments = FeedStorage;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        storage: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        info!("DbActor started");
        Ok(storage)
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        storage: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::ListFolders(rp) => {
                let _ = rp.send(logged("ListFolders", storage.list_folders().await));
            }
            DbActorMessage::ListFeeds(rp) => {
                let _ = rp.send(logged("ListFeeds", storage.list_feeds().await));
            }
            DbActorMessage::QueryItems(query, rp) => {
                debug!(?query, "querying items");
                let _ = rp.send(logged("QueryItems", storage.query_items(&query).await));
            }
            DbActorMessage::SetRead(ids, read, rp) => {
                let _ = rp.send(logged("SetRead", storage.set_read(&ids, read).await));
            }
            DbActorMessage::MarkFeedRead(feed_id, newest_item_id, rp) => {
                let res = storage.mark_feed_read(feed_id, newest_item_id).await;
                let _ = rp.send(logged("MarkFeedRead", res));
            }
            DbActorMessage::SetStarred(refs, starred, rp) => {
                let _ = rp.send(logged("SetStarred", storage.set_starred(&refs, starred).await));
            }
        }
        Ok(())
    }
}

fn logged<T>(op: &str, res: Result<T, RssError>) -> Result<T, RssError> {
    if let Err(e) = &res {
        warn!(op, error = %e, "storage operation failed");
    }
    res
}

/// Spawn the storage actor around an initialized storage and return a handle.
pub async fn spawn(storage: FeedStorage) -> Result<DbActorHandle, RssError> {
    let (actor, _jh) = Actor::spawn(None, DbActor, storage)
        .await
        .map_err(|e| RssError::RactorError(format!("failed to spawn DbActor: {e}")))?;
    Ok(DbActorHandle { actor })
}
