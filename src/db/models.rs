use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Folder {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Feed {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub title: Option<String>,
    pub folder_id: i64,
    #[sqlx(rename = "faviconLink")]
    pub favicon_link: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Item {
    pub id: i64,
    pub guid: String,
    pub url: String,
    pub title: String,
    pub author: String,
    pub content: String,
    #[sqlx(rename = "pubDate")]
    pub pub_date: DateTime<Utc>,
    pub feed_id: i64,
    pub read: bool,
    pub starred: bool,
    pub updated: DateTime<Utc>,
}

/// Which items a query covers. Mirrors the protocol's `type` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSelector {
    Feed(i64),
    Folder(i64),
    Starred,
    All,
}

impl ItemSelector {
    /// Map a protocol `(type, id)` pair; `None` for unknown types.
    pub fn from_type(kind: i64, id: i64) -> Option<Self> {
        match kind {
            0 => Some(Self::Feed(id)),
            1 => Some(Self::Folder(id)),
            2 => Some(Self::Starred),
            3 => Some(Self::All),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemQuery {
    pub selector: ItemSelector,
    /// Limit on returned rows; ignored unless positive.
    pub batch_size: Option<i64>,
    /// Only items with `id <= offset`; ignored unless positive.
    pub offset: Option<i64>,
    pub get_read: bool,
    pub oldest_first: bool,
    /// Only items whose `updated` is at or after this Unix second.
    pub modified_since: Option<i64>,
}

impl ItemQuery {
    pub fn new(selector: ItemSelector) -> Self {
        Self {
            selector,
            batch_size: None,
            offset: None,
            get_read: true,
            oldest_first: false,
            modified_since: None,
        }
    }
}

/// Identifies an item the way star/unstar requests do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub feed_id: i64,
    pub guid: String,
}
