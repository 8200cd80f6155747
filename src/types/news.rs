//! Wire shapes of the News sync protocol and conversions from storage rows.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::db::{Feed, Folder, Item};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsFolder {
    pub id: i64,
    pub name: String,
}

/// Optional fields serialize as `null`, never omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsFeed {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub title: Option<String>,
    pub folder_id: i64,
    pub favicon_link: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: i64,
    pub guid: String,
    pub guid_hash: String,
    pub url: String,
    pub title: String,
    pub author: String,
    /// Unix seconds.
    pub pub_date: i64,
    pub body: String,
    pub feed_id: i64,
    pub unread: bool,
    pub starred: bool,
    /// Unix seconds.
    pub last_modified: i64,
}

/// Opaque item reference handed to clients: standard base64 of the guid bytes.
pub fn guid_hash(guid: &str) -> String {
    STANDARD.encode(guid.as_bytes())
}

/// Inverse of [`guid_hash`]. `None` when the input is not base64 or not UTF-8.
pub fn decode_guid_hash(hash: &str) -> Option<String> {
    let bytes = STANDARD.decode(hash.trim()).ok()?;
    String::from_utf8(bytes).ok()
}

impl From<&Folder> for NewsFolder {
    fn from(f: &Folder) -> Self {
        Self {
            id: f.id,
            name: f.name.clone(),
        }
    }
}

impl From<&Feed> for NewsFeed {
    fn from(f: &Feed) -> Self {
        Self {
            id: f.id,
            name: f.name.clone(),
            url: f.url.clone(),
            title: f.title.clone(),
            folder_id: f.folder_id,
            favicon_link: f.favicon_link.clone(),
            link: f.link.clone(),
        }
    }
}

impl From<&Item> for NewsItem {
    fn from(i: &Item) -> Self {
        Self {
            id: i.id,
            guid: i.guid.clone(),
            guid_hash: guid_hash(&i.guid),
            url: i.url.clone(),
            title: i.title.clone(),
            author: i.author.clone(),
            pub_date: i.pub_date.timestamp(),
            body: i.content.clone(),
            feed_id: i.feed_id,
            unread: !i.read,
            starred: i.starred,
            last_modified: i.updated.timestamp(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLevels {
    pub api_levels: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub display_name: String,
    pub last_login_timestamp: i64,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VersionInfo {
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct FoldersResponse {
    pub folders: Vec<NewsFolder>,
}

#[derive(Debug, Serialize)]
pub struct FeedsResponse {
    pub feeds: Vec<NewsFeed>,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<NewsItem>,
}

/// Body of `items/{read,unread}/multiple`.
#[derive(Debug, Deserialize)]
pub struct ItemIdsBody {
    #[serde(default)]
    pub items: Vec<i64>,
}

/// Body of `items/{star,unstar}/multiple`.
#[derive(Debug, Deserialize)]
pub struct StarItemsBody {
    #[serde(default)]
    pub items: Vec<StarTarget>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarTarget {
    pub feed_id: i64,
    pub guid_hash: String,
}
