//! Query-string parameters of the item endpoints.
//!
//! Values arrive as raw strings and are parsed leniently: an integer that does
//! not parse counts as absent, a boolean is true only for the literal `true`.

use serde::Deserialize;

use crate::db::{ItemQuery, ItemSelector};
use crate::error::RssError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsParams {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub batch_size: Option<String>,
    pub offset: Option<String>,
    pub get_read: Option<String>,
    pub oldest_first: Option<String>,
    pub last_modified: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedReadParams {
    pub newest_item_id: Option<String>,
}

fn int(raw: &Option<String>) -> Option<i64> {
    raw.as_deref().and_then(|v| v.trim().parse().ok())
}

fn flag(raw: &Option<String>, default: bool) -> bool {
    match raw.as_deref() {
        Some(v) => v.trim().eq_ignore_ascii_case("true"),
        None => default,
    }
}

impl ItemsParams {
    fn selector(&self) -> Result<ItemSelector, RssError> {
        // -1 is the protocol's "unset" marker for both.
        let id = int(&self.id)
            .filter(|v| *v != -1)
            .ok_or_else(|| RssError::bad_request("ID not specified"))?;
        let kind = int(&self.kind)
            .filter(|v| *v != -1)
            .ok_or_else(|| RssError::bad_request("type not specified"))?;
        ItemSelector::from_type(kind, id)
            .ok_or_else(|| RssError::bad_request(format!("Unknown type: {kind}")))
    }

    /// Parameters of `GET items`.
    pub fn into_items_query(self) -> Result<ItemQuery, RssError> {
        let mut query = ItemQuery::new(self.selector()?);
        query.batch_size = int(&self.batch_size);
        query.offset = int(&self.offset);
        query.get_read = flag(&self.get_read, true);
        query.oldest_first = flag(&self.oldest_first, false);
        Ok(query)
    }

    /// Parameters of `GET items/updated`.
    pub fn into_updated_query(self) -> Result<ItemQuery, RssError> {
        let since = int(&self.last_modified)
            .ok_or_else(|| RssError::bad_request("lastModified not specified"))?;
        let mut query = ItemQuery::new(self.selector()?);
        query.modified_since = Some(since);
        Ok(query)
    }
}

impl FeedReadParams {
    pub fn newest_item_id(&self) -> Result<i64, RssError> {
        int(&self.newest_item_id)
            .ok_or_else(|| RssError::bad_request("newestItemId not specified"))
    }
}
