use crate::config::{FeedSeed, FolderSeed};
use crate::db::models::{Feed, Folder, Item, ItemQuery, ItemRef, ItemSelector};
use crate::db::schema::SQLITE_INIT;
use crate::error::RssError;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, QueryBuilder, Sqlite};
use std::path::Path;

pub type SqlitePool = Pool<Sqlite>;

const ITEM_SELECT: &str = "SELECT id, guid, url, title, author, content, pubDate, feed_id, \
     read, starred, updated FROM item WHERE 1 = 1";

/// `item.updated` as Unix seconds, whether the writer stored text or a number.
const UPDATED_EPOCH: &str = "(CASE WHEN typeof(updated) IN ('integer', 'real') \
     THEN CAST(updated AS INTEGER) \
     ELSE CAST(strftime('%s', updated) AS INTEGER) END)";

/// `item.pubDate` as Unix seconds; text values may carry a UTC offset.
const PUB_DATE_EPOCH: &str = "(CASE WHEN typeof(pubDate) IN ('integer', 'real') \
     THEN CAST(pubDate AS INTEGER) \
     ELSE CAST(strftime('%s', pubDate) AS INTEGER) END)";

/// Rows addressed per mutation statement, keeping binds under SQLite's variable limit.
const MUTATION_CHUNK: usize = 500;

/// Open the database file with a single pooled connection.
pub async fn connect(database: &Path) -> Result<SqlitePool, RssError> {
    let connect_opts = SqliteConnectOptions::new()
        .filename(database)
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_opts)
        .await?;
    Ok(pool)
}

/// Rows inserted by one seeding pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub folders: u64,
    pub feeds: u64,
}

#[derive(Clone)]
pub struct FeedStorage {
    pool: SqlitePool,
}

impl FeedStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), RssError> {
        let mut tx = self.pool.begin().await?;
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Insert configured folders and feeds that are not present yet.
    ///
    /// New rows take their position in the configuration list as id. Runs in a
    /// single transaction; any error rolls the whole pass back.
    pub async fn seed(
        &self,
        folders: &[FolderSeed],
        feeds: &[FeedSeed],
    ) -> Result<SeedSummary, RssError> {
        let now = Utc::now();
        let mut summary = SeedSummary::default();
        let mut tx = self.pool.begin().await?;

        for (idx, folder) in folders.iter().enumerate() {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(1) FROM folder WHERE name = ?")
                .bind(&folder.name)
                .fetch_one(&mut *tx)
                .await?;
            if count == 0 {
                sqlx::query("INSERT INTO folder (id, name, updated) VALUES (?, ?, ?)")
                    .bind(idx as i64)
                    .bind(&folder.name)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;
                summary.folders += 1;
            }
        }

        for (idx, feed) in feeds.iter().enumerate() {
            let folder_id: Option<(i64,)> = sqlx::query_as("SELECT id FROM folder WHERE name = ?")
                .bind(&feed.folder)
                .fetch_optional(&mut *tx)
                .await?;
            let Some((folder_id,)) = folder_id else {
                return Err(RssError::Seed(format!(
                    "feed {:?} references unknown folder {:?}",
                    feed.name, feed.folder
                )));
            };

            let (count,): (i64,) = sqlx::query_as(
                "SELECT COUNT(1) FROM feed WHERE name = ? AND url = ? AND folder_id = ?",
            )
            .bind(&feed.name)
            .bind(&feed.url)
            .bind(folder_id)
            .fetch_one(&mut *tx)
            .await?;
            if count == 0 {
                sqlx::query(
                    "INSERT INTO feed (id, name, folder_id, url, updated) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(idx as i64)
                .bind(&feed.name)
                .bind(folder_id)
                .bind(&feed.url)
                .bind(now)
                .execute(&mut *tx)
                .await?;
                summary.feeds += 1;
            }
        }

        tx.commit().await?;
        Ok(summary)
    }

    pub async fn list_folders(&self) -> Result<Vec<Folder>, RssError> {
        let rows = sqlx::query_as::<_, Folder>("SELECT id, name FROM folder")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_feeds(&self) -> Result<Vec<Feed>, RssError> {
        let rows = sqlx::query_as::<_, Feed>(
            "SELECT id, name, url, title, folder_id, faviconLink, link FROM feed",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn query_items(&self, query: &ItemQuery) -> Result<Vec<Item>, RssError> {
        let mut qb = QueryBuilder::<Sqlite>::new(ITEM_SELECT);

        match query.selector {
            ItemSelector::Feed(feed_id) => {
                qb.push(" AND feed_id = ").push_bind(feed_id);
            }
            ItemSelector::Folder(folder_id) => {
                qb.push(" AND feed_id IN (SELECT id FROM feed WHERE folder_id = ")
                    .push_bind(folder_id)
                    .push(")");
            }
            ItemSelector::Starred => {
                qb.push(" AND starred = 1");
            }
            ItemSelector::All => {}
        }

        if let Some(offset) = query.offset.filter(|o| *o > 0) {
            qb.push(" AND id <= ").push_bind(offset);
        }
        if !query.get_read {
            qb.push(" AND read = 0");
        }
        if let Some(since) = query.modified_since {
            qb.push(" AND ")
                .push(UPDATED_EPOCH)
                .push(" >= ")
                .push_bind(since);
        }

        let direction = if query.oldest_first { "ASC" } else { "DESC" };
        qb.push(" ORDER BY ")
            .push(PUB_DATE_EPOCH)
            .push(format!(" {direction}, id {direction}"));

        if let Some(limit) = query.batch_size.filter(|b| *b > 0) {
            qb.push(" LIMIT ").push_bind(limit);
        }

        let rows = qb.build_query_as::<Item>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Set the read flag on every listed item. Returns the number of rows touched.
    ///
    /// Large id lists are split into chunks applied in one transaction.
    pub async fn set_read(&self, ids: &[i64], read: bool) -> Result<u64, RssError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let now = Utc::now();
        let mut touched = 0;
        let mut tx = self.pool.begin().await?;
        for chunk in ids.chunks(MUTATION_CHUNK) {
            let mut qb = QueryBuilder::<Sqlite>::new("UPDATE item SET read = ");
            qb.push_bind(read)
                .push(", updated = ")
                .push_bind(now)
                .push(" WHERE id IN (");
            let mut list = qb.separated(", ");
            for id in chunk {
                list.push_bind(*id);
            }
            list.push_unseparated(")");
            touched += qb.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;
        Ok(touched)
    }

    /// Mark unread items of a feed up to `newest_item_id` as read.
    pub async fn mark_feed_read(&self, feed_id: i64, newest_item_id: i64) -> Result<u64, RssError> {
        let res = sqlx::query(
            "UPDATE item SET read = 1, updated = ? WHERE feed_id = ? AND id <= ? AND read = 0",
        )
        .bind(Utc::now())
        .bind(feed_id)
        .bind(newest_item_id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    /// Set the starred flag on items addressed by `(feed_id, guid)`.
    pub async fn set_starred(&self, refs: &[ItemRef], starred: bool) -> Result<u64, RssError> {
        if refs.is_empty() {
            return Ok(0);
        }
        let now = Utc::now();
        let mut touched = 0;
        let mut tx = self.pool.begin().await?;
        for chunk in refs.chunks(MUTATION_CHUNK) {
            let mut qb = QueryBuilder::<Sqlite>::new("UPDATE item SET starred = ");
            qb.push_bind(starred)
                .push(", updated = ")
                .push_bind(now)
                .push(" WHERE (feed_id, guid) IN (VALUES ");
            let mut rows = qb.separated(", ");
            for item in chunk {
                rows.push("(")
                    .push_bind_unseparated(item.feed_id)
                    .push_unseparated(", ")
                    .push_bind_unseparated(item.guid.as_str())
                    .push_unseparated(")");
            }
            rows.push_unseparated(")");
            touched += qb.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use tempfile::TempDir;

    async fn open() -> (TempDir, FeedStorage) {
        let dir = tempfile::tempdir().unwrap();
        let pool = connect(&dir.path().join("rss.db")).await.unwrap();
        let storage = FeedStorage::new(pool);
        storage.init_schema().await.unwrap();
        (dir, storage)
    }

    fn folders(names: &[&str]) -> Vec<FolderSeed> {
        names
            .iter()
            .map(|n| FolderSeed {
                name: n.to_string(),
            })
            .collect()
    }

    fn feed(name: &str, url: &str, folder: &str) -> FeedSeed {
        FeedSeed {
            name: name.into(),
            url: url.into(),
            folder: folder.into(),
        }
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    async fn insert_item(
        storage: &FeedStorage,
        id: i64,
        feed_id: i64,
        pub_date: i64,
        read: bool,
        starred: bool,
    ) {
        sqlx::query(
            "INSERT INTO item (id, updated, guid, url, title, author, content, pubDate, feed_id, read, starred)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(ts(1_000))
        .bind(format!("guid-{id}"))
        .bind(format!("http://example.com/{id}"))
        .bind(format!("title {id}"))
        .bind("author")
        .bind("<p>body</p>")
        .bind(ts(pub_date))
        .bind(feed_id)
        .bind(read)
        .bind(starred)
        .execute(storage.pool())
        .await
        .unwrap();
    }

    /// Folders Tech(0), News(1); feeds a(0)->Tech, b(1)->Tech, c(2)->News.
    async fn fixture() -> (TempDir, FeedStorage) {
        let (dir, storage) = open().await;
        storage
            .seed(
                &folders(&["Tech", "News"]),
                &[
                    feed("a", "http://a.example/rss", "Tech"),
                    feed("b", "http://b.example/rss", "Tech"),
                    feed("c", "http://c.example/rss", "News"),
                ],
            )
            .await
            .unwrap();
        insert_item(&storage, 1, 0, 100, false, false).await;
        insert_item(&storage, 2, 1, 300, true, true).await;
        insert_item(&storage, 3, 2, 200, false, true).await;
        insert_item(&storage, 4, 0, 400, true, false).await;
        (dir, storage)
    }

    fn ids(items: &[Item]) -> Vec<i64> {
        items.iter().map(|i| i.id).collect()
    }

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let (_dir, storage) = open().await;
        storage.init_schema().await.unwrap();
        assert!(storage.list_folders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn seed_assigns_positional_ids_and_links_folders() {
        let (_dir, storage) = open().await;
        let summary = storage
            .seed(
                &folders(&["Tech"]),
                &[feed("Example", "http://example.com/rss", "Tech")],
            )
            .await
            .unwrap();
        assert_eq!(summary, SeedSummary { folders: 1, feeds: 1 });

        let folders = storage.list_folders().await.unwrap();
        assert_eq!(
            folders,
            vec![Folder {
                id: 0,
                name: "Tech".into()
            }]
        );
        let feeds = storage.list_feeds().await.unwrap();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].folder_id, 0);
        assert_eq!(feeds[0].title, None);
        assert_eq!(feeds[0].favicon_link, None);
    }

    #[tokio::test]
    async fn reseeding_inserts_nothing() {
        let (_dir, storage) = open().await;
        let f = folders(&["Tech", "News"]);
        let feeds = [feed("Example", "http://example.com/rss", "News")];
        storage.seed(&f, &feeds).await.unwrap();
        let again = storage.seed(&f, &feeds).await.unwrap();
        assert_eq!(again, SeedSummary::default());
        assert_eq!(storage.list_folders().await.unwrap().len(), 2);
        assert_eq!(storage.list_feeds().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn seed_with_unknown_folder_rolls_back() {
        let (_dir, storage) = open().await;
        let err = storage
            .seed(
                &folders(&["Tech"]),
                &[feed("Orphan", "http://example.com/rss", "Missing")],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RssError::Seed(_)));
        assert!(storage.list_folders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn all_items_returned_once_newest_first() {
        let (_dir, storage) = fixture().await;
        let items = storage
            .query_items(&ItemQuery::new(ItemSelector::All))
            .await
            .unwrap();
        assert_eq!(ids(&items), vec![4, 2, 3, 1]);
        assert_eq!(items[3].pub_date, ts(100));
        assert!(items[0].read);
    }

    #[tokio::test]
    async fn selectors_filter_items() {
        let (_dir, storage) = fixture().await;

        let by_feed = storage
            .query_items(&ItemQuery::new(ItemSelector::Feed(0)))
            .await
            .unwrap();
        assert_eq!(ids(&by_feed), vec![4, 1]);

        let by_folder = storage
            .query_items(&ItemQuery::new(ItemSelector::Folder(0)))
            .await
            .unwrap();
        assert_eq!(ids(&by_folder), vec![4, 2, 1]);

        let other_folder = storage
            .query_items(&ItemQuery::new(ItemSelector::Folder(1)))
            .await
            .unwrap();
        assert_eq!(ids(&other_folder), vec![3]);

        let starred = storage
            .query_items(&ItemQuery::new(ItemSelector::Starred))
            .await
            .unwrap();
        assert_eq!(ids(&starred), vec![2, 3]);
    }

    #[tokio::test]
    async fn paging_and_read_filters() {
        let (_dir, storage) = fixture().await;

        let mut q = ItemQuery::new(ItemSelector::All);
        q.oldest_first = true;
        q.batch_size = Some(2);
        assert_eq!(ids(&storage.query_items(&q).await.unwrap()), vec![1, 3]);

        let mut q = ItemQuery::new(ItemSelector::All);
        q.offset = Some(2);
        assert_eq!(ids(&storage.query_items(&q).await.unwrap()), vec![2, 1]);

        let mut q = ItemQuery::new(ItemSelector::All);
        q.get_read = false;
        assert_eq!(ids(&storage.query_items(&q).await.unwrap()), vec![3, 1]);

        let mut q = ItemQuery::new(ItemSelector::All);
        q.batch_size = Some(0);
        q.offset = Some(-1);
        assert_eq!(storage.query_items(&q).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn mutations_bump_updated_for_incremental_sync() {
        let (_dir, storage) = fixture().await;
        let since = Utc::now().timestamp();

        let mut q = ItemQuery::new(ItemSelector::All);
        q.modified_since = Some(since);
        assert!(storage.query_items(&q).await.unwrap().is_empty());

        assert_eq!(storage.set_read(&[1, 3], true).await.unwrap(), 2);
        let changed = storage.query_items(&q).await.unwrap();
        assert_eq!(ids(&changed), vec![3, 1]);
        assert!(changed.iter().all(|i| i.read));

        let mut q = ItemQuery::new(ItemSelector::All);
        q.modified_since = Some(500);
        assert_eq!(storage.query_items(&q).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn mark_feed_read_respects_newest_item_id() {
        let (_dir, storage) = fixture().await;
        storage.set_read(&[4], false).await.unwrap();

        assert_eq!(storage.mark_feed_read(0, 1).await.unwrap(), 1);
        let mut q = ItemQuery::new(ItemSelector::Feed(0));
        q.get_read = false;
        assert_eq!(ids(&storage.query_items(&q).await.unwrap()), vec![4]);
    }

    #[tokio::test]
    async fn star_by_feed_and_guid() {
        let (_dir, storage) = fixture().await;
        let refs = [
            ItemRef {
                feed_id: 0,
                guid: "guid-1".into(),
            },
            ItemRef {
                feed_id: 2,
                guid: "guid-1".into(),
            },
        ];
        assert_eq!(storage.set_starred(&refs, true).await.unwrap(), 1);

        let starred = storage
            .query_items(&ItemQuery::new(ItemSelector::Starred))
            .await
            .unwrap();
        assert_eq!(ids(&starred), vec![2, 3, 1]);

        let unstar = [ItemRef {
            feed_id: 1,
            guid: "guid-2".into(),
        }];
        assert_eq!(storage.set_starred(&unstar, false).await.unwrap(), 1);
        assert_eq!(storage.set_starred(&[], false).await.unwrap(), 0);
        assert_eq!(storage.set_read(&[], false).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn ordering_normalizes_mixed_pub_dates() {
        let (_dir, storage) = open().await;
        storage
            .seed(&folders(&["Tech"]), &[feed("a", "http://a.example/rss", "Tech")])
            .await
            .unwrap();
        // Integer seconds, naive UTC text, and text with an offset.
        let rows: [(i64, &str); 3] = [
            (1, "2000000000"),
            (2, "'2024-01-01 00:00:00'"),
            (3, "'2024-01-01 01:00:00+05:00'"),
        ];
        for (id, pub_date) in rows {
            sqlx::query(&format!(
                "INSERT INTO item (id, updated, guid, url, title, author, content, pubDate, feed_id, read, starred)
                 VALUES ({id}, 1000, 'g{id}', '', '', '', '', {pub_date}, 0, 0, 0)"
            ))
            .execute(storage.pool())
            .await
            .unwrap();
        }

        let mut q = ItemQuery::new(ItemSelector::All);
        assert_eq!(ids(&storage.query_items(&q).await.unwrap()), vec![1, 2, 3]);

        q.batch_size = Some(1);
        assert_eq!(ids(&storage.query_items(&q).await.unwrap()), vec![1]);

        q.batch_size = None;
        q.oldest_first = true;
        assert_eq!(ids(&storage.query_items(&q).await.unwrap()), vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn large_mutation_batches_apply_atomically() {
        let (_dir, storage) = fixture().await;

        let mut refs: Vec<ItemRef> = (0..1500)
            .map(|i| ItemRef {
                feed_id: 0,
                guid: format!("missing-{i}"),
            })
            .collect();
        refs.push(ItemRef {
            feed_id: 0,
            guid: "guid-4".into(),
        });
        assert_eq!(storage.set_starred(&refs, true).await.unwrap(), 1);
        assert_eq!(storage.set_starred(&refs, false).await.unwrap(), 1);

        let mut many: Vec<i64> = (1_000..41_000).collect();
        many.extend([1, 3]);
        assert_eq!(storage.set_read(&many, true).await.unwrap(), 2);

        let mut q = ItemQuery::new(ItemSelector::All);
        q.get_read = false;
        assert!(storage.query_items(&q).await.unwrap().is_empty());
    }
}
