//! SQL DDL for the folder/feed/item store.
//! Column names match the tables the external ingestion process writes.

/// SQLite schema with:
/// - `folder.name` UNIQUE
/// - `feed.name` UNIQUE, `feed.folder_id` -> `folder.id`
/// - `item.guid` UNIQUE across the whole store, `item.feed_id` -> `feed.id`
/// - `read`/`starred` stored as INTEGER 0/1
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS "folder" (
    "id" INTEGER NOT NULL PRIMARY KEY,
    "updated" DATETIME NOT NULL,
    "name" VARCHAR(255) NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS "folder_name" ON "folder" ("name");

CREATE TABLE IF NOT EXISTS "feed" (
    "id" INTEGER NOT NULL PRIMARY KEY,
    "updated" DATETIME NOT NULL,
    "name" VARCHAR(255) NOT NULL,
    "url" VARCHAR(255) NOT NULL,
    "folder_id" INTEGER NOT NULL,
    "link" VARCHAR(255),
    "title" VARCHAR(255),
    "faviconLink" VARCHAR(255),
    FOREIGN KEY ("folder_id") REFERENCES "folder" ("id")
);

CREATE UNIQUE INDEX IF NOT EXISTS "feed_name" ON "feed" ("name");
CREATE INDEX IF NOT EXISTS "feed_folder_id" ON "feed" ("folder_id");

CREATE TABLE IF NOT EXISTS "item" (
    "id" INTEGER NOT NULL PRIMARY KEY,
    "updated" DATETIME NOT NULL,
    "guid" VARCHAR(255) NOT NULL,
    "url" VARCHAR(255) NOT NULL,
    "title" VARCHAR(255) NOT NULL,
    "author" VARCHAR(255) NOT NULL,
    "content" TEXT NOT NULL,
    "pubDate" DATETIME NOT NULL,
    "feed_id" INTEGER NOT NULL,
    "read" INTEGER NOT NULL,
    "starred" INTEGER NOT NULL,
    FOREIGN KEY ("feed_id") REFERENCES "feed" ("id")
);

CREATE UNIQUE INDEX IF NOT EXISTS "item_guid" ON "item" ("guid");
CREATE INDEX IF NOT EXISTS "item_feed_id" ON "item" ("feed_id");
"#;
