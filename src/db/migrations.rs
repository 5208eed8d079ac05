//! Database migrations
//!
//! Code-embedded migrations, applied in version order and recorded in a
//! `schema_migrations` table. Running them twice is a no-op.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

/// A single migration step
#[derive(Debug, Clone)]
pub struct Migration {
    /// Unique, ordered version number
    pub version: i64,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements to apply
    pub up: &'static str,
}

/// All migrations, embedded in the binary.
pub const MIGRATIONS: &[Migration] = &[
    // The page tree. details holds the kind-tagged JSON payload.
    Migration {
        version: 1,
        name: "create_pages",
        up: r#"
            CREATE TABLE IF NOT EXISTS pages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                parent_id INTEGER REFERENCES pages(id) ON DELETE CASCADE,
                position INTEGER NOT NULL DEFAULT 0,
                kind VARCHAR(20) NOT NULL,
                title VARCHAR(255) NOT NULL,
                slug VARCHAR(255) NOT NULL,
                live BOOLEAN NOT NULL DEFAULT 0,
                first_published_at TIMESTAMP,
                owner VARCHAR(100),
                details TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_pages_parent_id ON pages(parent_id);
            CREATE INDEX IF NOT EXISTS idx_pages_kind ON pages(kind);
            CREATE INDEX IF NOT EXISTS idx_pages_slug ON pages(slug);
        "#,
    },
    // Media library rows; binary storage lives elsewhere.
    Migration {
        version: 2,
        name: "create_media",
        up: r#"
            CREATE TABLE IF NOT EXISTS images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(255) NOT NULL,
                file VARCHAR(500) NOT NULL,
                width INTEGER NOT NULL,
                height INTEGER NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(255) NOT NULL,
                file VARCHAR(500) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
    },
    // Snippets: authors and categories live outside the page tree.
    Migration {
        version: 3,
        name: "create_snippets",
        up: r#"
            CREATE TABLE IF NOT EXISTS authors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL,
                website VARCHAR(500),
                image_id INTEGER REFERENCES images(id) ON DELETE SET NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(255) NOT NULL,
                slug VARCHAR(255) NOT NULL UNIQUE,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL,
                slug VARCHAR(100) NOT NULL UNIQUE
            );
        "#,
    },
    // Join tables. Deleting either side removes only the join row.
    Migration {
        version: 4,
        name: "create_page_relations",
        up: r#"
            CREATE TABLE IF NOT EXISTS page_tags (
                page_id INTEGER NOT NULL REFERENCES pages(id) ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                PRIMARY KEY (page_id, tag_id)
            );
            CREATE TABLE IF NOT EXISTS page_categories (
                page_id INTEGER NOT NULL REFERENCES pages(id) ON DELETE CASCADE,
                category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                PRIMARY KEY (page_id, category_id)
            );
            CREATE TABLE IF NOT EXISTS page_authors (
                page_id INTEGER NOT NULL REFERENCES pages(id) ON DELETE CASCADE,
                author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
                sort_order INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (page_id, author_id)
            );
            CREATE INDEX IF NOT EXISTS idx_page_tags_tag ON page_tags(tag_id);
            CREATE INDEX IF NOT EXISTS idx_page_categories_category ON page_categories(category_id);
        "#,
    },
    // One settings row per site.
    Migration {
        version: 5,
        name: "create_site_settings",
        up: r#"
            CREATE TABLE IF NOT EXISTS site_settings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                site VARCHAR(255) NOT NULL UNIQUE,
                facebook VARCHAR(500),
                twitter VARCHAR(500),
                youtube VARCHAR(500)
            );
        "#,
    },
];

/// Apply all pending migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;

    let applied: Vec<i64> = sqlx::query("SELECT version FROM schema_migrations")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?
        .into_iter()
        .map(|row| row.get::<i64, _>("version"))
        .collect();

    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }
        tracing::info!(
            "Applying migration {} ({})",
            migration.version,
            migration.name
        );

        // SQLite executes one statement at a time.
        for statement in migration
            .up
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            sqlx::query(statement).execute(pool).await.with_context(|| {
                format!(
                    "Migration {} ({}) failed",
                    migration.version, migration.name
                )
            })?;
        }

        sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(pool)
            .await
            .context("Failed to record migration")?;
    }

    Ok(())
}
