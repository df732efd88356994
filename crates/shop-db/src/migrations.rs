use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (accounts, catalog, orders)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              TEXT PRIMARY KEY,
                username        TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                name            TEXT NOT NULL,
                phone           TEXT NOT NULL,
                email           TEXT,
                role            TEXT NOT NULL DEFAULT 'user',
                business_number TEXT,
                is_active       INTEGER NOT NULL DEFAULT 1,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_users_phone ON users(phone);

            CREATE TABLE business_profiles (
                id                  TEXT PRIMARY KEY,
                user_id             TEXT NOT NULL REFERENCES users(id),
                business_name       TEXT NOT NULL,
                business_number     TEXT NOT NULL,
                representative_name TEXT,
                office_address      TEXT,
                storage_address     TEXT,
                status              TEXT NOT NULL DEFAULT 'pending',
                is_main             INTEGER NOT NULL DEFAULT 0,
                rejection_reason    TEXT,
                approved_at         TEXT,
                approved_by         TEXT REFERENCES users(id),
                created_at          TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_profiles_user ON business_profiles(user_id);

            -- One main profile per user
            CREATE UNIQUE INDEX idx_profiles_main
                ON business_profiles(user_id) WHERE is_main = 1;

            CREATE TABLE categories (
                id            TEXT PRIMARY KEY,
                parent_id     TEXT REFERENCES categories(id),
                name          TEXT NOT NULL,
                code          TEXT UNIQUE,
                depth         INTEGER NOT NULL DEFAULT 0,
                display_order INTEGER NOT NULL DEFAULT 0,
                created_at    TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE products (
                id                      TEXT PRIMARY KEY,
                slug                    TEXT NOT NULL UNIQUE,
                category_id             TEXT NOT NULL REFERENCES categories(id),
                seller_id               TEXT NOT NULL REFERENCES users(id),
                item_name               TEXT NOT NULL,
                item_condition          TEXT NOT NULL,
                spec                    TEXT,
                unit_price              INTEGER NOT NULL,
                sale_unit               TEXT NOT NULL,
                stock_quantity          INTEGER NOT NULL DEFAULT 0,
                loading_address         TEXT,
                loading_address_display TEXT,
                status                  TEXT NOT NULL DEFAULT 'pending',
                rejection_reason        TEXT,
                is_displayed            INTEGER NOT NULL DEFAULT 0,
                description             TEXT,
                created_at              TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_products_category ON products(category_id);
            CREATE INDEX idx_products_seller ON products(seller_id);

            CREATE TABLE product_images (
                id            TEXT PRIMARY KEY,
                product_id    TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                image_url     TEXT NOT NULL,
                display_order INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_product_images_product ON product_images(product_id, display_order);

            CREATE TABLE orders (
                id                         TEXT PRIMARY KEY,
                order_number               TEXT NOT NULL UNIQUE,
                buyer_id                   TEXT NOT NULL REFERENCES users(id),
                seller_id                  TEXT NOT NULL REFERENCES users(id),
                order_type                 TEXT NOT NULL DEFAULT 'platform',
                truck_tonnage              TEXT,
                truck_type                 TEXT,
                shipping_loading_address   TEXT,
                shipping_unloading_address TEXT,
                recipient_name             TEXT,
                recipient_phone            TEXT,
                total_amount               INTEGER NOT NULL,
                status                     TEXT NOT NULL DEFAULT 'pending',
                payment_status             TEXT NOT NULL DEFAULT 'unpaid',
                order_memo                 TEXT,
                admin_memo                 TEXT,
                delivery_started_at        TEXT,
                delivery_completed_at      TEXT,
                carrier_info               TEXT,
                created_at                 TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_orders_buyer ON orders(buyer_id, created_at);
            CREATE INDEX idx_orders_seller ON orders(seller_id, created_at);

            CREATE TABLE order_items (
                id                         TEXT PRIMARY KEY,
                order_id                   TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
                product_id                 TEXT NOT NULL,
                product_name_snapshot      TEXT NOT NULL,
                product_condition_snapshot TEXT NOT NULL,
                price_snapshot             INTEGER NOT NULL,
                quantity                   INTEGER NOT NULL,
                subtotal                   INTEGER NOT NULL
            );

            CREATE INDEX idx_order_items_order ON order_items(order_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (registration requests, business licenses)");
        conn.execute_batch(
            "
            CREATE TABLE registration_requests (
                id                     TEXT PRIMARY KEY,
                email                  TEXT NOT NULL,
                phone                  TEXT,
                business_license_image TEXT,
                bank_statement_image   TEXT,
                business_number        TEXT,
                bank_name              TEXT,
                bank_account_number    TEXT,
                notes                  TEXT,
                status                 TEXT NOT NULL DEFAULT 'pending',
                created_at             TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE business_licenses (
                id         TEXT PRIMARY KEY,
                user_id    TEXT NOT NULL REFERENCES users(id),
                file_url   TEXT NOT NULL,
                status     TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_licenses_user ON business_licenses(user_id);

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 2);
    }
}
