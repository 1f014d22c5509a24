//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building,
//! plus the DDL each backend runs at startup.

use sea_query::Iden;

/// Users table schema.
#[derive(Iden, Clone, Copy)]
pub enum Users {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "surname"]
    Surname,
    #[iden = "email"]
    Email,
    #[iden = "password_hash"]
    PasswordHash,
    #[iden = "role"]
    Role,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

/// Products table schema.
#[derive(Iden, Clone, Copy)]
pub enum Products {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "category"]
    Category,
    #[iden = "description"]
    Description,
    #[iden = "image_url"]
    ImageUrl,
    #[iden = "price"]
    Price,
    #[iden = "is_active"]
    IsActive,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

/// Orders table schema.
#[derive(Iden, Clone, Copy)]
pub enum Orders {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "customer_id"]
    CustomerId,
    #[iden = "status"]
    Status,
    #[iden = "total"]
    Total,
    #[iden = "note"]
    Note,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

/// Order items table schema.
#[derive(Iden, Clone, Copy)]
pub enum OrderItems {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "order_id"]
    OrderId,
    #[iden = "position"]
    Position,
    #[iden = "product_id"]
    ProductId,
    #[iden = "product_name_snapshot"]
    ProductNameSnapshot,
    #[iden = "unit_price_snapshot"]
    UnitPriceSnapshot,
    #[iden = "quantity"]
    Quantity,
    #[iden = "line_amount"]
    LineAmount,
}

/// Timestamps are stored as fixed-width RFC 3339 UTC text so that string
/// comparison orders them chronologically.
pub fn timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// SQLite DDL, one statement per entry.
pub const SQLITE_SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        surname TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        description TEXT NOT NULL,
        image_url TEXT NOT NULL DEFAULT '',
        price INTEGER NOT NULL CHECK (price >= 0),
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products(category)",
    r#"CREATE TABLE IF NOT EXISTS orders (
        id TEXT PRIMARY KEY,
        customer_id TEXT NOT NULL REFERENCES users(id),
        status TEXT NOT NULL,
        total INTEGER NOT NULL,
        note TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders(customer_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status)",
    "CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at)",
    r#"CREATE TABLE IF NOT EXISTS order_items (
        id TEXT PRIMARY KEY,
        order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        product_id TEXT NOT NULL,
        product_name_snapshot TEXT NOT NULL,
        unit_price_snapshot INTEGER NOT NULL,
        quantity INTEGER NOT NULL CHECK (quantity >= 1),
        line_amount INTEGER NOT NULL,
        UNIQUE (order_id, position)
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id)",
];

/// PostgreSQL DDL, one statement per entry.
pub const POSTGRES_SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        surname TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        description TEXT NOT NULL,
        image_url TEXT NOT NULL DEFAULT '',
        price BIGINT NOT NULL CHECK (price >= 0),
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products(category)",
    r#"CREATE TABLE IF NOT EXISTS orders (
        id TEXT PRIMARY KEY,
        customer_id TEXT NOT NULL REFERENCES users(id),
        status TEXT NOT NULL,
        total BIGINT NOT NULL,
        note TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders(customer_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status)",
    "CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at)",
    r#"CREATE TABLE IF NOT EXISTS order_items (
        id TEXT PRIMARY KEY,
        order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        position BIGINT NOT NULL,
        product_id TEXT NOT NULL,
        product_name_snapshot TEXT NOT NULL,
        unit_price_snapshot BIGINT NOT NULL,
        quantity BIGINT NOT NULL CHECK (quantity >= 1),
        line_amount BIGINT NOT NULL,
        UNIQUE (order_id, position)
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id)",
];
