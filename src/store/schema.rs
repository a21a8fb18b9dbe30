/// Table definitions, applied with `CREATE ... IF NOT EXISTS` so they are safe to rerun
pub const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        type TEXT,
        status TEXT NOT NULL DEFAULT 'active',
        vendor TEXT,
        brand TEXT,
        category TEXT,
        collection TEXT,
        tags TEXT DEFAULT '[]',
        price REAL DEFAULT 0,
        compare_price REAL DEFAULT 0,
        cost REAL DEFAULT 0,
        sku TEXT,
        barcode TEXT,
        track_inventory INTEGER DEFAULT 0,
        options TEXT DEFAULT '[]',
        modifiers TEXT DEFAULT '[]',
        metafields TEXT DEFAULT '[]',
        medias TEXT DEFAULT '[]',
        seo TEXT DEFAULT '{}',
        stores TEXT DEFAULT '[]',
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS inventory (
        id TEXT PRIMARY KEY,
        product_id TEXT NOT NULL,
        sku TEXT,
        barcode TEXT,
        option1 TEXT,
        option2 TEXT,
        option3 TEXT,
        image TEXT,
        price REAL DEFAULT 0,
        compare_price REAL DEFAULT 0,
        cost REAL DEFAULT 0,
        quantity INTEGER DEFAULT 0,
        committed INTEGER DEFAULT 0,
        reorder_level INTEGER DEFAULT 0,
        reorder_qty INTEGER DEFAULT 0,
        warehouse TEXT,
        expiry TEXT,
        batch_no TEXT,
        store_id TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_inventory_product ON inventory(product_id)",
    r#"CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        image TEXT,
        notes TEXT,
        parent_id TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS collections (
        id TEXT PRIMARY KEY, name TEXT NOT NULL, image TEXT, notes TEXT,
        created_at TEXT NOT NULL, updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS vendors (
        id TEXT PRIMARY KEY, name TEXT NOT NULL, image TEXT, notes TEXT,
        created_at TEXT NOT NULL, updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS brands (
        id TEXT PRIMARY KEY, name TEXT NOT NULL, image TEXT, notes TEXT,
        created_at TEXT NOT NULL, updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS tags (
        id TEXT PRIMARY KEY, name TEXT NOT NULL, image TEXT, notes TEXT,
        created_at TEXT NOT NULL, updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS options (
        id TEXT PRIMARY KEY, title TEXT NOT NULL, value TEXT, identifier TEXT, parent_id TEXT,
        created_at TEXT NOT NULL, updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS metafields (
        id TEXT PRIMARY KEY, title TEXT NOT NULL, value TEXT, group_name TEXT, kind TEXT,
        created_at TEXT NOT NULL, updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS modifiers (
        id TEXT PRIMARY KEY, title TEXT NOT NULL, value TEXT, kind TEXT, identifier TEXT,
        created_at TEXT NOT NULL, updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS stores (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        address TEXT,
        city TEXT,
        phone TEXT,
        email TEXT,
        currency TEXT,
        timezone TEXT,
        image TEXT,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
];
