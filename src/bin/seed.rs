use std::collections::BTreeMap;

use chrono::Utc;
use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    ids::new_document_id,
    models::{
        Admin, Product, ProductSettings, ProductType, VariantCombination, VariantDefinition,
        VariantOption,
    },
    services::auth_service::hash_password,
    store::{AdminStore, PgStore, ProductStore, SettingsStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let conn = create_orm_conn(&config.database_url).await?;
    run_migrations(&conn).await?;
    let store = PgStore::new(conn);

    let password = std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
    ensure_admin(&store, &config.store.admin_email, &password).await?;
    ensure_settings(&store).await?;
    seed_products(&store).await?;

    println!("Seed completed");
    Ok(())
}

async fn ensure_admin(store: &PgStore, email: &str, password: &str) -> anyhow::Result<()> {
    if store.find_admin_by_email(email).await?.is_some() {
        println!("Admin {email} already exists");
        return Ok(());
    }

    let password_hash = hash_password(password)?;
    store
        .insert_admin(&Admin {
            id: new_document_id(),
            name: "Store Admin".into(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now(),
        })
        .await?;

    println!("Created admin {email}");
    Ok(())
}

fn option(value: &str, meta: Option<&str>) -> VariantOption {
    VariantOption {
        id: new_document_id(),
        value: value.to_string(),
        meta: meta.map(str::to_string),
    }
}

async fn ensure_settings(store: &PgStore) -> anyhow::Result<()> {
    if store.find_settings().await?.is_some() {
        println!("Product settings already exist");
        return Ok(());
    }

    let now = Utc::now();
    let settings = ProductSettings {
        id: new_document_id(),
        categories: vec!["apparel".into(), "mugs".into(), "stickers".into()],
        variants: vec![
            VariantDefinition {
                id: new_document_id(),
                name: "Size".into(),
                options: vec![option("S", None), option("M", None), option("L", None)],
            },
            VariantDefinition {
                id: new_document_id(),
                name: "Color".into(),
                options: vec![
                    option("Black", Some("#000000")),
                    option("Orange", Some("#f74c00")),
                ],
            },
        ],
        product_card_type: Some("classic".into()),
        created_at: now,
        updated_at: now,
    };
    store.insert_settings(&settings).await?;

    println!("Seeded product settings");
    Ok(())
}

async fn seed_products(store: &PgStore) -> anyhow::Result<()> {
    let simple = [
        ("Ferris Mug", "Coffee tastes better with Ferris", "mugs", 499.0, 399.0, 100),
        ("Rust Sticker Pack", "Decorate your laptop", "stickers", 199.0, 149.0, 200),
    ];

    for (name, description, category, regular_price, sale_price, stock) in simple {
        insert_if_missing(
            store,
            product(name, description, category, regular_price, sale_price, stock, Vec::new()),
        )
        .await?;
    }

    let sizes = ["S", "M", "L"]
        .into_iter()
        .map(|size| VariantCombination {
            id: new_document_id(),
            attributes: BTreeMap::from([("Size".to_string(), size.to_string())]),
            images: Vec::new(),
            regular_price: Some(1499.0),
            sale_price: Some(1299.0),
            tax: Some(12.0),
            stock: Some(20),
        })
        .collect();
    let mut hoodie = product(
        "Async Hoodie",
        "Warm hoodie for long compile times",
        "apparel",
        1499.0,
        1299.0,
        60,
        sizes,
    );
    hoodie.product_type = ProductType::Variable;
    hoodie.trending = true;
    insert_if_missing(store, hoodie).await?;

    println!("Seeded products");
    Ok(())
}

fn product(
    name: &str,
    description: &str,
    category: &str,
    regular_price: f64,
    sale_price: f64,
    stock: i64,
    variants: Vec<VariantCombination>,
) -> Product {
    let now = Utc::now();
    Product {
        id: new_document_id(),
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        product_type: ProductType::Simple,
        images: Vec::new(),
        regular_price,
        sale_price,
        tax: 12.0,
        stock,
        variants,
        trending: false,
        created_at: now,
        updated_at: now,
    }
}

async fn insert_if_missing(store: &PgStore, product: Product) -> anyhow::Result<()> {
    if store.find_product_by_name(&product.name).await?.is_some() {
        return Ok(());
    }
    store.insert_product(&product).await?;
    println!("Inserted {}", product.name);
    Ok(())
}
