use diesel::insert_into;
use diesel::prelude::*;
use rust_decimal::Decimal;
use rust_shop_api::establish_connection;
use rust_shop_api::schema;
use schema::categories;
use schema::categories::dsl::*;
use schema::product_sizes;
use schema::product_sizes::dsl::*;
use schema::products;
use schema::products::dsl::*;
use schema::sizes;
use schema::sizes::dsl::*;
use serde::Deserialize;
use std::fs;
use std::io::Read;

#[derive(Deserialize, Insertable)]
#[diesel(table_name = categories)]
struct CategorySeed {
    name: String,
    slug: String,
    description: Option<String>,
    parent_id: Option<i32>,
    is_active: bool,
}

#[derive(Deserialize, Insertable)]
#[diesel(table_name = sizes)]
struct SizeSeed {
    code: String,
    name: String,
    description: Option<String>,
}

#[derive(Deserialize, Insertable)]
#[diesel(table_name = products)]
struct ProductSeed {
    name: String,
    slug: String,
    description: Option<String>,
    image: Option<String>,
    price: Decimal,
    old_price: Option<Decimal>,
    category_id: i32,
    is_active: bool,
    is_featured: bool,
}

#[derive(Deserialize, Insertable)]
#[diesel(table_name = product_sizes)]
struct ProductSizeSeed {
    product_id: i32,
    size_id: i32,
    price: Option<Decimal>,
    old_price: Option<Decimal>,
    in_stock: bool,
    stock_quantity: i32,
    sku: Option<String>,
}

fn read_fixture(path: &str) -> String {
    let mut raw = String::new();
    fs::File::open(path)
        .expect("can't open")
        .read_to_string(&mut raw)
        .unwrap();
    raw
}

fn main() -> std::io::Result<()> {
    let connection = &mut establish_connection();
    let categories_json = read_fixture("src/bin/categories.json");
    let sizes_json = read_fixture("src/bin/sizes.json");
    let products_json = read_fixture("src/bin/products.json");
    let product_sizes_json = read_fixture("src/bin/product_sizes.json");

    insert_into(categories)
        .values(serde_json::from_str::<Vec<CategorySeed>>(&categories_json).unwrap())
        .execute(connection)
        .unwrap();

    insert_into(sizes)
        .values(serde_json::from_str::<Vec<SizeSeed>>(&sizes_json).unwrap())
        .execute(connection)
        .unwrap();

    insert_into(products)
        .values(serde_json::from_str::<Vec<ProductSeed>>(&products_json).unwrap())
        .execute(connection)
        .unwrap();

    insert_into(product_sizes)
        .values(serde_json::from_str::<Vec<ProductSizeSeed>>(&product_sizes_json).unwrap())
        .execute(connection)
        .unwrap();
    Ok(())
}
