use std::sync::Arc;
use umkm_cart::{CartService, CartStore, Money, ProductRef};
use umkm_cart::service::StaticCatalog;

pub fn product(id: &str, price: i64, vendor: &str) -> ProductRef {
    ProductRef {
        product_id: id.to_string(),
        name: format!("Produk {id}"),
        price: Money::from_rupiah(price),
        image: format!("https://img.example/{id}.jpg"),
        vendor_id: vendor.to_lowercase().replace(' ', "-"),
        vendor_name: vendor.to_string(),
    }
}

pub fn catalog() -> StaticCatalog {
    StaticCatalog::new([
        product("A", 10000, "Warung Bu Sri"),
        product("B", 5000, "Kopi Pak Budi"),
        product("X", 7500, "Batik Solo"),
    ])
}

pub async fn service() -> Arc<CartService> {
    let store = CartStore::connect("sqlite::memory:", 1).await.expect("in-memory store");
    Arc::new(CartService::new(store, Arc::new(catalog())))
}
