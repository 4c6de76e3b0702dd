// storefront/src/seed.rs

use tracing::info;

use crate::errors::Result;
use crate::models::{Category, Money, Product, ProductDraft};
use crate::store::ProductStore;

struct SampleProduct {
  name: &'static str,
  price_cents: i64,
  image_url: &'static str,
  description: &'static str,
  category: Category,
  stock: i32,
}

const SAMPLE_PRODUCTS: [SampleProduct; 5] = [
  SampleProduct {
    name: "Wireless Noise-Cancelling Headphones",
    price_cents: 29999,
    image_url: "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=800&q=80",
    description: "Premium over-ear headphones with active noise cancellation and 30-hour battery life",
    category: Category::Electronics,
    stock: 25,
  },
  SampleProduct {
    name: "Smart Fitness Watch",
    price_cents: 24999,
    image_url: "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=800&q=80",
    description: "Track your health and fitness with advanced sensors and GPS",
    category: Category::Electronics,
    stock: 40,
  },
  SampleProduct {
    name: "Premium Leather Jacket",
    price_cents: 39999,
    image_url: "https://images.unsplash.com/photo-1551028719-00167b16eac5?w=800&q=80",
    description: "Handcrafted genuine leather jacket with timeless design",
    category: Category::Clothing,
    stock: 15,
  },
  SampleProduct {
    name: "Minimalist Sneakers",
    price_cents: 12999,
    image_url: "https://images.unsplash.com/photo-1549298916-b41d501d3772?w=800&q=80",
    description: "Clean design meets comfort in these versatile everyday sneakers",
    category: Category::Clothing,
    stock: 60,
  },
  SampleProduct {
    name: "Ergonomic Office Chair",
    price_cents: 44999,
    image_url: "https://images.unsplash.com/photo-1505843513577-22bb7d21e455?w=800&q=80",
    description: "Premium mesh chair with lumbar support and adjustable armrests",
    category: Category::Home,
    stock: 20,
  },
];

pub fn sample_catalog() -> Vec<ProductDraft> {
  SAMPLE_PRODUCTS
    .iter()
    .map(|p| ProductDraft {
      name: p.name.to_string(),
      price: Money::from_cents(p.price_cents),
      image_url: p.image_url.to_string(),
      description: Some(p.description.to_string()),
      category: p.category,
      stock: p.stock,
    })
    .collect()
}

/// Replaces the whole catalog with the sample products.
pub async fn seed_catalog(products: &dyn ProductStore) -> Result<Vec<Product>> {
  let cleared = products.clear().await?;
  info!(cleared, "Cleared existing products.");
  let inserted = products.insert_many(sample_catalog()).await?;
  info!(inserted = inserted.len(), "Sample products inserted.");
  Ok(inserted)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ProductQuery;
  use crate::store::InMemoryProductStore;

  #[tokio::test]
  async fn seeding_replaces_the_catalog() {
    let store = InMemoryProductStore::new();
    seed_catalog(&store).await.unwrap();
    seed_catalog(&store).await.unwrap();

    let products = store.list(&ProductQuery::default()).await.unwrap();
    assert_eq!(products.len(), 5);
    assert!(products.iter().all(|p| p.stock > 0));
  }
}
