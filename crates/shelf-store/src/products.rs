//! Product queries.
//!
//! Prices are read back through `typeof()` because the column keeps any
//! non-integer text the AJAX endpoint stored.

use crate::db::Database;
use crate::error::StoreError;
use shelf_core::{Price, Product, ProductFields, ProductId, UserId};
use sqlx::FromRow;
use sqlx::sqlite::{Sqlite, SqliteArguments};

const SELECT_PRODUCT: &str = "SELECT id, name, CAST(price AS TEXT) AS price_text, \
     typeof(price) AS price_type, description, user_id FROM products";

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price_text: String,
    price_type: String,
    description: String,
    user_id: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let price = match row.price_type.as_str() {
            "integer" => row
                .price_text
                .parse()
                .map(Price::Amount)
                .unwrap_or(Price::Raw(row.price_text)),
            _ => Price::Raw(row.price_text),
        };
        Product {
            id: ProductId(row.id),
            name: row.name,
            price,
            description: row.description,
            owner: UserId(row.user_id),
        }
    }
}

type Query<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

fn bind_price<'q>(query: Query<'q>, price: &Price) -> Query<'q> {
    match price {
        Price::Amount(amount) => query.bind(*amount),
        Price::Raw(raw) => query.bind(raw.clone()),
    }
}

impl Database {
    /// Insert a product owned by `owner`.
    pub async fn insert_product(
        &self,
        owner: UserId,
        fields: &ProductFields,
    ) -> Result<Product, StoreError> {
        let query = sqlx::query("INSERT INTO products (name, price, description, user_id) VALUES (?, ?, ?, ?)")
            .bind(fields.name.clone());
        let result = bind_price(query, &fields.price)
            .bind(fields.description.clone())
            .bind(owner.0)
            .execute(self.pool())
            .await?;

        let product = Product {
            id: ProductId(result.last_insert_rowid()),
            name: fields.name.clone(),
            price: fields.price.clone(),
            description: fields.description.clone(),
            owner,
        };
        tracing::info!(product_id = %product.id, owner = %owner, "Inserted product");
        Ok(product)
    }

    /// Overwrite name, price and description. The owner never changes.
    pub async fn update_product(
        &self,
        id: ProductId,
        fields: &ProductFields,
    ) -> Result<Product, StoreError> {
        let query = sqlx::query("UPDATE products SET name = ?, price = ?, description = ? WHERE id = ?")
            .bind(fields.name.clone());
        let result = bind_price(query, &fields.price)
            .bind(fields.description.clone())
            .bind(id.0)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", id));
        }
        tracing::info!(product_id = %id, "Updated product");
        self.get_product(id).await
    }

    /// Delete a product. Deleting a missing id is an error, not a no-op.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.0)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", id));
        }
        tracing::info!(product_id = %id, "Deleted product");
        Ok(())
    }

    /// Fetch one product by id, regardless of owner.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        self.find_product(id)
            .await?
            .ok_or_else(|| StoreError::not_found("product", id))
    }

    /// Fetch one product by id, `None` if absent.
    pub async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(Product::from))
    }

    /// Products owned by `owner`, oldest first.
    pub async fn products_for_owner(&self, owner: UserId) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT_PRODUCT} WHERE user_id = ? ORDER BY id"
        ))
        .bind(owner.0)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Every product of every owner, oldest first.
    pub async fn all_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} ORDER BY id"))
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// The products matching `id`: empty or a single element.
    pub async fn products_by_id(&self, id: ProductId) -> Result<Vec<Product>, StoreError> {
        Ok(self.find_product(id).await?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::NewAccount;

    async fn setup() -> (Database, UserId, UserId) {
        let db = Database::in_memory().await.unwrap();
        let alice = db
            .create_user(&NewAccount {
                username: "alice".into(),
                password: "alice-pass-1".into(),
            })
            .await
            .unwrap();
        let bob = db
            .create_user(&NewAccount {
                username: "bob".into(),
                password: "bob-pass-123".into(),
            })
            .await
            .unwrap();
        (db, alice.id, bob.id)
    }

    fn fields(name: &str, price: Price) -> ProductFields {
        ProductFields {
            name: name.to_string(),
            price,
            description: format!("{name} description"),
        }
    }

    #[tokio::test]
    async fn insert_and_list_by_owner() {
        let (db, alice, bob) = setup().await;
        db.insert_product(alice, &fields("Pen", Price::Amount(10))).await.unwrap();
        db.insert_product(bob, &fields("Ink", Price::Amount(3))).await.unwrap();
        db.insert_product(alice, &fields("Pad", Price::Amount(7))).await.unwrap();

        let mine = db.products_for_owner(alice).await.unwrap();
        assert_eq!(
            mine.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            ["Pen", "Pad"]
        );
        assert!(mine.iter().all(|p| p.owner == alice));
        assert_eq!(db.all_products().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn raw_price_round_trips() {
        let (db, alice, _) = setup().await;
        let product = db
            .insert_product(alice, &fields("Odd", Price::Raw("about 5".into())))
            .await
            .unwrap();

        let stored = db.get_product(product.id).await.unwrap();
        assert_eq!(stored.price, Price::Raw("about 5".into()));
    }

    #[tokio::test]
    async fn numeric_looking_text_is_stored_verbatim() {
        let (db, alice, _) = setup().await;
        for raw in ["12.50", "1e3", "12.0", "99999999999999999999"] {
            let price = Price::from_submitted(raw);
            let product = db.insert_product(alice, &fields("Odd", price.clone())).await.unwrap();

            let stored = db.get_product(product.id).await.unwrap();
            assert_eq!(stored.price, price);
            assert_eq!(stored.price.to_string(), raw);
        }

        let product = db
            .insert_product(alice, &fields("Even", Price::from_submitted("12")))
            .await
            .unwrap();
        assert_eq!(db.get_product(product.id).await.unwrap().price, Price::Amount(12));
    }

    #[tokio::test]
    async fn update_keeps_owner() {
        let (db, alice, _) = setup().await;
        let product = db.insert_product(alice, &fields("Pen", Price::Amount(10))).await.unwrap();

        let updated = db
            .update_product(product.id, &fields("Pencil", Price::Amount(4)))
            .await
            .unwrap();
        assert_eq!(updated.name, "Pencil");
        assert_eq!(updated.price, Price::Amount(4));
        assert_eq!(updated.owner, alice);
    }

    #[tokio::test]
    async fn missing_ids_are_errors() {
        let (db, _, _) = setup().await;
        let missing = ProductId(999);

        assert!(db.get_product(missing).await.unwrap_err().is_not_found());
        assert!(db.delete_product(missing).await.unwrap_err().is_not_found());
        assert!(
            db.update_product(missing, &fields("x", Price::Amount(1)))
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(db.products_by_id(missing).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let (db, alice, _) = setup().await;
        let product = db.insert_product(alice, &fields("Pen", Price::Amount(10))).await.unwrap();

        db.delete_product(product.id).await.unwrap();
        assert!(db.find_product(product.id).await.unwrap().is_none());
    }
}
