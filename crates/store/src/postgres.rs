use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, ProductId};
use domain::{CatalogProduct, Customer, Money, NewOrder, Order, OrderLine, StockDecrement};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::store::{
    CustomerLookup, OrderStore, ProductCatalog, aggregate_demand, ensure_valid_price,
};
use crate::{Result, StoreError};

/// PostgreSQL-backed implementation of every store interface.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool to `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Registers a customer.
    pub async fn insert_customer(&self, customer: &Customer) -> Result<()> {
        sqlx::query("INSERT INTO customers (id, name, email) VALUES ($1, $2, $3)")
            .bind(customer.id.as_uuid())
            .bind(&customer.name)
            .bind(&customer.email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Adds a product to the catalog, or overwrites its name, price and quantity.
    pub async fn insert_product(&self, product: &CatalogProduct) -> Result<()> {
        ensure_valid_price(product)?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price_cents, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                price_cents = EXCLUDED.price_cents,
                quantity = EXCLUDED.quantity,
                updated_at = NOW()
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(i64::from(product.quantity))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn row_to_product(row: PgRow) -> Result<CatalogProduct> {
        Ok(CatalogProduct {
            id: ProductId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            quantity: to_quantity(row.try_get("quantity")?)?,
        })
    }

    fn row_to_line(row: PgRow) -> Result<OrderLine> {
        Ok(OrderLine {
            product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
            quantity: to_quantity(row.try_get("quantity")?)?,
            price: Money::from_cents(row.try_get("price_cents")?),
        })
    }
}

fn to_quantity(value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| StoreError::Decode(format!("quantity out of range: {value}")))
}

#[async_trait]
impl CustomerLookup for PostgresStore {
    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row: Option<PgRow> =
            sqlx::query("SELECT id, name, email FROM customers WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => Ok(Some(Customer {
                id: CustomerId::from_uuid(row.try_get::<Uuid, _>("id")?),
                name: row.try_get("name")?,
                email: row.try_get("email")?,
            })),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ProductCatalog for PostgresStore {
    #[tracing::instrument(skip(self))]
    async fn find_all_by_id(&self, ids: &[ProductId]) -> Result<Vec<CatalogProduct>> {
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, name, price_cents, quantity
            FROM products
            WHERE id = ANY($1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn update_quantity(&self, decrements: &[StockDecrement]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for (product_id, requested) in aggregate_demand(decrements) {
            let requested_i64 = i64::try_from(requested)
                .map_err(|_| StoreError::Decode(format!("demand out of range: {requested}")))?;

            // Compare-and-swap on the available quantity.
            let result = sqlx::query(
                r#"
                UPDATE products
                SET quantity = quantity - $2, updated_at = NOW()
                WHERE id = $1 AND quantity >= $2
                "#,
            )
            .bind(product_id.as_str())
            .bind(requested_i64)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT quantity FROM products WHERE id = $1")
                        .bind(product_id.as_str())
                        .fetch_optional(&mut *tx)
                        .await?;

                // Dropping the transaction rolls back earlier decrements.
                return Err(match available {
                    Some(available) => StoreError::StockConflict {
                        product_id,
                        requested,
                        available: u64::try_from(available).unwrap_or(0),
                    },
                    None => StoreError::ProductNotFound(product_id),
                });
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    #[tracing::instrument(skip(self, order), fields(customer_id = %order.customer_id, lines = order.lines.len()))]
    async fn create(&self, order: NewOrder) -> Result<Order> {
        let order = order.into_order(OrderId::new(), Utc::now());

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO orders (id, customer_id, created_at) VALUES ($1, $2, $3)")
            .bind(order.id.as_uuid())
            .bind(order.customer_id.as_uuid())
            .bind(order.created_at)
            .execute(&mut *tx)
            .await?;

        for (position, line) in order.lines.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| StoreError::Decode(format!("too many order lines: {position}")))?;

            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, position, product_id, quantity, price_cents)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order.id.as_uuid())
            .bind(position)
            .bind(line.product_id.as_str())
            .bind(i64::from(line.quantity))
            .bind(line.price.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let row: Option<PgRow> =
            sqlx::query("SELECT id, customer_id, created_at FROM orders WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = sqlx::query(
            r#"
            SELECT product_id, quantity, price_cents
            FROM order_lines
            WHERE order_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Self::row_to_line)
        .collect::<Result<Vec<_>>>()?;

        Ok(Some(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
            lines,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        }))
    }

    #[tracing::instrument(skip(self))]
    async fn discard(&self, id: OrderId) -> Result<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound(id));
        }
        Ok(())
    }
}
