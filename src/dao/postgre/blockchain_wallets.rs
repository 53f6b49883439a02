use sqlx::Error;

use crate::model::{Blockchain_Wallet, Table};

impl Table<Blockchain_Wallet> {
    pub async fn get_page(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Blockchain_Wallet>, Error> {
        const SQL: &str = r#"
        SELECT
            "Id",
            "UserId",
            "Address",
            "IntegrationLayerId"
        FROM "Blockchain_Wallets"
        ORDER BY "Id" ASC
        OFFSET $1 LIMIT $2
        "#;

        sqlx::query_as(SQL)
            .bind(skip)
            .bind(limit)
            .persistent(true)
            .fetch_all(&self.pool)
            .await
    }
}
