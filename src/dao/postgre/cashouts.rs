use sqlx::Error;

use crate::model::{Cashout, Table};

impl Table<Cashout> {
    pub async fn get_page(
        &self,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<Cashout>, Error> {
        const SQL: &str = r#"
        SELECT
            "Id",
            "State",
            "Result",
            "ClientId",
            "BlockchainType",
            "ToAddress",
            "TransactionHash"
        FROM "Cashouts"
        WHERE "Id" > $1
        ORDER BY "Id" ASC
        LIMIT $2
        "#;

        sqlx::query_as(SQL)
            .bind(after_id)
            .bind(limit)
            .persistent(true)
            .fetch_all(&self.pool)
            .await
    }
}
