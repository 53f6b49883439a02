use sqlx::Error;

use crate::model::{Cashouts_Batch, Table};

impl Table<Cashouts_Batch> {
    pub async fn get_page(
        &self,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<Cashouts_Batch>, Error> {
        const SQL: &str = r#"
        SELECT
            "Id",
            "BatchId",
            "BlockchainType",
            "Cashouts",
            "State"
        FROM "Cashouts_Batches"
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
