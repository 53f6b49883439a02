use sqlx::Error;

use crate::model::{Cash_Operation, Table};

impl Table<Cash_Operation> {
    pub async fn get_page(
        &self,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<Cash_Operation>, Error> {
        const SQL: &str = r#"
        SELECT
            "Id",
            "ClientId",
            "AssetId",
            "Amount",
            "AddressFrom",
            "AddressTo",
            "BlockChainHash"
        FROM "Cash_Operations"
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
