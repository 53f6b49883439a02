use sqlx::Error;

use crate::model::{Bcn_Credentials, Table};

impl Table<Bcn_Credentials> {
    pub async fn get_page(
        &self,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<Bcn_Credentials>, Error> {
        const SQL: &str = r#"
        SELECT
            "Id",
            "ClientId",
            "Address",
            "AssetAddress",
            "AssetId"
        FROM "Bcn_Client_Credentials"
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
