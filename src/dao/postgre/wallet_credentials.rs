use sqlx::Error;

use crate::model::{Table, Wallet_Credentials};

impl Table<Wallet_Credentials> {
    pub async fn get_page(
        &self,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<Wallet_Credentials>, Error> {
        const SQL: &str = r#"
        SELECT
            "Id",
            "ClientId",
            "MultiSig",
            "ColoredMultiSig"
        FROM "Wallet_Credentials"
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
