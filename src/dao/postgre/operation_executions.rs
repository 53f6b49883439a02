use sqlx::Error;

use crate::model::{Operation_Execution, Table};

impl Table<Operation_Execution> {
    pub async fn get_all(&self) -> Result<Vec<Operation_Execution>, Error> {
        const SQL: &str = r#"
        SELECT
            "OperationId",
            "State",
            "Result",
            "TransactionHash"
        FROM "Operation_Executions"
        "#;

        sqlx::query_as(SQL).fetch_all(&self.pool).await
    }
}
