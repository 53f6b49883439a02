use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use tracing::info;

use crate::{
    error::Error, helpers::sortable_timestamp, model::Transaction,
    provider::HTTP, reporting::TransactionsReportWriter, types::SlackResponse,
};

use super::TransactionsIncrementPublisher;

const FILES_UPLOAD_URL: &str = "https://slack.com/api/files.upload";

pub struct SlackIncrementPublisher {
    http: HTTP,
    auth_token: String,
    channel: String,
}

impl SlackIncrementPublisher {
    pub fn new(
        http: HTTP,
        auth_token: String,
        channel: String,
    ) -> SlackIncrementPublisher {
        SlackIncrementPublisher {
            http,
            auth_token,
            channel,
        }
    }
}

#[async_trait]
impl TransactionsIncrementPublisher for SlackIncrementPublisher {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn publish(
        &self,
        increment: &HashSet<Transaction>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<(), Error> {
        let file_name = format!("transactions-{}.csv", sortable_timestamp(&to));

        info!("Uploading transactions increment to Slack {}...", file_name);

        let report = TransactionsReportWriter::to_bytes(increment)?;
        let part = Part::bytes(report)
            .file_name(file_name.to_owned())
            .mime_str("text/csv")?;
        let form = Form::new()
            .text("channels", self.channel.to_owned())
            .text("filename", file_name)
            .text(
                "title",
                format!(
                    "Transactions for the period {} - {}",
                    sortable_timestamp(&from),
                    sortable_timestamp(&to)
                ),
            )
            .part("file", part);

        let response = self
            .http
            .http
            .post(FILES_UPLOAD_URL)
            .bearer_auth(&self.auth_token)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json::<SlackResponse>()
            .await?;

        if !response.ok {
            return Err(Error::UpstreamError(format!(
                "Slack upload failed: {}",
                response.error.unwrap_or_default()
            )));
        }

        info!(
            "Transactions increment with {} transactions uploaded to Slack",
            increment.len()
        );

        Ok(())
    }
}
