use std::collections::HashSet;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use tracing::info;
use url::Url;

use crate::{
    error::Error,
    helpers::sortable_timestamp,
    model::Transaction,
    provider::HTTP,
    reporting::TransactionsReportWriter,
    types::{EmailAddressee, EmailAttachment, EmailMessage, EmailRequest},
};

use super::TransactionsIncrementPublisher;

/// Sends the increment as a CSV attachment through the email sender service.
pub struct EmailIncrementPublisher {
    http: HTTP,
    url: Url,
    to: String,
    bcc: Vec<String>,
}

impl EmailIncrementPublisher {
    pub fn new(
        http: HTTP,
        url: &str,
        to: String,
        bcc: Vec<String>,
    ) -> Result<EmailIncrementPublisher, Error> {
        Ok(EmailIncrementPublisher {
            http,
            url: Url::parse(url)?,
            to,
            bcc,
        })
    }

    fn request(
        &self,
        report: &[u8],
        from: &DateTime<Utc>,
        to: &DateTime<Utc>,
    ) -> EmailRequest {
        let from = sortable_timestamp(from);
        let to = sortable_timestamp(to);

        EmailRequest {
            message: EmailMessage {
                subject: format!(
                    "Transactions batch for the period {} - {}",
                    from, to
                ),
                text_body: format!(
                    "Hi, please find enclosed the transactions batch for the period {} - {} UTC, best regards",
                    from, to
                ),
                attachments: vec![EmailAttachment {
                    file_name: format!("transactions-{}.csv", to),
                    mime_type: String::from("text/csv"),
                    data: STANDARD.encode(report),
                }],
            },
            to: EmailAddressee {
                email_address: self.to.to_owned(),
            },
            bcc: self
                .bcc
                .iter()
                .map(|address| EmailAddressee {
                    email_address: address.to_owned(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl TransactionsIncrementPublisher for EmailIncrementPublisher {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn publish(
        &self,
        increment: &HashSet<Transaction>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<(), Error> {
        info!(
            "Sending transactions increment via email to address '{}' and BCC '{}'...",
            self.to,
            self.bcc.join(", ")
        );

        let report = TransactionsReportWriter::to_bytes(increment)?;
        let request = self.request(&report, &from, &to);

        self.http
            .http
            .post(self.url.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        info!(
            "Transactions increment with {} transactions sent via email",
            increment.len()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use reqwest::Client;

    use super::*;

    #[test]
    fn message_layout() {
        let publisher = EmailIncrementPublisher::new(
            HTTP {
                http: Client::new(),
            },
            "http://email-sender.local/api/send",
            String::from("compliance@example.com"),
            vec![String::from("audit@example.com")],
        )
        .unwrap();
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();

        let request = publisher.request(b"abc", &from, &to);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json["message"]["subject"],
            "Transactions batch for the period 2024-03-01T00:00:00 - 2024-03-02T00:00:00"
        );
        assert_eq!(
            json["message"]["attachments"][0]["fileName"],
            "transactions-2024-03-02T00:00:00.csv"
        );
        assert_eq!(json["message"]["attachments"][0]["data"], "YWJj");
        assert_eq!(json["to"]["emailAddress"], "compliance@example.com");
        assert_eq!(json["bcc"][0]["emailAddress"], "audit@example.com");
    }
}
