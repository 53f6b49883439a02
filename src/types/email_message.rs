use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub message: EmailMessage,
    pub to: EmailAddressee,
    pub bcc: Vec<EmailAddressee>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub subject: String,
    pub text_body: String,
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAttachment {
    pub file_name: String,
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddressee {
    pub email_address: String,
}
