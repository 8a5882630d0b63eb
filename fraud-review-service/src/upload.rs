use axum::extract::{Multipart, multipart::MultipartError};
use fraud_intake::{DocumentUpload, ExtractionOptions, IntakeError};
use tracing::debug;

const FILE_FIELD: &str = "file";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Fields read from a multipart upload form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub upload: Option<DocumentUpload>,
    pub doc_type: Option<String>,
    pub classify_if_missing: Option<bool>,
}

impl UploadForm {
    /// Split into the document and its options, rejecting a missing file part
    pub fn into_parts(self) -> Result<(DocumentUpload, ExtractionOptions), IntakeError> {
        let upload = self
            .upload
            .ok_or_else(|| IntakeError::InputError("No file part".to_string()))?;
        upload.validate()?;

        let options = ExtractionOptions {
            doc_type: self.doc_type,
            classify_if_missing: self.classify_if_missing.unwrap_or(true),
        };
        Ok((upload, options))
    }
}

/// Anything other than an explicit "false"/"0"/"no"/"off" counts as true
pub fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, MultipartError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILE_FIELD => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let bytes = field.bytes().await?;
                debug!(file_name = %file_name, bytes = bytes.len(), "Received upload");
                form.upload = Some(DocumentUpload::new(file_name, content_type, bytes.to_vec()));
            }
            "doc_type" => form.doc_type = Some(field.text().await?),
            "classify_if_missing" => {
                form.classify_if_missing = Some(parse_flag(&field.text().await?));
            }
            other => debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}
