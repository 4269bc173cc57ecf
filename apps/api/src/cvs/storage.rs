use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

pub fn cv_object_key(candidate_id: Uuid, cv_id: Uuid) -> String {
    format!("cvs/{candidate_id}/{cv_id}.pdf")
}

pub async fn put_pdf(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    pdf: Bytes,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(pdf))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;

    info!("Uploaded CV to s3://{bucket}/{key}");
    Ok(())
}

/// Best effort: a missing or undeletable object is logged, not returned.
pub async fn delete_pdf(s3: &aws_sdk_s3::Client, bucket: &str, key: &str) {
    match s3.delete_object().bucket(bucket).key(key).send().await {
        Ok(_) => info!("Deleted s3://{bucket}/{key}"),
        Err(e) => warn!("Could not delete s3://{bucket}/{key}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_layout() {
        let candidate = Uuid::nil();
        let cv = Uuid::from_u128(1);
        assert_eq!(
            cv_object_key(candidate, cv),
            "cvs/00000000-0000-0000-0000-000000000000/00000000-0000-0000-0000-000000000001.pdf"
        );
    }
}
