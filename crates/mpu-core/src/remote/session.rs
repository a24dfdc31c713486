//! Authenticated S3 client and the calls made through it.

use std::path::Path;
use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::{Credentials, SharedCredentialsProvider};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::{ByteStream, Length};
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart, ObjectAttributes};
use aws_sdk_s3::Client;

use crate::transfer::{
    CompletedPartInfo, MultipartTarget, PartRange, ProgressObserver, TransferError,
};

use super::body::{track, BODY_BUFFER_SIZE};
use super::{ObjectLocation, RemoteError};

/// Where the session gets its credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CredentialSource {
    /// SDK default chain: environment, shared profile, instance/container role.
    #[default]
    Ambient,
    /// Keys given on the command line.
    Static {
        access_key: String,
        secret_key: String,
    },
}

impl CredentialSource {
    /// Both keys give `Static`, neither gives `Ambient`; one without the other
    /// is an error.
    pub fn from_keys(
        access_key: Option<String>,
        secret_key: Option<String>,
    ) -> Result<Self, RemoteError> {
        let access_key = access_key.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let secret_key = secret_key.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        match (access_key, secret_key) {
            (Some(access_key), Some(secret_key)) => Ok(CredentialSource::Static {
                access_key,
                secret_key,
            }),
            (None, None) => Ok(CredentialSource::Ambient),
            _ => Err(RemoteError::IncompleteCredentials),
        }
    }
}

/// Everything needed to open a session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Region override; None uses the SDK's region chain.
    pub region: Option<String>,
    pub credentials: CredentialSource,
    /// Custom endpoint for S3-compatible stores.
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
}

/// One authenticated S3 client, shared by the upload and the ETag lookups of
/// a run. Cheap to clone.
#[derive(Clone, Debug)]
pub struct S3Session {
    client: Client,
}

impl S3Session {
    pub async fn connect(options: &SessionOptions) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = options.region.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            loader = loader.region(Region::new(region.to_string()));
        }
        if let CredentialSource::Static {
            access_key,
            secret_key,
        } = &options.credentials
        {
            let creds = Credentials::new(access_key, secret_key, None, None, "mpu-cli");
            loader = loader.credentials_provider(SharedCredentialsProvider::new(creds));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = options.endpoint_url.as_deref() {
            builder = builder.endpoint_url(endpoint);
        }
        if options.force_path_style {
            builder = builder.force_path_style(true);
        }
        tracing::debug!(
            region = ?sdk_config.region(),
            endpoint = ?options.endpoint_url,
            static_credentials = matches!(options.credentials, CredentialSource::Static { .. }),
            "s3 session configured"
        );
        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// ETag via GetObjectAttributes (metadata only).
    pub async fn object_attributes_etag(
        &self,
        location: &ObjectLocation,
    ) -> Result<String, RemoteError> {
        const OP: &str = "GetObjectAttributes";
        let out = self
            .client
            .get_object_attributes()
            .bucket(&location.bucket)
            .key(&location.key)
            .object_attributes(ObjectAttributes::Etag)
            .send()
            .await
            .map_err(|e| RemoteError::Request {
                operation: OP,
                location: location.clone(),
                message: describe_sdk_error(&e),
            })?;
        out.e_tag()
            .map(str::to_string)
            .ok_or_else(|| RemoteError::MissingEtag {
                operation: OP,
                location: location.clone(),
            })
    }

    /// ETag header of a GetObject response. The body is dropped unread.
    pub async fn get_object_etag(&self, location: &ObjectLocation) -> Result<String, RemoteError> {
        const OP: &str = "GetObject";
        let out = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| RemoteError::Request {
                operation: OP,
                location: location.clone(),
                message: describe_sdk_error(&e),
            })?;
        out.e_tag()
            .map(str::to_string)
            .ok_or_else(|| RemoteError::MissingEtag {
                operation: OP,
                location: location.clone(),
            })
    }
}

/// `Code: message` for service errors, the full error chain otherwise.
fn describe_sdk_error<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service) => format!(
            "{}: {}",
            service.code().unwrap_or("Unknown"),
            service.message().unwrap_or("no message")
        ),
        None => DisplayErrorContext(err).to_string(),
    }
}

fn request_error<E, R>(
    operation: &'static str,
    location: &ObjectLocation,
    err: &SdkError<E, R>,
) -> TransferError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = describe_sdk_error(err);
    tracing::error!(%location, "{} failed: {}", operation, message);
    TransferError::Request {
        operation,
        location: location.clone(),
        message,
    }
}

impl MultipartTarget for S3Session {
    async fn put_object(
        &self,
        location: &ObjectLocation,
        path: &Path,
        size: u64,
        progress: &Arc<dyn ProgressObserver>,
    ) -> Result<Option<String>, TransferError> {
        let body = ByteStream::read_from()
            .path(path)
            .buffer_size(BODY_BUFFER_SIZE)
            .length(Length::Exact(size))
            .build()
            .await
            .map_err(|e| TransferError::Body {
                path: path.to_path_buf(),
                part: 1,
                message: e.to_string(),
            })?;
        let out = self
            .client
            .put_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .content_length(size as i64)
            .body(track(body, progress))
            .send()
            .await
            .map_err(|e| request_error("PutObject", location, &e))?;
        Ok(out.e_tag().map(str::to_string))
    }

    async fn create_multipart_upload(
        &self,
        location: &ObjectLocation,
    ) -> Result<String, TransferError> {
        const OP: &str = "CreateMultipartUpload";
        let out = self
            .client
            .create_multipart_upload()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| request_error(OP, location, &e))?;
        out.upload_id()
            .map(str::to_string)
            .ok_or_else(|| TransferError::MissingField {
                operation: OP,
                field: "upload id",
                location: location.clone(),
            })
    }

    async fn upload_part(
        &self,
        location: &ObjectLocation,
        upload_id: &str,
        path: &Path,
        part: PartRange,
        progress: &Arc<dyn ProgressObserver>,
    ) -> Result<CompletedPartInfo, TransferError> {
        const OP: &str = "UploadPart";
        let body = ByteStream::read_from()
            .path(path)
            .buffer_size(BODY_BUFFER_SIZE)
            .offset(part.start)
            .length(Length::Exact(part.len()))
            .build()
            .await
            .map_err(|e| TransferError::Body {
                path: path.to_path_buf(),
                part: part.number,
                message: e.to_string(),
            })?;
        let out = self
            .client
            .upload_part()
            .bucket(&location.bucket)
            .key(&location.key)
            .upload_id(upload_id)
            .part_number(part.number)
            .content_length(part.len() as i64)
            .body(track(body, progress))
            .send()
            .await
            .map_err(|e| request_error(OP, location, &e))?;
        let etag = out.e_tag().ok_or_else(|| TransferError::MissingField {
            operation: OP,
            field: "ETag",
            location: location.clone(),
        })?;
        Ok(CompletedPartInfo {
            number: part.number,
            etag: etag.to_string(),
        })
    }

    async fn complete_multipart_upload(
        &self,
        location: &ObjectLocation,
        upload_id: &str,
        parts: &[CompletedPartInfo],
    ) -> Result<Option<String>, TransferError> {
        let completed = CompletedMultipartUpload::builder()
            .set_parts(Some(
                parts
                    .iter()
                    .map(|p| {
                        CompletedPart::builder()
                            .part_number(p.number)
                            .e_tag(&p.etag)
                            .build()
                    })
                    .collect(),
            ))
            .build();
        let out = self
            .client
            .complete_multipart_upload()
            .bucket(&location.bucket)
            .key(&location.key)
            .upload_id(upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .map_err(|e| request_error("CompleteMultipartUpload", location, &e))?;
        Ok(out.e_tag().map(str::to_string))
    }

    async fn abort_multipart_upload(
        &self,
        location: &ObjectLocation,
        upload_id: &str,
    ) -> Result<(), TransferError> {
        self.client
            .abort_multipart_upload()
            .bucket(&location.bucket)
            .key(&location.key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|e| request_error("AbortMultipartUpload", location, &e))?;
        Ok(())
    }
}
