//! Pasted image uploads.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::api::FileApi;
use crate::domain::server::UploadLimit;
use crate::domain::types::ByteSize;
use crate::dto::api::ImageUpload;
use crate::services::{ServiceError, ServiceResult};

/// `512B`, `1.50KB`, `2.00MB`, `1.00GB`.
pub fn size_to_string(size: u64) -> String {
    ByteSize(size).to_string()
}

/// Checks an image against the server's upload limits.
pub fn check_image(limit: &UploadLimit, image: &ImageUpload) -> ServiceResult<()> {
    if !image.is_image() {
        return Err(ServiceError::Upload(format!(
            "`{}` is not an image",
            image.file_name
        )));
    }
    if image.size() > limit.max_allow_size {
        return Err(ServiceError::Upload(format!(
            "cannot upload files larger than {}",
            size_to_string(limit.max_allow_size)
        )));
    }
    match image.extension() {
        Some(ext) if limit.allowed_ext.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext)) => {
            Ok(())
        }
        _ => Err(ServiceError::Upload("unsupported image type".to_string())),
    }
}

/// Uploads one image at a time; a paste while another upload runs is refused.
#[derive(Debug, Default)]
pub struct ImageUploader {
    uploading: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ImageUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::Acquire)
    }

    /// Validates and uploads `image`, returning the server access path.
    pub async fn upload<A>(
        &self,
        api: &A,
        limit: &UploadLimit,
        image: ImageUpload,
    ) -> ServiceResult<String>
    where
        A: FileApi + ?Sized,
    {
        check_image(limit, &image)?;

        if self
            .uploading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ServiceError::Upload(
                "another upload is still in progress".to_string(),
            ));
        }
        let _guard = InFlight(&self.uploading);

        let uploaded = api.upload_image(&image).await.map_err(|err| {
            log::error!("Failed to upload `{}`: {err}", image.file_name);
            err
        })?;
        log::info!(
            "Uploaded `{}` ({})",
            image.file_name,
            size_to_string(image.size())
        );
        Ok(uploaded.access_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::errors::ApiError;
    use crate::api::mock::MockApi;
    use crate::dto::api::UploadedFile;

    fn limit() -> UploadLimit {
        UploadLimit {
            max_allow_size: 1024,
            allowed_ext: vec![".png".into(), ".jpg".into()],
        }
    }

    fn png(len: usize) -> ImageUpload {
        ImageUpload {
            file_name: "banner.PNG".into(),
            content_type: "image/png".into(),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(size_to_string(512), "512B");
        assert_eq!(size_to_string(1536), "1.50KB");
        assert_eq!(size_to_string(5 * 1024 * 1024), "5.00MB");
        assert_eq!(size_to_string(1024 * 1024 * 1024), "1.00GB");
    }

    /// Verifies size, type and extension rules.
    #[test]
    fn image_checks() {
        assert!(check_image(&limit(), &png(1024)).is_ok());

        let err = check_image(&limit(), &png(1025)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Upload rejected: cannot upload files larger than 1.00KB"
        );

        let gif = ImageUpload {
            file_name: "anim.gif".into(),
            content_type: "image/gif".into(),
            bytes: vec![0; 4],
        };
        assert!(matches!(
            check_image(&limit(), &gif),
            Err(ServiceError::Upload(message)) if message == "unsupported image type"
        ));

        let text = ImageUpload {
            content_type: "text/plain".into(),
            ..png(4)
        };
        assert!(check_image(&limit(), &text).is_err());
    }

    /// Ensures the access path is returned and the in-flight flag released.
    #[tokio::test]
    async fn upload_returns_access_path() {
        let mut api = MockApi::new();
        api.expect_upload_image()
            .withf(|image| image.file_name == "banner.PNG")
            .times(1)
            .returning(|_| {
                Ok(UploadedFile {
                    file_size: 16,
                    access_path: "/images/abc.png".into(),
                })
            });
        let uploader = ImageUploader::new();

        let path = uploader.upload(&api, &limit(), png(16)).await.unwrap();

        assert_eq!(path, "/images/abc.png");
        assert!(!uploader.is_uploading());
    }

    /// Ensures a failed upload does not leave the uploader locked.
    #[tokio::test]
    async fn failure_releases_flag() {
        let mut api = MockApi::new();
        api.expect_upload_image()
            .times(1)
            .returning(|_| Err(ApiError::Timeout));
        let uploader = ImageUploader::new();

        let result = uploader.upload(&api, &limit(), png(16)).await;

        assert!(matches!(result, Err(ServiceError::Api(ApiError::Timeout))));
        assert!(!uploader.is_uploading());
    }

    /// Ensures oversized images never reach the server.
    #[tokio::test]
    async fn rejected_image_is_not_sent() {
        let mut api = MockApi::new();
        api.expect_upload_image().times(0);
        let uploader = ImageUploader::new();

        assert!(uploader.upload(&api, &limit(), png(4096)).await.is_err());
    }
}
