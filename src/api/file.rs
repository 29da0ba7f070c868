use async_trait::async_trait;
use reqwest::Method;
use reqwest::multipart::{Form, Part};

use crate::api::errors::ApiResult;
use crate::api::{FileApi, HttpApi};
use crate::dto::api::{ImageUpload, UploadedFile};

#[async_trait]
impl FileApi for HttpApi {
    async fn upload_image(&self, image: &ImageUpload) -> ApiResult<UploadedFile> {
        let path = "/files/images";
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        let form = Form::new().part("file", part);
        let request = self.request(Method::POST, path).await.multipart(form);
        self.fetch(request, path).await
    }
}
