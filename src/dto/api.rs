//! Envelope, paging and small request bodies shared by every endpoint.

use serde::{Deserialize, Serialize};

/// Every response body is wrapped in this envelope.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Machine readable status tag, when the server sends one.
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    /// Human readable message, shown to the user on failure.
    #[serde(default)]
    pub message: String,
    /// Payload; absent on most failures.
    pub data: Option<T>,
}

/// One page of a server-side paginated listing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PageData<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T> PageData<T> {
    /// Number of pages needed to show `total` items.
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }

    /// Applies `f` to every item, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageData<U> {
        PageData {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Query parameters accepted by every paginated endpoint.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct PageQuery {
    #[serde(rename = "page_number")]
    pub page: usize,
    pub page_size: usize,
}

impl PageQuery {
    /// Page numbers start at 1; zero is treated as the first page.
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }
}

/// Response of `POST /files/images`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UploadedFile {
    pub file_size: u64,
    pub access_path: String,
}

/// An image ready to be sent as the `file` part of a multipart upload.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Lower-cased extension including the leading dot, e.g. `.png`.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
            .map(|(_, ext)| format!(".{}", ext.to_lowercase()))
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub status: i32,
}

#[derive(Debug, Serialize)]
pub struct ReplyBody<'a> {
    pub reply: &'a str,
}

#[derive(Debug, Serialize)]
pub struct MessageBody<'a> {
    pub message: &'a str,
}

#[derive(Debug, Serialize)]
pub struct BroadcastBody<'a> {
    pub target: &'a str,
    pub message: &'a str,
}

#[derive(Debug, Serialize)]
pub struct KickBody<'a> {
    pub reason: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RecordBody<'a> {
    #[serde(rename = "type")]
    pub record_type: i32,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PermissionBody<'a> {
    pub permissions: &'a std::collections::BTreeMap<String, bool>,
}

#[derive(Debug, Serialize)]
pub struct FirstQuery {
    pub first: bool,
}

#[derive(Debug, Serialize)]
pub struct TimeQuery<'a> {
    pub time: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_tolerates_missing_data() {
        let envelope: ApiEnvelope<bool> =
            serde_json::from_str(r#"{"status":"NO_PERMISSION","message":"forbidden"}"#).unwrap();
        assert_eq!(envelope.message, "forbidden");
        assert!(envelope.data.is_none());
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = PageData::<u8> {
            items: vec![],
            total: 41,
            page: 1,
            page_size: 20,
        };
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn image_extension_includes_dot() {
        let image = ImageUpload {
            file_name: "Banner.PNG".into(),
            content_type: "image/png".into(),
            bytes: vec![0; 3],
        };
        assert_eq!(image.extension().as_deref(), Some(".png"));
        assert!(image.is_image());
        assert_eq!(image.size(), 3);

        let hidden = ImageUpload {
            file_name: ".png".into(),
            ..image
        };
        assert_eq!(hidden.extension(), None);
    }

    #[test]
    fn page_query_uses_server_parameter_names() {
        let query = serde_json::to_value(PageQuery::new(0, 20)).unwrap();
        assert_eq!(query["page_number"], 1);
        assert_eq!(query["page_size"], 20);
    }
}
