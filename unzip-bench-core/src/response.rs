use serde::{Deserialize, Serialize};

/// JSON body returned by `/unzip` and `/unzip_save_doc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnzipResponse {
    #[serde(default)]
    pub doc_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ZipNode>,
}

/// One node of the extracted archive tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipNode {
    pub name: String,
    #[serde(default)]
    pub path: String,
    /// `-1` when the archive did not record it.
    #[serde(default)]
    pub compressed_size: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub children: Vec<ZipNode>,
    #[serde(default)]
    pub directory: bool,
    #[serde(default)]
    pub archive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_link_id: Option<String>,
}

impl UnzipResponse {
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn decodes_camel_case_tree() {
        let body = br#"{
            "docIds": ["d1", "d2"],
            "metadata": {
                "name": "upload.zip",
                "path": "",
                "compressedSize": -1,
                "size": 2048,
                "archive": true,
                "children": [
                    {"name": "file1.txt", "path": "file1.txt", "size": 14},
                    {"name": "nested.zip", "path": "nested.zip", "archive": true, "children": [
                        {"name": "nested_file1.txt", "path": "nested.zip/nested_file1.txt"}
                    ]}
                ]
            }
        }"#;

        let res = UnzipResponse::from_slice(body).unwrap();
        assert_eq!(res.doc_ids, ["d1", "d2"]);

        let root = res.metadata.unwrap();
        assert_eq!(root.compressed_size, -1);
        assert_eq!(root.children.len(), 2);
        assert!(root.children[1].archive);
        assert_eq!(root.children[1].children[0].path, "nested.zip/nested_file1.txt");
        assert!(!root.children[0].directory);
    }

    #[test]
    fn empty_object_decodes_to_defaults() {
        let res = UnzipResponse::from_slice(b"{}").unwrap();
        assert_eq!(res, UnzipResponse::default());
    }

    #[test]
    fn omits_absent_document_link_id() {
        let node = ZipNode {
            name: "a".to_string(),
            ..ZipNode::default()
        };
        let json = serde_json::to_value(&node).unwrap();
        assert!(json.get("documentLinkId").is_none());
        assert_eq!(json["compressedSize"], 0);
    }
}
