use std::io::{Cursor, Read as _};

use serde::Serialize;

// Nested archives deeper than this are listed but not opened.
const MAX_WALK_DEPTH: usize = 16;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnzipBody {
    pub doc_ids: Vec<String>,
    pub metadata: Node,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Node {
    pub name: String,
    pub path: String,
    pub compressed_size: i64,
    pub size: i64,
    pub children: Vec<Node>,
    pub directory: bool,
    pub archive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_link_id: Option<String>,
}

/// Lists an uploaded archive. Every regular file gets a doc id; `.zip` entries are opened
/// and listed as children.
pub(crate) fn walk_upload(file_name: &str, bytes: &[u8]) -> zip::result::ZipResult<UnzipBody> {
    let mut doc_ids = Vec::new();
    let children = walk(bytes, "", 0, &mut doc_ids)?;
    Ok(UnzipBody {
        doc_ids,
        metadata: Node {
            name: file_name.to_string(),
            path: String::new(),
            compressed_size: -1,
            size: i64::try_from(bytes.len()).unwrap_or(i64::MAX),
            children,
            directory: false,
            archive: true,
            document_link_id: None,
        },
    })
}

fn walk(
    bytes: &[u8],
    parent: &str,
    depth: usize,
    doc_ids: &mut Vec<String>,
) -> zip::result::ZipResult<Vec<Node>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut nodes = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let entry_name = entry.name().trim_end_matches('/').to_string();
        let name = entry_name
            .rsplit('/')
            .next()
            .unwrap_or(entry_name.as_str())
            .to_string();
        let path = if parent.is_empty() {
            entry_name.clone()
        } else {
            format!("{parent}/{entry_name}")
        };
        let directory = entry.is_dir();
        let archive_entry = !directory && name.ends_with(".zip");
        let compressed_size = i64::try_from(entry.compressed_size()).unwrap_or(i64::MAX);
        let size = i64::try_from(entry.size()).unwrap_or(i64::MAX);

        let children = if archive_entry && depth < MAX_WALK_DEPTH {
            let mut inner = Vec::new();
            entry.read_to_end(&mut inner)?;
            walk(&inner, &path, depth + 1, doc_ids)?
        } else {
            Vec::new()
        };

        if !directory && !archive_entry {
            doc_ids.push(format!("doc-{:04}", doc_ids.len() + 1));
        }

        nodes.push(Node {
            name,
            path,
            compressed_size,
            size,
            children,
            directory,
            archive: archive_entry,
            document_link_id: None,
        });
    }

    Ok(nodes)
}

/// Fixed body for `/unzip_save_doc`.
pub(crate) fn saved_document(document_link_id: &str) -> UnzipBody {
    let file = |name: &str, size: i64| Node {
        name: name.to_string(),
        path: name.to_string(),
        compressed_size: size,
        size,
        children: Vec::new(),
        directory: false,
        archive: false,
        document_link_id: None,
    };

    UnzipBody {
        doc_ids: vec!["doc-0001".to_string(), "doc-0002".to_string()],
        metadata: Node {
            name: format!("{document_link_id}.zip"),
            path: String::new(),
            compressed_size: -1,
            size: 29,
            children: vec![file("file1.txt", 14), file("file2.txt", 14)],
            directory: false,
            archive: true,
            document_link_id: Some(document_link_id.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::io::Write as _;
    use zip::write::SimpleFileOptions;

    fn archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn walks_nested_archives() {
        let inner = archive(&[("a.txt", b"a"), ("b.txt", b"b")]);
        let outer = archive(&[("top.txt", b"top"), ("dir/nested.zip", &inner)]);

        let body = walk_upload("upload.zip", &outer).unwrap();
        assert_eq!(body.doc_ids.len(), 3);
        assert_eq!(body.metadata.children.len(), 2);

        let nested = &body.metadata.children[1];
        assert!(nested.archive);
        assert_eq!(nested.name, "nested.zip");
        assert_eq!(nested.children.len(), 2);
        assert_eq!(nested.children[0].path, "dir/nested.zip/a.txt");
    }

    #[test]
    fn rejects_garbage() {
        assert!(walk_upload("x.zip", b"not a zip").is_err());
    }

    #[test]
    fn saved_document_serializes_camel_case() {
        let json = serde_json::to_value(saved_document("000000000a")).unwrap();
        assert!(json["docIds"].is_array());
        assert_eq!(json["metadata"]["documentLinkId"], "000000000a");
        assert!(json["metadata"]["children"].is_array());
        assert_eq!(json["metadata"]["compressedSize"], -1);
    }
}
