//! Files submitted with an assembly
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use bytes::Bytes;
use std::path::{Path, PathBuf};

/// Where an upload's bytes come from
///
/// An `Upload` is only a recipe. Every submission attempt calls [`Upload::open`]
/// to get a fresh, single-use [`UploadBody`].
#[derive(Debug, Clone)]
pub enum Upload {
    Path(PathBuf),
    Bytes { file_name: String, data: Bytes },
}

/// Opened upload content, consumed by one request
#[derive(Debug)]
pub enum UploadBody {
    File(tokio::fs::File),
    Bytes(Bytes),
}

impl Upload {
    pub fn path(path: impl AsRef<Path>) -> Self {
        Upload::Path(path.as_ref().to_path_buf())
    }

    pub fn bytes(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Upload::Bytes {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    /// File name reported in the multipart part
    pub fn file_name(&self) -> String {
        match self {
            Upload::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string()),
            Upload::Bytes { file_name, .. } => file_name.clone(),
        }
    }

    /// Open a fresh stream over the upload's content
    pub async fn open(&self) -> std::io::Result<UploadBody> {
        match self {
            Upload::Path(path) => Ok(UploadBody::File(tokio::fs::File::open(path).await?)),
            Upload::Bytes { data, .. } => Ok(UploadBody::Bytes(data.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_path_upload_reopens() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"frame data").unwrap();
        let upload = Upload::path(file.path());

        for _ in 0..2 {
            let mut content = String::new();
            match upload.open().await.unwrap() {
                UploadBody::File(mut f) => {
                    f.read_to_string(&mut content).await.unwrap();
                }
                UploadBody::Bytes(_) => panic!("expected a file body"),
            }
            assert_eq!(content, "frame data");
        }
    }

    #[tokio::test]
    async fn test_missing_file_fails_to_open() {
        let upload = Upload::path("/definitely/not/here.mp4");
        assert_eq!(upload.file_name(), "here.mp4");
        assert!(upload.open().await.is_err());
    }

    #[test]
    fn test_bytes_file_name() {
        let upload = Upload::bytes("clip.mp3", &b"abc"[..]);
        assert_eq!(upload.file_name(), "clip.mp3");
    }
}
