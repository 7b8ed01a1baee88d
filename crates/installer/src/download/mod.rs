//! Archive download and extraction
//!
//! Archives are streamed to `temp/<folder>.zip`, unpacked into
//! `temp/<folder>/` on a blocking worker and then deleted.

use futures::StreamExt;
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{Instrument, debug, info_span, warn};

use crate::config::GamePaths;
use crate::error::{FileOperation, ModError, Result};
use crate::mods::Mod;

/// Downloads mod archives and unpacks them into the temp folder
#[derive(Debug, Clone)]
pub struct ArchiveDownloader {
    client: Client,
}

impl ArchiveDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Download and extract a resolved mod, returning the extracted root
    ///
    /// The archive file is removed whether or not extraction succeeds.
    pub async fn download(&self, m: &Mod, paths: &GamePaths) -> Result<PathBuf> {
        let url = m
            .download_url
            .as_deref()
            .ok_or_else(|| ModError::Unresolved { name: m.name.clone() })?;
        let archive = paths.archive_path(&m.folder_name);
        let dest = paths.extract_folder(&m.folder_name);

        async move {
            if let Err(e) = self.fetch_archive(url, &archive).await {
                discard(&archive).await;
                return Err(e);
            }

            let extracted = extract_archive(archive.clone(), dest.clone()).await;
            discard(&archive).await;
            let entries = extracted?;

            debug!("Extracted {} entries into {}", entries, dest.display());
            Ok::<_, ModError>(dest)
        }
        .instrument(info_span!("download", mod_folder = %m.folder_name))
        .await
    }

    /// Stream `url` into `archive`, returning the number of bytes written
    async fn fetch_archive(&self, url: &str, archive: &Path) -> Result<u64> {
        debug!("Downloading {} to {}", url, archive.display());

        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(ModError::UnexpectedStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let mut file = fs::File::create(archive)
            .await
            .map_err(|e| ModError::fs(archive, FileOperation::Create, e))?;

        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| ModError::fs(archive, FileOperation::Write, e))?;
            downloaded += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| ModError::fs(archive, FileOperation::Write, e))?;

        debug!("Download completed: {} bytes", downloaded);
        Ok(downloaded)
    }
}

/// Unpack a zip archive into `dest`, replacing whatever a previous run left there
///
/// Entries whose names would escape `dest` are rejected by the zip reader.
pub async fn extract_archive(archive: PathBuf, dest: PathBuf) -> Result<usize> {
    tokio::task::spawn_blocking(move || {
        match std::fs::remove_dir_all(&dest) {
            Ok(()) => debug!("Removed stale extraction folder {}", dest.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ModError::fs(&dest, FileOperation::Delete, e)),
        }
        std::fs::create_dir_all(&dest).map_err(|e| ModError::fs(&dest, FileOperation::CreateDir, e))?;

        let file = std::fs::File::open(&archive).map_err(|e| ModError::fs(&archive, FileOperation::Read, e))?;
        let mut zip = zip::ZipArchive::new(file).map_err(|source| ModError::Extraction {
            path: archive.clone(),
            source,
        })?;
        zip.extract(&dest).map_err(|source| ModError::Extraction {
            path: archive.clone(),
            source,
        })?;

        Ok(zip.len())
    })
    .await?
}

async fn discard(archive: &Path) {
    match fs::remove_file(archive).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove {}: {}", archive.display(), e),
    }
}
