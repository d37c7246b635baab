use std::error::Error as _;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;

use crate::checksum::HashingWriter;
use crate::error::FetchError;
use crate::request::{OutputTarget, RequestSpec, ResponseStatus};

/// Size of the slices the body is drained in. Only the last one may be shorter.
pub const CHUNK_SIZE: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub status: ResponseStatus,
    pub saved: Option<SavedFile>,
}

#[derive(Debug, Default)]
pub struct FileFetcher;

impl FileFetcher {
    pub fn new() -> Self {
        Self
    }

    /// Sends one GET described by `spec` and streams the body into `target`.
    ///
    /// Every failure is logged before it is returned. Nothing is written to
    /// disk unless the server answered with a success status.
    pub fn download_file(
        &self,
        spec: &RequestSpec,
        target: &OutputTarget,
    ) -> Result<Download, FetchError> {
        log::info!("Downloading: {}", spec.url());
        for (key, value) in spec.query() {
            log::debug!("{}: {}", key, value);
        }

        let response = match send(spec) {
            Ok(response) => {
                log::info!("Successfully downloaded");
                response
            }
            Err(err) => {
                report(&err);
                if let Some(status) = err.status() {
                    log_status(status);
                }
                return Err(err);
            }
        };

        let status = ResponseStatus::from(response.status());
        log_status(&status);
        describe_content(&response);

        let saved = match target.path() {
            Some(path) => Some(save(response, path).map_err(|err| {
                report(&err);
                err
            })?),
            None => None,
        };

        Ok(Download { status, saved })
    }
}

// The blocking client applies its own timeout to the header wait and to
// each body read separately. A per-request timeout would instead bound the
// whole transfer, so none is set.
fn send(spec: &RequestSpec) -> Result<Response, FetchError> {
    let client = Client::builder()
        .connect_timeout(spec.request_timeout())
        .timeout(spec.request_timeout())
        .build()?;

    let response = client
        .get(spec.url())
        .query(spec.query())
        .headers(spec.headers().clone())
        .send()?;

    if let Err(source) = response.error_for_status_ref() {
        return Err(FetchError::HttpStatus {
            status: response.status().into(),
            source,
        });
    }

    Ok(response)
}

fn report(err: &FetchError) {
    match err {
        FetchError::HttpStatus { .. } => log::error!("HTTP error occurred: {}", err),
        FetchError::Transport(_) => log::error!("Other error occurred: {}", err),
        FetchError::Body(_) => log::error!("Body read error occurred: {}", err),
        FetchError::Output { .. } => log::error!("File error occurred: {}", err),
    }

    let message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        let text = inner.to_string();
        if text != message {
            log::debug!("Caused by: {}", text);
        }
        cause = inner.source();
    }
}

fn log_status(status: &ResponseStatus) {
    log::debug!("Response ok: {}", status.ok);
    log::debug!("Response reason: {}", status.reason);
    log::debug!("Response code: {}", status.code);
}

fn describe_content(response: &Response) {
    if let Some(length) = response.content_length() {
        log::debug!("Content length: {}", length);
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    if let Some(content_type) = content_type {
        log::debug!("Content type: {}", content_type);
        if content_type
            .trim_start()
            .to_ascii_lowercase()
            .starts_with("text/html")
        {
            log::warn!(
                "Server sent an HTML page, which is likely an error message rather than an export"
            );
        }
    }
}

/// Streams into `<path>.part` and renames it over `path` once complete, so a
/// broken transfer leaves the previous file alone.
fn save(mut response: Response, path: &Path) -> Result<SavedFile, FetchError> {
    log::info!("Opening local file: {}", path.display());
    let partial = partial_path(path);
    let file = File::create(&partial)
        .map_err(|source| output_error("Failed to create output file", &partial, source))?;

    log::info!("Writing to local file");
    let written = write_partial(&mut response, file, &partial);
    let (bytes, sha256) = match written {
        Ok(done) => done,
        Err(err) => {
            let _ = fs::remove_file(&partial);
            return Err(err);
        }
    };

    fs::rename(&partial, path)
        .map_err(|source| output_error("Failed to replace output file", path, source))?;

    log::info!("Downloaded file saved");
    log::debug!("Wrote {} bytes, sha256 {}", bytes, sha256);
    log::info!("");

    Ok(SavedFile {
        path: path.to_path_buf(),
        bytes,
        sha256,
    })
}

fn write_partial(
    response: &mut Response,
    file: File,
    partial: &Path,
) -> Result<(u64, String), FetchError> {
    let mut writer = HashingWriter::new(BufWriter::new(file));
    drain_body(response, &mut writer, partial)?;

    let (buffered, bytes, sha256) = writer.finish();
    buffered
        .into_inner()
        .map_err(|err| output_error("Failed to flush output file", partial, err.into_error()))?;

    Ok((bytes, sha256))
}

fn partial_path(path: &Path) -> PathBuf {
    let mut partial = OsString::from(path.as_os_str());
    partial.push(".part");
    PathBuf::from(partial)
}

fn output_error(context: &'static str, path: &Path, source: io::Error) -> FetchError {
    FetchError::Output {
        context,
        path: path.to_path_buf(),
        source,
    }
}

/// Copies `body` into `out` in `CHUNK_SIZE` pieces, in order.
fn drain_body<R: Read, W: Write>(
    body: &mut R,
    out: &mut W,
    path: &Path,
) -> Result<u64, FetchError> {
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = fill_chunk(body, &mut chunk).map_err(FetchError::Body)?;
        if n == 0 {
            break;
        }
        out.write_all(&chunk[..n])
            .map_err(|source| output_error("Failed to write output file", path, source))?;
        total += n as u64;
    }

    Ok(total)
}

fn fill_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
