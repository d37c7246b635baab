use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::StatusCode;

pub const DEFAULT_USER_AGENT: &str = "Python script";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RequestSpec {
    url: String,
    params: Vec<(String, String)>,
    headers: HeaderMap,
    timeout: Duration,
}

impl RequestSpec {
    pub fn new(url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        Self {
            url: url.into(),
            params: Vec::new(),
            headers,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn params<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        params
            .into_iter()
            .fold(self, |spec, (key, value)| spec.param(key, value))
    }

    /// Replaces any header of the same name, so the defaults can be overridden.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Connect timeout, and the longest wait for headers or for any single
    /// body read. It does not cap the length of the whole transfer.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn request_timeout(&self) -> Duration {
        self.timeout
    }
}

// An empty path means no file is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTarget(Option<PathBuf>);

impl OutputTarget {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.as_os_str().is_empty() {
            Self(None)
        } else {
            Self(Some(path))
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.0.as_deref()
    }
}

impl From<&str> for OutputTarget {
    fn from(path: &str) -> Self {
        Self::file(path)
    }
}

impl From<PathBuf> for OutputTarget {
    fn from(path: PathBuf) -> Self {
        Self::file(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseStatus {
    pub code: u16,
    pub ok: bool,
    pub reason: String,
}

impl From<StatusCode> for ResponseStatus {
    fn from(status: StatusCode) -> Self {
        Self {
            code: status.as_u16(),
            ok: !(status.is_client_error() || status.is_server_error()),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privacy {
    None,
    GedAdmin,
    User,
    Visitor,
}

impl Privacy {
    pub fn as_str(self) -> &'static str {
        match self {
            Privacy::None => "none",
            Privacy::GedAdmin => "gedadmin",
            Privacy::User => "user",
            Privacy::Visitor => "visitor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Gedcom,
    Zip,
    ZipMedia,
    GedZip,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Gedcom => "gedcom",
            ExportFormat::Zip => "zip",
            ExportFormat::ZipMedia => "zipmedia",
            ExportFormat::GedZip => "gedzip",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Gedcom => "ged",
            ExportFormat::Zip | ExportFormat::ZipMedia => "zip",
            ExportFormat::GedZip => "gdz",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf16Be,
    Ansel,
    Ascii,
    Windows1252,
}

impl Encoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Ansel => "ANSEL",
            Encoding::Ascii => "ASCII",
            Encoding::Windows1252 => "CP1252",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEndings {
    Crlf,
    Lf,
}

impl LineEndings {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEndings::Crlf => "CRLF",
            LineEndings::Lf => "LF",
        }
    }
}

/// Query understood by the webtrees GEDCOM export route.
///
/// Unset fields are left out of the query so the server applies its own
/// defaults (file name = tree name, privacy `none`, format `gedcom`,
/// UTF-8, CRLF).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportQuery {
    pub tree: String,
    pub key: Option<String>,
    pub file: Option<String>,
    pub privacy: Option<Privacy>,
    pub format: Option<ExportFormat>,
    pub encoding: Option<Encoding>,
    pub line_endings: Option<LineEndings>,
}

impl ExportQuery {
    pub fn new(tree: impl Into<String>) -> Self {
        Self {
            tree: tree.into(),
            key: None,
            file: None,
            privacy: None,
            format: None,
            encoding: None,
            line_endings: None,
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn privacy(mut self, privacy: Privacy) -> Self {
        self.privacy = Some(privacy);
        self
    }

    pub fn format(mut self, format: ExportFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn line_endings(mut self, line_endings: LineEndings) -> Self {
        self.line_endings = Some(line_endings);
        self
    }

    /// Name the server gives the export, which falls back to the tree name.
    pub fn file_name(&self) -> &str {
        match self.file.as_deref() {
            Some(file) if !file.is_empty() => file,
            _ => &self.tree,
        }
    }

    pub fn local_file_name(&self) -> String {
        let format = self.format.unwrap_or(ExportFormat::Gedcom);
        format!("{}.{}", self.file_name(), format.extension())
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("tree".to_string(), self.tree.clone())];

        let optional = [
            ("key", self.key.clone()),
            ("file", self.file.clone()),
            ("privacy", self.privacy.map(|p| p.as_str().to_string())),
            ("format", self.format.map(|f| f.as_str().to_string())),
            ("encoding", self.encoding.map(|e| e.as_str().to_string())),
            ("line_endings", self.line_endings.map(|l| l.as_str().to_string())),
        ];
        params.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.map(|value| (name.to_string(), value))),
        );

        params
    }

    pub fn into_request(self, url: impl Into<String>) -> RequestSpec {
        RequestSpec::new(url).params(self.to_params())
    }
}
