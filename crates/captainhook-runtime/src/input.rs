use std::collections::BTreeMap;
use std::io;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::error::InputError;

/// Separator between the header block and the raw body.
pub const SEPARATOR: &[u8] = b"\n";

/// What to do when the request body cannot be read completely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPolicy {
    /// Log the error and run the scripts with whatever was read.
    #[default]
    BestEffort,
    /// Reject the request with a server error.
    Strict,
}

/// Payload written to the stdin of every script of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Input {
    stdin: Vec<u8>,
}

impl Input {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            stdin: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.stdin
    }

    pub fn len(&self) -> usize {
        self.stdin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stdin.is_empty()
    }
}

/// Result of reading one request. `error` is set when the body read failed
/// part way; `input` and `body` then hold what was gathered before it.
#[derive(Debug)]
pub struct Gathered {
    pub input: Input,
    pub body: Vec<u8>,
    pub error: Option<InputError>,
}

impl Gathered {
    /// Raw body as text, for argument interpolation.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Build the stdin payload: compact JSON of the header map, `\n`, raw body.
///
/// Header names are canonicalised (`content-type` -> `Content-Type`) and the
/// first value of a repeated header wins. The body stream is read exactly
/// once.
pub async fn gather<I, K, V, R>(headers: I, mut body: R) -> Gathered
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<[u8]>,
    R: AsyncRead + Unpin,
{
    let mut map = BTreeMap::new();
    for (name, value) in headers {
        map.entry(canonical_header_key(name.as_ref()))
            .or_insert_with(|| String::from_utf8_lossy(value.as_ref()).into_owned());
    }

    let mut raw = Vec::new();
    let error = match body.read_to_end(&mut raw).await {
        Ok(_) => None,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(e) => Some(InputError(e)),
    };

    let header_block = serde_json::to_vec(&map).unwrap_or_else(|_| b"{}".to_vec());
    let mut stdin = Vec::with_capacity(header_block.len() + SEPARATOR.len() + raw.len());
    stdin.extend_from_slice(&header_block);
    stdin.extend_from_slice(SEPARATOR);
    stdin.extend_from_slice(&raw);

    debug!(headers = map.len(), body_bytes = raw.len(), "Gathered request input");

    Gathered {
        input: Input { stdin },
        body: raw,
        error,
    }
}

/// `x-github-event` -> `X-Github-Event`
pub fn canonical_header_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        upper = c == '-';
    }
    out
}
