//! Reader for the d:swarm GDM JSON serialization.
//!
//! A document is either a JSON array of resources or a whitespace-separated
//! sequence of them. Each resource is an object with a single key, the
//! resource URI, mapping to its statements:
//!
//! ```json
//! {"http://ex.org/r/1": [
//!   {"id": 1, "uuid": "abc-1", "s": {"type": "Resource", "uri": "http://ex.org/r/1"},
//!    "p": "http://purl.org/dc/terms/title", "o": {"type": "Literal", "v": "Foo"},
//!    "order": 1, "evidence": "manual", "confidence": "0.9"}
//! ]}
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::de::{Error as _, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tokio::sync::mpsc;
use tracing::debug;

use super::{ObjectNode, Qualifiers, SourceResource, SourceStatement};
use crate::errors::{ImportError, Result};

/// Parsed resources buffered ahead of the importer.
pub const STREAM_BUFFER: usize = 64;

#[derive(Debug, Deserialize)]
struct GdmStatement {
    s: ObjectNode,
    p: String,
    o: ObjectNode,
    #[serde(default, deserialize_with = "stringish")]
    uuid: Option<String>,
    #[serde(default, deserialize_with = "stringish")]
    order: Option<String>,
    #[serde(default, deserialize_with = "stringish")]
    evidence: Option<String>,
    #[serde(default, deserialize_with = "stringish")]
    confidence: Option<String>,
}

impl From<GdmStatement> for SourceStatement {
    fn from(raw: GdmStatement) -> Self {
        SourceStatement {
            subject: raw.s,
            predicate: raw.p,
            object: raw.o,
            qualifiers: Qualifiers {
                confidence: raw.confidence,
                evidence: raw.evidence,
                order: raw.order,
                uuid: raw.uuid,
            },
        }
    }
}

/// Accept strings, numbers and booleans; `null` maps to `None`.
fn stringish<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// One top-level GDM object: exactly one resource URI and its statements.
struct GdmResource {
    uri: String,
    statements: Vec<GdmStatement>,
}

impl<'de> Deserialize<'de> for GdmResource {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut raw = BTreeMap::<String, Vec<GdmStatement>>::deserialize(deserializer)?;
        if raw.len() != 1 {
            return Err(D::Error::custom(format!(
                "expected a single resource URI per object, found {}",
                raw.len()
            )));
        }
        let (uri, statements) = raw
            .pop_first()
            .ok_or_else(|| D::Error::custom("empty resource object"))?;
        Ok(GdmResource { uri, statements })
    }
}

impl From<GdmResource> for SourceResource {
    fn from(raw: GdmResource) -> Self {
        SourceResource::new(raw.uri, raw.statements.into_iter().map(SourceStatement::from))
    }
}

/// Feeds the elements of a top-level array to a sink one at a time.
struct EachElement<'s, F> {
    sink: &'s mut F,
    stopped: &'s mut bool,
}

impl<'de, F> Visitor<'de> for EachElement<'_, F>
where
    F: FnMut(SourceResource) -> bool,
{
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of GDM resources")
    }

    fn visit_seq<S>(self, mut seq: S) -> std::result::Result<(), S::Error>
    where
        S: SeqAccess<'de>,
    {
        while let Some(raw) = seq.next_element::<GdmResource>()? {
            if !(self.sink)(raw.into()) {
                *self.stopped = true;
                // Leaving the array unfinished makes the caller's end check
                // fail; that error is discarded once stopped.
                return Err(S::Error::custom("stopped"));
            }
        }
        Ok(())
    }
}

/// First byte that is not JSON whitespace, without consuming it.
fn first_significant_byte(reader: &mut impl BufRead) -> std::io::Result<Option<u8>> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(at) => {
                let byte = buf[at];
                reader.consume(at);
                return Ok(Some(byte));
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

/// Parse resources from `reader` and hand each to `sink` as soon as it is
/// complete. Parsing stops early when `sink` returns `false`.
///
/// Resources handed over before a parse error stay handed over; the error is
/// returned after them.
pub fn for_each_resource<R, F>(mut reader: R, mut sink: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(SourceResource) -> bool,
{
    let first = first_significant_byte(&mut reader).map_err(serde_json::Error::io)?;

    match first {
        None => Ok(()),
        Some(b'[') => {
            let mut stopped = false;
            let mut deserializer = serde_json::Deserializer::from_reader(reader);
            let parsed = deserializer
                .deserialize_seq(EachElement {
                    sink: &mut sink,
                    stopped: &mut stopped,
                })
                .and_then(|()| deserializer.end());
            match parsed {
                Err(_) if stopped => Ok(()),
                other => Ok(other?),
            }
        }
        Some(_) => {
            for raw in serde_json::Deserializer::from_reader(reader).into_iter::<GdmResource>() {
                if !sink(raw?.into()) {
                    break;
                }
            }
            Ok(())
        }
    }
}

/// Parse a GDM JSON document held in memory.
pub fn parse_str(input: &str) -> Result<Vec<SourceResource>> {
    let mut resources = Vec::new();
    for_each_resource(input.as_bytes(), |resource| {
        resources.push(resource);
        true
    })?;
    debug!(resources = resources.len(), "parsed GDM document");
    Ok(resources)
}

/// Resources of a GDM file, parsed on a blocking thread as they are read.
///
/// Yields at most one error, after which the stream ends.
pub struct ResourceStream {
    rx: mpsc::Receiver<Result<SourceResource>>,
}

impl ResourceStream {
    pub async fn next(&mut self) -> Option<Result<SourceResource>> {
        self.rx.recv().await
    }
}

/// Start reading `path` in the background.
///
/// Only [`STREAM_BUFFER`] parsed resources are held ahead of the consumer.
/// Dropping the stream stops the reader at the next resource.
pub fn stream_file(path: impl AsRef<Path>) -> ResourceStream {
    let path = path.as_ref().to_path_buf();
    let (tx, rx) = mpsc::channel(STREAM_BUFFER);

    tokio::task::spawn_blocking(move || {
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                let _ = tx.blocking_send(Err(ImportError::io(&path, e)));
                return;
            }
        };

        let mut count = 0usize;
        let result = for_each_resource(BufReader::new(file), |resource| {
            count += 1;
            tx.blocking_send(Ok(resource)).is_ok()
        });
        match result {
            Ok(()) => debug!(path = %path.display(), resources = count, "finished reading input"),
            Err(e) => {
                let _ = tx.blocking_send(Err(e));
            }
        }
    });

    ResourceStream { rx }
}
