//! Substitution variable file parsing.
//!
//! A `.substvar` file is XML holding a list of global variables:
//!
//! ```xml
//! <repository xmlns="http://www.tibco.com/xmlns/repo/types/2002">
//!   <globalVariables>
//!     <globalVariable>
//!       <name>//common-om-connections///Connections/JDBC/Postgres_Appl/USER</name>
//!       <value>svc_orders</value>
//!       <deploymentSettable>true</deploymentSettable>
//!     </globalVariable>
//!   </globalVariables>
//! </repository>
//! ```
//!
//! Parsing ignores namespaces: elements are matched on their local name, so
//! baseline and tier files may use different (or undeclared) prefixes.
//! Only the `name` and `value` of each `globalVariable` are extracted; all
//! other markup is skipped.

use indexmap::IndexMap;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const GLOBAL_VARIABLE: &[u8] = b"globalVariable";
const NAME: &[u8] = b"name";
const VALUE: &[u8] = b"value";

/// A file that could not be read or is not well-formed markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}: {cause}")]
pub struct ParseError {
    /// File name (without directory) of the offending file
    pub file: String,
    /// Underlying reason
    pub cause: String,
}

impl ParseError {
    fn new(file: &str, cause: impl Into<String>) -> Self {
        ParseError {
            file: file.to_string(),
            cause: cause.into(),
        }
    }
}

/// Global variables of one file, keyed by trimmed name.
///
/// Iteration follows the document order of each name's first declaration.
/// A repeated name keeps its position but takes the later value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariableMap {
    entries: IndexMap<String, String>,
}

impl VariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable, trimming both name and value.
    ///
    /// Returns `false` and leaves the map untouched when the name is blank.
    pub fn insert(&mut self, name: &str, value: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.entries.insert(name.to_string(), value.trim().to_string());
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for VariableMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = VariableMap::new();
        for (name, value) in iter {
            map.insert(name.as_ref(), value.as_ref());
        }
        map
    }
}

/// Read and parse a substvar file.
pub fn parse_file(path: &Path) -> Result<VariableMap, ParseError> {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    // Raw bytes: the XML declaration decides the encoding.
    let bytes = fs::read(path).map_err(|e| ParseError::new(&file, e.to_string()))?;
    let vars = parse_events(&file, Reader::from_reader(bytes.as_slice()))?;

    debug!(file = %path.display(), variables = vars.len(), "parsed substvar file");
    Ok(vars)
}

/// Parse substvar markup. `file` only labels errors.
pub fn parse_str(file: &str, text: &str) -> Result<VariableMap, ParseError> {
    parse_events(file, Reader::from_str(text))
}

fn parse_events(file: &str, mut reader: Reader<&[u8]>) -> Result<VariableMap, ParseError> {
    let mut vars = VariableMap::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current: Option<PendingVariable> = None;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| ParseError::new(file, format!("{} (at byte {})", e, position)))?;

        match event {
            Event::Start(start) => {
                if seen_root && depth == 0 {
                    return Err(ParseError::new(file, "content after the root element"));
                }
                depth += 1;
                seen_root = true;
                let local = start.local_name();
                match current.as_mut() {
                    Some(var) => var.open(local.as_ref(), depth),
                    None if local.as_ref() == GLOBAL_VARIABLE => {
                        current = Some(PendingVariable::new(depth));
                    }
                    None => {}
                }
            }
            Event::Empty(start) => {
                if seen_root && depth == 0 {
                    return Err(ParseError::new(file, "content after the root element"));
                }
                seen_root = true;
                // An empty <globalVariable/> has no name and is dropped.
                if let Some(var) = current.as_mut() {
                    var.open_empty(start.local_name().as_ref());
                }
            }
            Event::End(_) => {
                if let Some(var) = current.as_mut() {
                    var.close(depth);
                    if var.depth == depth {
                        if let Some((name, value)) = current.take().and_then(PendingVariable::finish) {
                            vars.insert(&name, &value);
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) if depth == 0 => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    return Err(ParseError::new(file, "text outside the root element"));
                }
            }
            Event::CData(_) if depth == 0 => {
                return Err(ParseError::new(file, "text outside the root element"));
            }
            Event::Text(text) => {
                if let Some(var) = current.as_mut().filter(|v| v.is_capturing()) {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| ParseError::new(file, e.to_string()))?;
                    var.push_text(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some(var) = current.as_mut().filter(|v| v.is_capturing()) {
                    let decoded = reader.decoder().decode(&data).map_err(|e| ParseError::new(file, e.to_string()))?;
                    var.push_text(&decoded);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ParseError::new(file, "unexpected end of document"));
    }
    if !seen_root {
        return Err(ParseError::new(file, "document has no root element"));
    }

    Ok(vars)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Value,
}

impl Field {
    fn from_local_name(local: &[u8]) -> Option<Field> {
        match local {
            NAME => Some(Field::Name),
            VALUE => Some(Field::Value),
            _ => None,
        }
    }
}

/// Text of one `name`/`value` element being collected.
#[derive(Debug)]
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

/// A `globalVariable` element whose end tag has not been seen yet.
#[derive(Debug)]
struct PendingVariable {
    depth: usize,
    name: Option<String>,
    value: Option<String>,
    capture: Option<Capture>,
}

impl PendingVariable {
    fn new(depth: usize) -> Self {
        PendingVariable {
            depth,
            name: None,
            value: None,
            capture: None,
        }
    }

    fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    fn wants(&self, field: Field) -> bool {
        match field {
            Field::Name => self.name.is_none(),
            Field::Value => self.value.is_none(),
        }
    }

    /// Start collecting text for the first `name`/`value` descendant.
    /// Elements nested inside an active capture only contribute text.
    fn open(&mut self, local: &[u8], depth: usize) {
        if self.capture.is_some() {
            return;
        }
        if let Some(field) = Field::from_local_name(local).filter(|f| self.wants(*f)) {
            self.capture = Some(Capture {
                field,
                depth,
                text: String::new(),
            });
        }
    }

    fn open_empty(&mut self, local: &[u8]) {
        if self.capture.is_some() {
            return;
        }
        if let Some(field) = Field::from_local_name(local).filter(|f| self.wants(*f)) {
            self.store(field, String::new());
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(capture) = self.capture.as_mut() {
            capture.text.push_str(text);
        }
    }

    fn close(&mut self, depth: usize) {
        if self.capture.as_ref().is_some_and(|c| c.depth == depth) {
            if let Some(capture) = self.capture.take() {
                self.store(capture.field, capture.text);
            }
        }
    }

    fn store(&mut self, field: Field, text: String) {
        match field {
            Field::Name => self.name = Some(text),
            Field::Value => self.value = Some(text),
        }
    }

    fn finish(self) -> Option<(String, String)> {
        let name = self.name?;
        Some((name, self.value.unwrap_or_default()))
    }
}
