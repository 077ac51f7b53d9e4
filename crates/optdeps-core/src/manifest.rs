//! Project manifest model, patching and I/O.
//!
//! The manifest is a JSON document (`composer.json` style). Only `require`,
//! `require-dev`, `extra.<tool-key>` and `config.vendor-dir` are interpreted;
//! every other key is carried through untouched and in its original order.
//!
//! # Example
//!
//! ```json
//! {
//!     "name": "acme/skeleton",
//!     "require": {
//!         "php": "^7.1"
//!     },
//!     "extra": {
//!         "optional-packages": [
//!             {"name": "zendframework/zend-db", "constraint": "^2.8.1", "module": true}
//!         ]
//!     }
//! }
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use similar::TextDiff;

use crate::error::{Error, Result};
use crate::selection::Selection;

pub const REQUIRE: &str = "require";
pub const REQUIRE_DEV: &str = "require-dev";
pub const EXTRA: &str = "extra";

const DEFAULT_INDENT: &str = "    ";
const DEFAULT_VENDOR_DIR: &str = "vendor";

/// In-memory view of a manifest document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ManifestView {
    root: Map<String, Value>,
}

impl ManifestView {
    /// Parse manifest JSON. The root must be an object.
    pub fn parse(source: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(source)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(Error::ManifestShape {
                reason: format!("root must be an object, found {}", type_name(&other)),
            }),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Entries of `require`, in document order.
    pub fn requires(&self) -> Vec<(&str, &str)> {
        self.section_entries(REQUIRE)
    }

    /// Entries of `require-dev`, in document order.
    pub fn dev_requires(&self) -> Vec<(&str, &str)> {
        self.section_entries(REQUIRE_DEV)
    }

    /// Look up a single requirement.
    pub fn requirement(&self, dev: bool, name: &str) -> Option<&str> {
        self.root
            .get(section_key(dev))
            .and_then(|section| section.get(name))
            .and_then(Value::as_str)
    }

    /// Whether `extra.<tool_key>` exists, whatever its content.
    pub fn has_declarations(&self, tool_key: &str) -> bool {
        self.extra().is_some_and(|extra| extra.contains_key(tool_key))
    }

    /// Raw declarations under `extra.<tool_key>`.
    ///
    /// A missing node yields an empty list; a node that is not an array is
    /// logged and treated as empty.
    pub fn declarations(&self, tool_key: &str) -> Vec<Value> {
        match self.extra().and_then(|extra| extra.get(tool_key)) {
            None => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(other) => {
                tracing::warn!(
                    "extra.{tool_key} should be an array of declarations, found {}",
                    type_name(other)
                );
                Vec::new()
            }
        }
    }

    /// The install directory from `config.vendor-dir`, or `vendor`.
    pub fn vendor_dir(&self) -> &str {
        self.root
            .get("config")
            .and_then(|config| config.get("vendor-dir"))
            .and_then(Value::as_str)
            .filter(|dir| !dir.is_empty())
            .unwrap_or(DEFAULT_VENDOR_DIR)
    }

    /// Set `require[name]` or `require-dev[name]`.
    ///
    /// An existing entry is overwritten in place. A missing section is
    /// appended to the document.
    pub fn set_requirement(&mut self, dev: bool, name: &str, constraint: &str) {
        let key = section_key(dev);
        let section = self
            .root
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));

        if !section.is_object() {
            tracing::warn!("replacing non-object '{key}' section");
            *section = Value::Object(Map::new());
        }

        if let Value::Object(entries) = section {
            if let Some(previous) = entries.insert(name.to_string(), constraint.into()) {
                tracing::debug!(%previous, name, constraint, "overwrote existing requirement");
            }
        }
    }

    /// Remove `extra.<tool_key>`, and `extra` itself once it is empty.
    ///
    /// Returns whether anything was removed.
    pub fn remove_declarations(&mut self, tool_key: &str) -> bool {
        let Some(Value::Object(extra)) = self.root.get_mut(EXTRA) else {
            return false;
        };

        // shift_remove keeps the remaining keys in document order
        let removed = extra.shift_remove(tool_key).is_some();
        if extra.is_empty() {
            self.root.shift_remove(EXTRA);
        }
        removed
    }

    fn extra(&self) -> Option<&Map<String, Value>> {
        self.root.get(EXTRA).and_then(Value::as_object)
    }

    fn section_entries(&self, key: &str) -> Vec<(&str, &str)> {
        self.root
            .get(key)
            .and_then(Value::as_object)
            .map(|section| {
                section
                    .iter()
                    .filter_map(|(name, constraint)| Some((name.as_str(), constraint.as_str()?)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn section_key(dev: bool) -> &'static str {
    if dev { REQUIRE_DEV } else { REQUIRE }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Merges a selection into a manifest.
#[derive(Debug, Clone)]
pub struct ManifestPatcher {
    tool_key: String,
}

impl ManifestPatcher {
    pub fn new(tool_key: impl Into<String>) -> Self {
        Self {
            tool_key: tool_key.into(),
        }
    }

    pub fn tool_key(&self) -> &str {
        &self.tool_key
    }

    /// Return a copy of `manifest` with every selected package required and
    /// the declaration block removed.
    ///
    /// The declaration block is removed even when `selection` is empty.
    pub fn patch(&self, manifest: &ManifestView, selection: &Selection) -> ManifestView {
        let mut patched = manifest.clone();
        for package in selection {
            patched.set_requirement(package.is_dev(), package.name(), package.constraint());
        }
        patched.remove_declarations(&self.tool_key);
        patched
    }
}

/// A manifest file on disk together with its formatting.
///
/// Rendering edits the loaded text rather than re-serializing it: members
/// whose value did not change are copied byte for byte, so escapes, inline
/// arrays and spacing outside the edited keys survive a save.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    path: PathBuf,
    source: String,
    view: ManifestView,
    indent: String,
}

impl ManifestDocument {
    /// Read and parse the manifest at `path`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(Error::ManifestNotFound(path));
        }
        let source = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        Self::from_source(path, source)
    }

    /// Parse manifest content that belongs at `path`.
    pub fn from_source(path: impl Into<PathBuf>, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let view = ManifestView::parse(&source)?;
        Ok(Self {
            path: path.into(),
            indent: detect_indent(&source),
            source,
            view,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn view(&self) -> &ManifestView {
        &self.view
    }

    /// The text as loaded (or as last saved).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render `view` as an edit of the loaded text.
    ///
    /// Changed values are re-serialized with the detected indentation; new
    /// members are appended after the last existing one.
    pub fn render(&self, view: &ManifestView) -> Result<String> {
        if *view == self.view {
            return Ok(self.source.clone());
        }

        let bytes = self.source.as_bytes();
        let open = skip_ws(bytes, 0);
        let close = skip_value(bytes, open)?;
        let body = splice_object(
            &self.source,
            open,
            self.view.as_map(),
            view.as_map(),
            &self.indent,
            0,
        )?;
        Ok(format!(
            "{}{}{}",
            &self.source[..open],
            body,
            &self.source[close..]
        ))
    }

    /// Unified diff between the file as loaded and `view`.
    pub fn diff(&self, view: &ManifestView) -> Result<String> {
        let rendered = self.render(view)?;
        let name = self.path.display().to_string();
        Ok(TextDiff::from_lines(&self.source, &rendered)
            .unified_diff()
            .header(&name, &name)
            .to_string())
    }

    /// Write `view` to the document's path atomically.
    pub fn save(&mut self, view: &ManifestView) -> Result<()> {
        let rendered = self.render(view)?;
        write_atomic(&self.path, rendered.as_bytes())?;
        tracing::info!(path = %self.path.display(), "wrote manifest");
        self.source = rendered;
        self.view = view.clone();
        Ok(())
    }
}

/// Byte offsets of one `"key": value` member inside an object.
#[derive(Debug)]
struct MemberSpan {
    key: String,
    /// Just after `{` or the preceding comma.
    lead_start: usize,
    key_start: usize,
    value_start: usize,
    value_end: usize,
    /// The separating comma, or `value_end` for the last member.
    end: usize,
}

#[derive(Debug)]
struct ObjectSpan {
    open: usize,
    close: usize,
    members: Vec<MemberSpan>,
}

impl ObjectSpan {
    fn tail_start(&self) -> usize {
        self.members
            .last()
            .map_or(self.open + 1, |member| member.end)
    }
}

fn malformed(at: usize) -> Error {
    Error::ManifestShape {
        reason: format!("unexpected content at byte {at}"),
    }
}

fn skip_ws(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t' | b'\n' | b'\r') {
        pos += 1;
    }
    pos
}

/// End of the string literal starting at `pos`.
fn skip_string(bytes: &[u8], start: usize) -> Result<usize> {
    if bytes.get(start) != Some(&b'"') {
        return Err(malformed(start));
    }
    let mut pos = start + 1;
    while let Some(&byte) = bytes.get(pos) {
        match byte {
            b'\\' => pos += 2,
            b'"' => return Ok(pos + 1),
            _ => pos += 1,
        }
    }
    Err(malformed(start))
}

/// End of the JSON value starting at `pos`.
fn skip_value(bytes: &[u8], start: usize) -> Result<usize> {
    match bytes.get(start) {
        Some(b'"') => skip_string(bytes, start),
        Some(b'{' | b'[') => {
            let mut depth = 0usize;
            let mut pos = start;
            while let Some(&byte) = bytes.get(pos) {
                match byte {
                    b'"' => {
                        pos = skip_string(bytes, pos)?;
                        continue;
                    }
                    b'{' | b'[' => depth += 1,
                    b'}' | b']' => {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(pos + 1);
                        }
                    }
                    _ => {}
                }
                pos += 1;
            }
            Err(malformed(start))
        }
        Some(_) => {
            let mut pos = start;
            while pos < bytes.len()
                && !matches!(bytes[pos], b',' | b'}' | b']' | b' ' | b'\t' | b'\n' | b'\r')
            {
                pos += 1;
            }
            Ok(pos)
        }
        None => Err(malformed(start)),
    }
}

fn scan_object(source: &str, open: usize) -> Result<ObjectSpan> {
    let bytes = source.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return Err(malformed(open));
    }

    let mut members = Vec::new();
    let mut pos = open + 1;
    loop {
        let lead_start = pos;
        let key_start = skip_ws(bytes, pos);
        if members.is_empty() && bytes.get(key_start) == Some(&b'}') {
            return Ok(ObjectSpan {
                open,
                close: key_start,
                members,
            });
        }

        let key_end = skip_string(bytes, key_start)?;
        let key: String = serde_json::from_str(&source[key_start..key_end])?;
        let colon = skip_ws(bytes, key_end);
        if bytes.get(colon) != Some(&b':') {
            return Err(malformed(colon));
        }
        let value_start = skip_ws(bytes, colon + 1);
        let value_end = skip_value(bytes, value_start)?;
        let after = skip_ws(bytes, value_end);

        let mut member = MemberSpan {
            key,
            lead_start,
            key_start,
            value_start,
            value_end,
            end: value_end,
        };
        match bytes.get(after) {
            Some(b',') => {
                member.end = after;
                members.push(member);
                pos = after + 1;
            }
            Some(b'}') => {
                members.push(member);
                return Ok(ObjectSpan {
                    open,
                    close: after,
                    members,
                });
            }
            _ => return Err(malformed(after)),
        }
    }
}

/// Serialize `value` for a member nested `depth` levels deep.
fn render_value(value: &Value, indent: &str, depth: usize) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;

    let rendered = String::from_utf8(buf).map_err(|e| Error::ManifestShape {
        reason: e.to_string(),
    })?;
    Ok(rendered.replace('\n', &format!("\n{}", indent.repeat(depth))))
}

/// Rewrite the object at `open` from `old` to `new`, copying the text of
/// every member whose value is unchanged.
fn splice_object(
    source: &str,
    open: usize,
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    indent: &str,
    depth: usize,
) -> Result<String> {
    if new.is_empty() {
        return Ok("{}".to_string());
    }

    let object = scan_object(source, open)?;
    let appended_lead = match object.members.last() {
        Some(last) if last.key_start > last.lead_start => {
            source[last.lead_start..last.key_start].to_string()
        }
        Some(_) => " ".to_string(),
        None => format!("\n{}", indent.repeat(depth + 1)),
    };

    let mut chunks = Vec::with_capacity(new.len());
    for (key, value) in new {
        // the last duplicate is the one serde_json kept
        let existing = object.members.iter().rev().find(|m| m.key == *key);
        match (existing, old.get(key)) {
            (Some(member), Some(previous)) => {
                let body = match (previous, value) {
                    _ if previous == value => {
                        source[member.value_start..member.value_end].to_string()
                    }
                    (Value::Object(old_inner), Value::Object(new_inner)) => splice_object(
                        source,
                        member.value_start,
                        old_inner,
                        new_inner,
                        indent,
                        depth + 1,
                    )?,
                    _ => render_value(value, indent, depth + 1)?,
                };
                chunks.push(format!(
                    "{}{}{}",
                    &source[member.lead_start..member.value_start],
                    body,
                    &source[member.value_end..member.end]
                ));
            }
            _ => chunks.push(format!(
                "{appended_lead}{}: {}",
                serde_json::to_string(key)?,
                render_value(value, indent, depth + 1)?
            )),
        }
    }

    let tail = if object.members.is_empty() {
        format!("\n{}", indent.repeat(depth))
    } else {
        source[object.tail_start()..object.close].to_string()
    };
    Ok(format!("{{{}{tail}}}", chunks.join(",")))
}

/// Indentation of the first indented line, or four spaces.
fn detect_indent(source: &str) -> String {
    source
        .lines()
        .find_map(|line| {
            let indent: String = line
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect();
            (!indent.is_empty() && indent.len() < line.len()).then_some(indent)
        })
        .unwrap_or_else(|| DEFAULT_INDENT.to_string())
}

/// Write content atomically to a file with locking.
///
/// Writes to a temp file in the same directory, then renames over the
/// target.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    FileExt::lock_exclusive(&temp_file).map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    let written = temp_file
        .write_all(content)
        .and_then(|()| temp_file.sync_all())
        .map_err(|e| Error::io(&temp_path, e));
    let _ = FileExt::unlock(&temp_file);
    drop(temp_file);

    let result =
        written.and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
