//! In-memory session for testing.
//!
//! Serves reads from registered memory segments, looks types up in a small
//! table and records script invocations instead of running them.

use super::{Endian, Session, SessionError, TypeInfo, TypeKind};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A recorded `run_script` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRun {
    pub path: PathBuf,
    pub args: Vec<String>,
}

/// Deterministic session with canned memory and types.
#[derive(Debug, Clone)]
pub struct MockSession {
    /// Segment start address -> contents.
    segments: BTreeMap<u64, Vec<u8>>,
    types: BTreeMap<String, TypeInfo>,
    scripts: Vec<ScriptRun>,
    script_failure: Option<String>,
    word_size: usize,
    endian: Endian,
    kernel: bool,
}

impl Default for MockSession {
    fn default() -> Self {
        Self {
            segments: BTreeMap::new(),
            types: BTreeMap::new(),
            scripts: Vec::new(),
            script_failure: None,
            word_size: 8,
            endian: Endian::Little,
            kernel: false,
        }
    }
}

impl MockSession {
    /// Creates an empty mock session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `bytes` at `address`.
    pub fn with_memory(mut self, address: u64, bytes: impl Into<Vec<u8>>) -> Self {
        self.segments.insert(address, bytes.into());
        self
    }

    /// Adds a type to the lookup table.
    pub fn with_type(mut self, name: &str, size: usize, kind: TypeKind) -> Self {
        self.types.insert(
            name.to_string(),
            TypeInfo {
                name: name.to_string(),
                size,
                kind,
            },
        );
        self
    }

    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Makes the session report a Linux kernel target.
    pub fn as_kernel(mut self) -> Self {
        self.kernel = true;
        self
    }

    /// Makes every `run_script` call fail with `message`.
    pub fn with_script_failure(mut self, message: impl Into<String>) -> Self {
        self.script_failure = Some(message.into());
        self
    }

    /// Scripts run so far, oldest first.
    pub fn scripts(&self) -> &[ScriptRun] {
        &self.scripts
    }
}

impl Session for MockSession {
    fn read_memory(&self, address: u64, len: usize) -> Result<Vec<u8>, SessionError> {
        let (start, bytes) = self
            .segments
            .range(..=address)
            .next_back()
            .ok_or(SessionError::ShortRead { address, len, got: 0 })?;
        let offset = (address - start) as usize;
        let available = bytes.len().saturating_sub(offset);
        if available < len {
            return Err(SessionError::ShortRead {
                address,
                len,
                got: available,
            });
        }
        Ok(bytes[offset..offset + len].to_vec())
    }

    fn find_type(&self, name: &str) -> Result<TypeInfo, SessionError> {
        self.types
            .get(name.trim())
            .cloned()
            .ok_or_else(|| SessionError::UnknownType(name.trim().to_string()))
    }

    fn run_script(&mut self, path: &Path, args: &[String]) -> Result<(), SessionError> {
        self.scripts.push(ScriptRun {
            path: path.to_path_buf(),
            args: args.to_vec(),
        });
        match &self.script_failure {
            Some(message) => Err(SessionError::Script {
                path: path.to_path_buf(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn word_size(&self) -> usize {
        self.word_size
    }

    fn endian(&self) -> Endian {
        self.endian
    }

    fn is_linux_kernel(&self) -> bool {
        self.kernel
    }
}
