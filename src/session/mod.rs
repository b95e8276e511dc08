//! Debuggee session collaborator.
//!
//! Commands never talk to the target directly; they go through the
//! [`Session`] trait, which exposes raw and typed memory reads, type lookup
//! and script execution. The console only passes the handle through.

mod kcore;
mod mock;
mod process;

pub use kcore::{KcoreMap, Segment, KCORE_PATH};
pub use mock::{MockSession, ScriptRun};
pub use process::{ProcessSession, PID_ENV};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Byte order of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// Byte order of the machine running the shell.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Little => "little-endian",
            Self::Big => "big-endian",
        }
    }
}

/// Broad classification of a looked-up type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Integer,
    Float,
    Pointer,
    Bool,
    Void,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "floating-point",
            Self::Pointer => "pointer",
            Self::Bool => "boolean",
            Self::Void => "void",
        }
    }
}

/// Result of a type-name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Canonical type name.
    pub name: String,
    /// Size in bytes (0 for incomplete types such as `void`).
    pub size: usize,
    pub kind: TypeKind,
}

/// Errors raised by a session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no target attached")]
    NotAttached,

    #[error("cannot read {len} bytes at 0x{address:x}: {source}")]
    Read {
        address: u64,
        len: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("short read at 0x{address:x}: got {got} of {len} bytes")]
    ShortRead { address: u64, len: usize, got: usize },

    #[error("no type named `{0}'")]
    UnknownType(String),

    #[error("script {} failed: {message}", .path.display())]
    Script { path: PathBuf, message: String },
}

/// The introspection collaborator handed to every command.
pub trait Session {
    /// Reads `len` bytes of target memory starting at `address`.
    fn read_memory(&self, address: u64, len: usize) -> Result<Vec<u8>, SessionError>;

    /// Looks up a type by name.
    fn find_type(&self, name: &str) -> Result<TypeInfo, SessionError>;

    /// Runs an external script against this session.
    fn run_script(&mut self, path: &Path, args: &[String]) -> Result<(), SessionError>;

    /// Pointer width of the target in bytes.
    fn word_size(&self) -> usize {
        8
    }

    fn endian(&self) -> Endian {
        Endian::native()
    }

    /// Whether the target is a Linux kernel (enables the kernel command pack).
    fn is_linux_kernel(&self) -> bool {
        false
    }

    fn read_u8(&self, address: u64) -> Result<u8, SessionError> {
        Ok(read_exact::<1, Self>(self, address)?[0])
    }

    fn read_u16(&self, address: u64) -> Result<u16, SessionError> {
        let bytes = read_exact::<2, Self>(self, address)?;
        Ok(match self.endian() {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        })
    }

    fn read_u32(&self, address: u64) -> Result<u32, SessionError> {
        let bytes = read_exact::<4, Self>(self, address)?;
        Ok(match self.endian() {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        })
    }

    fn read_u64(&self, address: u64) -> Result<u64, SessionError> {
        let bytes = read_exact::<8, Self>(self, address)?;
        Ok(match self.endian() {
            Endian::Little => u64::from_le_bytes(bytes),
            Endian::Big => u64::from_be_bytes(bytes),
        })
    }
}

/// Reads exactly `N` bytes, failing on a short read.
fn read_exact<const N: usize, S: Session + ?Sized>(
    session: &S,
    address: u64,
) -> Result<[u8; N], SessionError> {
    let bytes = session.read_memory(address, N)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| SessionError::ShortRead {
            address,
            len: N,
            got: bytes.len(),
        })
}
