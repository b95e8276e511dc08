//! Session backed by a live process through `/proc/<pid>/mem`, or by the
//! running kernel through `/proc/kcore`.

use super::kcore::{KcoreMap, KCORE_PATH};
use super::{Endian, Session, SessionError, TypeInfo, TypeKind};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Environment variable exposing the attached pid to sourced scripts.
pub const PID_ENV: &str = "DBGSH_PID";

/// A session on a local process, the live kernel, or no target at all.
#[derive(Debug)]
pub struct ProcessSession {
    pid: Option<u32>,
    mem_path: Option<PathBuf>,
    /// Set for kernel targets: reads go through the core's segment map.
    kcore: Option<KcoreMap>,
    word_size: usize,
}

impl ProcessSession {
    /// Attaches to `pid`. Fails when the process has no readable memory file.
    pub fn attach(pid: u32) -> std::io::Result<Self> {
        let mem_path = PathBuf::from(format!("/proc/{pid}/mem"));
        File::open(&mem_path)?;
        info!("Attached to process {pid}");
        Ok(Self {
            pid: Some(pid),
            mem_path: Some(mem_path),
            kcore: None,
            word_size: std::mem::size_of::<usize>(),
        })
    }

    /// Attaches to the running kernel through `/proc/kcore`.
    pub fn kernel() -> std::io::Result<Self> {
        Self::open_kcore(Path::new(KCORE_PATH))
    }

    /// Opens a kernel core file. The session reports a Linux kernel target.
    pub fn open_kcore(path: &Path) -> std::io::Result<Self> {
        let map = KcoreMap::load(path)?;
        info!(
            "Opened kernel core {} ({} segments)",
            path.display(),
            map.segments().len()
        );
        Ok(Self {
            pid: None,
            mem_path: Some(path.to_path_buf()),
            kcore: Some(map),
            word_size: 8,
        })
    }

    /// A session with no target: memory reads fail, type lookup still works.
    pub fn detached() -> Self {
        Self {
            pid: None,
            mem_path: None,
            kcore: None,
            word_size: std::mem::size_of::<usize>(),
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
}

impl Session for ProcessSession {
    fn read_memory(&self, address: u64, len: usize) -> Result<Vec<u8>, SessionError> {
        let path = self.mem_path.as_ref().ok_or(SessionError::NotAttached)?;
        let read_err = |source| SessionError::Read {
            address,
            len,
            source,
        };
        let offset = match &self.kcore {
            Some(map) => map
                .translate(address, len)
                .ok_or(SessionError::ShortRead { address, len, got: 0 })?,
            None => address,
        };
        let mut file = File::open(path).map_err(read_err)?;
        file.seek(SeekFrom::Start(offset)).map_err(read_err)?;

        let mut buf = vec![0u8; len];
        let mut got = 0;
        while got < len {
            match file.read(&mut buf[got..]) {
                Ok(0) => break,
                Ok(n) => got += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(read_err(e)),
            }
        }
        if got < len {
            return Err(SessionError::ShortRead { address, len, got });
        }
        Ok(buf)
    }

    fn find_type(&self, name: &str) -> Result<TypeInfo, SessionError> {
        let name = normalize_type_name(name);
        if name.ends_with('*') {
            return Ok(TypeInfo {
                name,
                size: self.word_size,
                kind: TypeKind::Pointer,
            });
        }
        let (size, kind) = scalar_layout(&name, self.word_size)
            .ok_or_else(|| SessionError::UnknownType(name.clone()))?;
        Ok(TypeInfo { name, size, kind })
    }

    fn run_script(&mut self, path: &Path, args: &[String]) -> Result<(), SessionError> {
        debug!("Running script {} {:?}", path.display(), args);
        let mut cmd = Command::new(path);
        cmd.args(args);
        if let Some(pid) = self.pid {
            cmd.env(PID_ENV, pid.to_string());
        }
        let status = cmd.status().map_err(|e| SessionError::Script {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if !status.success() {
            return Err(SessionError::Script {
                path: path.to_path_buf(),
                message: format!("exited with {status}"),
            });
        }
        Ok(())
    }

    fn word_size(&self) -> usize {
        self.word_size
    }

    fn endian(&self) -> Endian {
        match &self.kcore {
            Some(map) => map.endian(),
            None => Endian::native(),
        }
    }

    fn is_linux_kernel(&self) -> bool {
        self.kcore.is_some()
    }
}

/// Collapses whitespace and groups pointer stars: `"char**"` → `"char **"`.
fn normalize_type_name(name: &str) -> String {
    let stars = name.chars().filter(|c| *c == '*').count();
    let mut out = name
        .replace('*', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if stars > 0 {
        out.push(' ');
        out.push_str(&"*".repeat(stars));
    }
    out
}

fn scalar_layout(name: &str, word_size: usize) -> Option<(usize, TypeKind)> {
    let layout = match name {
        "char" | "signed char" | "unsigned char" | "int8_t" | "uint8_t" => (1, TypeKind::Integer),
        "short" | "unsigned short" | "int16_t" | "uint16_t" => (2, TypeKind::Integer),
        "int" | "unsigned int" | "int32_t" | "uint32_t" => (4, TypeKind::Integer),
        "long" | "unsigned long" | "size_t" | "ssize_t" => (word_size, TypeKind::Integer),
        "long long" | "unsigned long long" | "int64_t" | "uint64_t" => (8, TypeKind::Integer),
        "float" => (4, TypeKind::Float),
        "double" => (8, TypeKind::Float),
        "_Bool" | "bool" => (1, TypeKind::Bool),
        "void" => (0, TypeKind::Void),
        _ => return None,
    };
    Some(layout)
}
