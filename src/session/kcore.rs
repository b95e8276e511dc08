//! Virtual-address view of a kernel core file such as `/proc/kcore`.
//!
//! The core is an ELF64 file; each `PT_LOAD` program header maps a range of
//! kernel virtual addresses to a range of file offsets.

use super::Endian;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Live kernel core exposed by procfs.
pub const KCORE_PATH: &str = "/proc/kcore";

const ELF_MAGIC: &[u8; 4] = b"\x7fELF";
const ELF_HEADER_LEN: usize = 64;
const PHDR_LEN: usize = 56;
const PT_LOAD: u32 = 1;

/// One loadable segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub vaddr: u64,
    pub offset: u64,
    pub size: u64,
}

/// Loadable segments of a kernel core, in program header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KcoreMap {
    segments: Vec<Segment>,
    endian: Endian,
}

impl KcoreMap {
    /// Reads the ELF and program headers of the core at `path`.
    pub fn load(path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let mut header = [0u8; ELF_HEADER_LEN];
        file.read_exact(&mut header)?;
        let layout = HeaderLayout::parse(&header)?;

        let table_len = usize::from(layout.phentsize) * usize::from(layout.phnum);
        let mut table = vec![0u8; table_len];
        file.seek(SeekFrom::Start(layout.phoff))?;
        file.read_exact(&mut table)?;

        Ok(Self {
            segments: parse_segments(&table, layout.phentsize, layout.endian),
            endian: layout.endian,
        })
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// File offset of `[address, address + len)`, if one segment covers it.
    pub fn translate(&self, address: u64, len: usize) -> Option<u64> {
        let end = address.checked_add(len as u64)?;
        self.segments
            .iter()
            .find(|s| address >= s.vaddr && end <= s.vaddr.saturating_add(s.size))
            .map(|s| s.offset + (address - s.vaddr))
    }
}

#[derive(Debug, PartialEq, Eq)]
struct HeaderLayout {
    endian: Endian,
    phoff: u64,
    phentsize: u16,
    phnum: u16,
}

impl HeaderLayout {
    fn parse(header: &[u8; ELF_HEADER_LEN]) -> io::Result<Self> {
        if &header[..4] != ELF_MAGIC {
            return Err(invalid("not an ELF file"));
        }
        if header[4] != 2 {
            return Err(invalid("only 64-bit cores are supported"));
        }
        let endian = match header[5] {
            1 => Endian::Little,
            2 => Endian::Big,
            other => return Err(invalid(format!("unknown ELF data encoding {other}"))),
        };
        let phentsize = field_u16(header, 0x36, endian);
        if usize::from(phentsize) < PHDR_LEN {
            return Err(invalid(format!("program header entry too small: {phentsize}")));
        }
        Ok(Self {
            endian,
            phoff: field_u64(header, 0x20, endian),
            phentsize,
            phnum: field_u16(header, 0x38, endian),
        })
    }
}

fn parse_segments(table: &[u8], entsize: u16, endian: Endian) -> Vec<Segment> {
    table
        .chunks_exact(usize::from(entsize))
        .filter(|entry| field_u32(entry, 0, endian) == PT_LOAD)
        .map(|entry| Segment {
            offset: field_u64(entry, 8, endian),
            vaddr: field_u64(entry, 16, endian),
            size: field_u64(entry, 32, endian),
        })
        .collect()
}

fn field_u16(bytes: &[u8], at: usize, endian: Endian) -> u16 {
    let raw = [bytes[at], bytes[at + 1]];
    match endian {
        Endian::Little => u16::from_le_bytes(raw),
        Endian::Big => u16::from_be_bytes(raw),
    }
}

fn field_u32(bytes: &[u8], at: usize, endian: Endian) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[at..at + 4]);
    match endian {
        Endian::Little => u32::from_le_bytes(raw),
        Endian::Big => u32::from_be_bytes(raw),
    }
}

fn field_u64(bytes: &[u8], at: usize, endian: Endian) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    match endian {
        Endian::Little => u64::from_le_bytes(raw),
        Endian::Big => u64::from_be_bytes(raw),
    }
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// Builds a little-endian ELF64 core with one `PT_LOAD` segment per
/// `(vaddr, contents)` pair, contents laid out after the headers.
#[cfg(test)]
pub(crate) fn build_core(segments: &[(u64, &[u8])]) -> Vec<u8> {
    let phoff = ELF_HEADER_LEN as u64;
    let mut data_offset = phoff + (PHDR_LEN * segments.len()) as u64;

    let mut out = vec![0u8; ELF_HEADER_LEN];
    out[..4].copy_from_slice(ELF_MAGIC);
    out[4] = 2;
    out[5] = 1;
    out[6] = 1;
    out[0x10..0x12].copy_from_slice(&4u16.to_le_bytes());
    out[0x20..0x28].copy_from_slice(&phoff.to_le_bytes());
    out[0x36..0x38].copy_from_slice(&(PHDR_LEN as u16).to_le_bytes());
    out[0x38..0x3a].copy_from_slice(&(segments.len() as u16).to_le_bytes());

    for (vaddr, contents) in segments {
        let mut phdr = [0u8; PHDR_LEN];
        phdr[0..4].copy_from_slice(&PT_LOAD.to_le_bytes());
        phdr[8..16].copy_from_slice(&data_offset.to_le_bytes());
        phdr[16..24].copy_from_slice(&vaddr.to_le_bytes());
        phdr[32..40].copy_from_slice(&(contents.len() as u64).to_le_bytes());
        phdr[40..48].copy_from_slice(&(contents.len() as u64).to_le_bytes());
        out.extend_from_slice(&phdr);
        data_offset += contents.len() as u64;
    }
    for (_, contents) in segments {
        out.extend_from_slice(contents);
    }
    out
}
