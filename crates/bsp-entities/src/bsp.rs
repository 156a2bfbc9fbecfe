//! GoldSrc BSP (version 30) lump directory
//!
//! Only the header is decoded; lumps are read on demand. The entities lump is
//! ASCII text terminated by the first NUL byte or by the end of the lump.

use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::ent::{parse_entities, Entity};
use nav_common::{Error, Result};

/// The only BSP version understood
pub const BSP_VERSION: i32 = 30;

/// Number of entries in the lump directory
pub const HEADER_LUMPS: usize = 15;

/// Lump directory slots, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum LumpType {
    Entities = 0,
    Planes = 1,
    Textures = 2,
    Vertexes = 3,
    Visibility = 4,
    Nodes = 5,
    Texinfo = 6,
    Faces = 7,
    Lighting = 8,
    Clipnodes = 9,
    Leafs = 10,
    Marksurfaces = 11,
    Edges = 12,
    Surfedges = 13,
    Models = 14,
}

/// Position of a lump within the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lump {
    pub offset: i32,
    pub size: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BspHeader {
    pub version: i32,
    pub lumps: [Lump; HEADER_LUMPS],
}

impl BspHeader {
    /// Reads the version and lump directory
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let version = reader.read_i32::<LittleEndian>()?;
        if version != BSP_VERSION {
            return Err(Error::InvalidBsp(version));
        }

        let mut lumps = [Lump::default(); HEADER_LUMPS];
        for lump in lumps.iter_mut() {
            lump.offset = reader.read_i32::<LittleEndian>()?;
            lump.size = reader.read_i32::<LittleEndian>()?;
        }

        Ok(Self { version, lumps })
    }

    pub fn lump(&self, kind: LumpType) -> Lump {
        self.lumps[kind as usize]
    }
}

/// Reads the raw bytes of a lump. A lump outside the file is an I/O error.
pub fn read_lump<R: Read + Seek>(reader: &mut R, lump: &Lump) -> Result<Vec<u8>> {
    if lump.offset < 0 || lump.size < 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("lump at {} with size {}", lump.offset, lump.size),
        )
        .into());
    }

    reader.seek(SeekFrom::Start(lump.offset as u64))?;
    let mut data = vec![0u8; lump.size as usize];
    reader.read_exact(&mut data)?;
    Ok(data)
}

/// Reads the entities lump as text
pub fn read_entities_text<R: Read + Seek>(reader: &mut R) -> Result<String> {
    let header = BspHeader::read_from(reader)?;
    let mut data = read_lump(reader, &header.lump(LumpType::Entities))?;
    if let Some(end) = data.iter().position(|&b| b == 0) {
        data.truncate(end);
    }

    String::from_utf8(data)
        .map_err(|e| Error::InvalidEntities(format!("entities lump is not text: {}", e)))
}

/// Reads and parses the entities of a BSP file
pub fn load_entities<P: AsRef<Path>>(path: P) -> Result<Vec<Entity>> {
    let mut reader = BufReader::new(File::open(path)?);
    let text = read_entities_text(&mut reader)?;
    log::debug!("Entities lump: {} bytes", text.len());
    parse_entities(&text)
}
