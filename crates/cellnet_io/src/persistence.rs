//! Binary save format.
//!
//! A save file is an 8-byte header followed by an rkyv archive:
//!
//! | bytes | content                                   |
//! |-------|-------------------------------------------|
//! | 0..4  | magic `CNET`                              |
//! | 4..8  | format version, little-endian `u32`       |
//! | 8..   | archive: [`GridCapsule`] (v1), [`SaveFile`] (v2) |
//!
//! Writers always emit version 2. Version 1 files carry no activation
//! values, so loading one leaves the caller's rule set as it was.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use cellnet_core::Grid;
use cellnet_data::{GridCapsule, Node, SaveFile};
use rkyv::AlignedVec;

use crate::error::{IoError, Result};

pub const MAGIC: &[u8; 4] = b"CNET";
/// Grid only.
pub const LEGACY_SAVE_VERSION: u32 = 1;
/// Grid plus activation values.
pub const CURRENT_SAVE_VERSION: u32 = 2;

const HEADER_LEN: usize = 8;

/// Result of decoding a save file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedState {
    pub grid: Grid,
    /// `None` for legacy grid-only saves.
    pub activation_values: Option<Vec<f64>>,
}

/// Encodes a grid and its activation values in the current format.
pub fn encode(grid: &Grid, activation_values: &[f64]) -> Result<Vec<u8>> {
    encode_nodes(grid.nodes(), activation_values)
}

/// Encodes a raw node list in the current format. Nothing checks that the
/// nodes form a valid grid; [`decode`] does that on the way back in.
pub fn encode_nodes(nodes: &[Node], activation_values: &[f64]) -> Result<Vec<u8>> {
    let file = SaveFile {
        nodes: nodes.to_vec(),
        activation_values: activation_values.to_vec(),
    };
    let archive = rkyv::to_bytes::<_, 4096>(&file)
        .map_err(|e| IoError::rkyv(format!("serialization failed: {:?}", e)))?;
    Ok(with_header(CURRENT_SAVE_VERSION, &archive))
}

/// Encodes a grid alone in the legacy format.
pub fn encode_grid_only(grid: &Grid) -> Result<Vec<u8>> {
    let capsule = GridCapsule {
        nodes: grid.nodes().to_vec(),
    };
    let archive = rkyv::to_bytes::<_, 4096>(&capsule)
        .map_err(|e| IoError::rkyv(format!("serialization failed: {:?}", e)))?;
    Ok(with_header(LEGACY_SAVE_VERSION, &archive))
}

/// Decodes either save format. Nothing is returned unless the whole
/// archive validates and the nodes form a valid grid.
pub fn decode(bytes: &[u8]) -> Result<LoadedState> {
    if bytes.len() < HEADER_LEN {
        return Err(IoError::validation(format!(
            "save data too short ({} bytes)",
            bytes.len()
        )));
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);
    if &header[..4] != MAGIC {
        return Err(IoError::validation("missing CNET magic"));
    }
    let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

    // rkyv needs the archive at an aligned address
    let mut aligned = AlignedVec::with_capacity(payload.len());
    aligned.extend_from_slice(payload);

    let (nodes, activation_values) = match version {
        CURRENT_SAVE_VERSION => {
            let file = rkyv::from_bytes::<SaveFile>(&aligned)
                .map_err(|e| IoError::rkyv(format!("invalid save archive: {:?}", e)))?;
            (file.nodes, Some(file.activation_values))
        }
        LEGACY_SAVE_VERSION => {
            tracing::info!("Loading legacy grid-only save");
            let capsule = rkyv::from_bytes::<GridCapsule>(&aligned)
                .map_err(|e| IoError::rkyv(format!("invalid grid archive: {:?}", e)))?;
            (capsule.nodes, None)
        }
        v => return Err(IoError::UnsupportedVersion(v)),
    };

    if nodes.is_empty() {
        return Err(IoError::validation("save contains no nodes"));
    }
    Ok(LoadedState {
        grid: Grid::from_nodes(nodes)?,
        activation_values,
    })
}

/// Writes the current format to `path`, replacing any existing file.
pub fn save_state<P: AsRef<Path>>(path: P, grid: &Grid, activation_values: &[f64]) -> Result<()> {
    let bytes = encode(grid, activation_values)?;
    write_file(path.as_ref(), &bytes)
}

/// Writes the legacy grid-only format to `path`.
pub fn save_grid_only<P: AsRef<Path>>(path: P, grid: &Grid) -> Result<()> {
    let bytes = encode_grid_only(grid)?;
    write_file(path.as_ref(), &bytes)
}

pub fn load_state<P: AsRef<Path>>(path: P) -> Result<LoadedState> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| IoError::from(e).with_context(format!("reading {}", path.display())))?;
    decode(&bytes).map_err(|e| e.with_context(format!("decoding {}", path.display())))
}

fn with_header(version: u32, archive: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + archive.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&version.to_le_bytes());
    bytes.extend_from_slice(archive);
    bytes
}

/// Writes a sibling temp file, syncs it, then renames it over `path`, so a
/// failed save never leaves a truncated file behind.
fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    let written = write_synced(&tmp_path, bytes).and_then(|()| {
        std::fs::rename(&tmp_path, path).map_err(|e| {
            IoError::from(e).with_context(format!(
                "renaming {} to {}",
                tmp_path.display(),
                path.display()
            ))
        })
    });
    if written.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    written
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)
        .map_err(|e| IoError::from(e).with_context(format!("creating {}", path.display())))?;
    file.write_all(bytes)
        .map_err(|e| IoError::from(e).with_context(format!("writing {}", path.display())))?;
    file.sync_all()?;
    Ok(())
}
