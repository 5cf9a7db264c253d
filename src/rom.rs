use std::path::Path;

use crate::RomError;

/// Read a whole ROM file into memory.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<u8>, RomError> {
    let path = path.as_ref();
    let rom = std::fs::read(path).map_err(|source| RomError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("loaded {} bytes from {}", rom.len(), path.display());
    Ok(rom)
}
