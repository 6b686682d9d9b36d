//! Reading a container archive into memory

use crate::error::ParseError;
use crate::model::Package;
use std::io::{Cursor, Read};
use zip::read::ZipArchive;

/// Read every file entry of a ZIP archive, keeping archive order
pub fn read_package(bytes: &[u8]) -> Result<Package, ParseError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut package = Package::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let name = file.name().to_string();

        // Skip directories
        if name.ends_with('/') {
            continue;
        }

        let mut contents = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut contents)?;
        package.insert(name, contents);
    }

    log::debug!("Read container with {} parts", package.len());
    Ok(package)
}
