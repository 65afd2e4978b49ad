//! PE header parsing

use crate::formats::pe::types::*;
use crate::formats::pe::utils::{check_bounds, ReadExt};

fn truncated(expected: usize, actual: usize) -> PeError {
    PeError::TruncatedHeader { expected, actual }
}

/// Parse DOS header from data
pub fn parse_dos_header(data: &[u8]) -> Result<DosHeader> {
    if data.len() < DOS_HEADER_SIZE {
        return Err(truncated(DOS_HEADER_SIZE, data.len()));
    }

    let e_magic = data
        .read_u16_le_at(0)
        .ok_or_else(|| truncated(2, data.len()))?;
    if e_magic != DOS_SIGNATURE {
        return Err(PeError::InvalidDosSignature);
    }

    let e_lfanew = data
        .read_u32_le_at(60)
        .ok_or_else(|| truncated(DOS_HEADER_SIZE, data.len()))?;

    Ok(DosHeader { e_magic, e_lfanew })
}

/// Parse COFF header from data at offset
pub fn parse_coff_header(data: &[u8], offset: usize) -> Result<CoffHeader> {
    let header = data
        .read_slice_at(offset, COFF_HEADER_SIZE)
        .ok_or_else(|| truncated(offset.saturating_add(COFF_HEADER_SIZE), data.len()))?;

    // The slice is exactly COFF_HEADER_SIZE bytes, so every read below is in range.
    let u16_at = |o: usize| header.read_u16_le_at(o).unwrap_or_default();
    let u32_at = |o: usize| header.read_u32_le_at(o).unwrap_or_default();

    Ok(CoffHeader {
        machine: Machine::from(u16_at(0)),
        number_of_sections: u16_at(2),
        time_date_stamp: u32_at(4),
        size_of_optional_header: u16_at(16),
        characteristics: u16_at(18),
    })
}

/// Parse the optional header, returning it with the data directories it declares.
///
/// Directories are only read from inside the declared optional header size.
pub fn parse_optional_header(
    data: &[u8],
    offset: usize,
    size: u16,
) -> Result<(OptionalHeader, Vec<DataDirectory>)> {
    let size = size as usize;
    let header = data
        .read_slice_at(offset, size)
        .ok_or_else(|| truncated(offset.saturating_add(size), data.len()))?;

    let magic = header
        .read_u16_le_at(0)
        .ok_or_else(|| truncated(offset + 2, offset + size))?;

    // (image base offset, image base width, rva count offset, directories offset)
    let (base_off, is_64, count_off, dirs_off) = match magic {
        PE32_MAGIC => (28, false, 92, 96),
        PE32PLUS_MAGIC => (24, true, 108, 112),
        _ => return Err(PeError::InvalidMagic(magic)),
    };
    if size < dirs_off {
        return Err(truncated(offset + dirs_off, offset + size));
    }

    let read32 = |o: usize| {
        header
            .read_u32_le_at(o)
            .ok_or(PeError::InvalidOffset { offset: offset + o })
    };
    let image_base = if is_64 {
        header
            .read_u64_le_at(base_off)
            .ok_or(PeError::InvalidOffset {
                offset: offset + base_off,
            })?
    } else {
        read32(base_off)? as u64
    };

    let optional = OptionalHeader {
        magic,
        address_of_entry_point: read32(16)?,
        image_base,
        number_of_rva_and_sizes: read32(count_off)?,
    };

    let room = (size - dirs_off) / DATA_DIRECTORY_SIZE;
    let count = (optional.number_of_rva_and_sizes as usize)
        .min(MAX_DATA_DIRECTORIES)
        .min(room);
    let mut directories = Vec::with_capacity(count);
    for i in 0..count {
        let at = dirs_off + i * DATA_DIRECTORY_SIZE;
        directories.push(DataDirectory {
            virtual_address: read32(at)?,
            size: read32(at + 4)?,
        });
    }

    Ok((optional, directories))
}

/// Parse the NT headers located at `offset` (the DOS header's `e_lfanew`).
pub fn parse_nt_headers(data: &[u8], offset: usize) -> Result<(NtHeaders, Vec<DataDirectory>)> {
    let signature = data
        .read_slice_at(offset, 4)
        .ok_or_else(|| truncated(offset.saturating_add(4), data.len()))?;
    if signature != PE_SIGNATURE {
        return Err(PeError::InvalidPeSignature);
    }

    let file_header = parse_coff_header(data, offset + 4)?;
    let opt_offset = offset + 4 + COFF_HEADER_SIZE;
    let (optional_header, directories) =
        parse_optional_header(data, opt_offset, file_header.size_of_optional_header)?;

    Ok((
        NtHeaders {
            file_header,
            optional_header,
        },
        directories,
    ))
}

/// Parse the section header table.
pub fn parse_section_headers(data: &[u8], offset: usize, count: u16) -> Result<Vec<SectionHeader>> {
    if count > MAX_SECTIONS {
        return Err(PeError::TooManySections(count));
    }
    let table_size = count as usize * SECTION_HEADER_SIZE;
    check_bounds(offset, table_size, data.len())
        .map_err(|_| truncated(offset.saturating_add(table_size), data.len()))?;

    let mut headers = Vec::with_capacity(count as usize);
    for i in 0..count as usize {
        let at = offset + i * SECTION_HEADER_SIZE;
        let raw = data
            .read_slice_at(at, SECTION_HEADER_SIZE)
            .ok_or(PeError::InvalidOffset { offset: at })?;
        let u32_at = |o: usize| raw.read_u32_le_at(o).unwrap_or_default();

        let mut name = [0u8; 8];
        name.copy_from_slice(&raw[..8]);
        headers.push(SectionHeader {
            name,
            virtual_size: u32_at(8),
            virtual_address: u32_at(12),
            size_of_raw_data: u32_at(16),
            pointer_to_raw_data: u32_at(20),
            characteristics: u32_at(36),
        });
    }

    Ok(headers)
}
