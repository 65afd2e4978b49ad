//! Import table parsing

use crate::formats::pe::sections::SectionTable;
use crate::formats::pe::types::*;
use crate::formats::pe::utils::{read_cstring, ReadExt};

/// Import table in descriptor order
#[derive(Debug, Clone, Default)]
pub struct ImportTable<'a> {
    pub descriptors: Vec<ImportDescriptor<'a>>,
}

impl<'a> ImportTable<'a> {
    /// Get total import count
    pub fn count(&self) -> usize {
        self.descriptors.iter().map(|d| d.entries.len()).sum()
    }

    /// Named imports in traversal order, duplicates retained
    pub fn names(&self) -> Vec<&'a str> {
        self.descriptors
            .iter()
            .flat_map(|d| d.entries.iter().filter_map(|e| e.name))
            .collect()
    }

    /// Imported library names in traversal order
    pub fn dll_names(&self) -> Vec<&'a str> {
        self.descriptors.iter().map(|d| d.dll_name).collect()
    }

    /// Number of imports bound by ordinal only
    pub fn ordinal_count(&self) -> usize {
        self.descriptors
            .iter()
            .flat_map(|d| d.entries.iter())
            .filter(|e| e.ordinal.is_some())
            .count()
    }

    /// Check if an import exists by name
    pub fn has_import(&self, name: &str) -> bool {
        self.names().contains(&name)
    }
}

/// Parse the import directory of a PE image.
///
/// Every RVA is translated and every read is bounds-checked; anything that
/// points outside the buffer or runs past it makes the table malformed.
pub fn parse_imports<'a>(
    data: &'a [u8],
    sections: &SectionTable,
    import_dir: &DataDirectory,
    is_64bit: bool,
    options: &ParseOptions,
) -> Result<ImportTable<'a>> {
    let mut table = ImportTable::default();
    if !import_dir.is_present() {
        return Ok(table);
    }

    let mut offset = sections
        .rva_to_offset(import_dir.virtual_address)
        .ok_or(PeError::InvalidRva {
            rva: import_dir.virtual_address,
        })?;

    let mut total_imports = 0;

    loop {
        let desc = data
            .read_slice_at(offset, IMPORT_DESCRIPTOR_SIZE)
            .ok_or(PeError::MalformedImportTable("descriptor past end of file"))?;

        // Terminator (all zeros)
        if desc.iter().all(|&b| b == 0) {
            break;
        }
        if table.descriptors.len() >= options.max_import_descriptors {
            return Err(PeError::LimitExceeded("import descriptors"));
        }

        let field = |o: usize| desc.read_u32_le_at(o).unwrap_or_default();
        let original_first_thunk = field(0);
        let name_rva = field(12);
        let first_thunk = field(16);

        if name_rva == 0 {
            return Err(PeError::MalformedImportTable("descriptor without a name"));
        }
        let name_offset = sections
            .rva_to_offset(name_rva)
            .ok_or(PeError::InvalidRva { rva: name_rva })?;
        let dll_name = read_cstring(data, name_offset, options.max_name_len)?;

        let thunk_rva = if original_first_thunk != 0 {
            original_first_thunk
        } else {
            first_thunk
        };
        let entries = parse_thunks(
            data,
            sections,
            thunk_rva,
            is_64bit,
            options,
            options.max_imports - total_imports,
        )?;
        total_imports += entries.len();

        table.descriptors.push(ImportDescriptor {
            dll_name,
            original_first_thunk,
            first_thunk,
            entries,
        });

        offset = offset
            .checked_add(IMPORT_DESCRIPTOR_SIZE)
            .ok_or(PeError::InvalidOffset { offset })?;
    }

    Ok(table)
}

fn parse_thunks<'a>(
    data: &'a [u8],
    sections: &SectionTable,
    thunk_rva: u32,
    is_64bit: bool,
    options: &ParseOptions,
    remaining: usize,
) -> Result<Vec<ImportEntry<'a>>> {
    let mut entries = Vec::new();
    if thunk_rva == 0 {
        return Ok(entries);
    }

    let mut thunk_offset = sections
        .rva_to_offset(thunk_rva)
        .ok_or(PeError::InvalidRva { rva: thunk_rva })?;
    let entry_size = if is_64bit { 8 } else { 4 };

    loop {
        let val = if is_64bit {
            data.read_u64_le_at(thunk_offset)
        } else {
            data.read_u32_le_at(thunk_offset).map(u64::from)
        }
        .ok_or(PeError::MalformedImportTable("thunk array past end of file"))?;

        if val == 0 {
            break;
        }
        if entries.len() >= remaining {
            return Err(PeError::LimitExceeded("imported names"));
        }

        let ordinal_flag = if is_64bit { 1u64 << 63 } else { 1u64 << 31 };
        let entry = if val & ordinal_flag != 0 {
            ImportEntry {
                name: None,
                ordinal: Some((val & 0xFFFF) as u16),
                hint: None,
            }
        } else {
            let hint_name_rva = (val & 0x7FFF_FFFF) as u32;
            let hint_offset = sections
                .rva_to_offset(hint_name_rva)
                .ok_or(PeError::InvalidRva { rva: hint_name_rva })?;
            let hint = data
                .read_u16_le_at(hint_offset)
                .ok_or(PeError::InvalidOffset {
                    offset: hint_offset,
                })?;
            let name = read_cstring(data, hint_offset + 2, options.max_name_len)?;
            ImportEntry {
                name: Some(name),
                ordinal: None,
                hint: Some(hint),
            }
        };
        entries.push(entry);

        thunk_offset = thunk_offset
            .checked_add(entry_size)
            .ok_or(PeError::InvalidOffset {
                offset: thunk_offset,
            })?;
    }

    Ok(entries)
}
