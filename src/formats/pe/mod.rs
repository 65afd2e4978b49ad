//! Bounds-checked PE parser
//!
//! Only the structures triage needs are decoded: headers, the section table
//! and the import directory. All reads go through [`utils::ReadExt`], which
//! returns `None` instead of indexing out of range.

use std::cell::OnceCell;

pub mod directories;
pub mod headers;
pub mod sections;
pub mod types;
pub mod utils;

use directories::*;
use headers::*;
use sections::*;
pub use types::*;

/// Main PE parser
pub struct PeParser<'data> {
    data: &'data [u8],
    dos_header: DosHeader,
    nt_headers: NtHeaders,
    data_directories: Vec<DataDirectory>,
    section_table: SectionTable,
    options: ParseOptions,

    // Lazy-loaded data
    imports: OnceCell<ImportTable<'data>>,
}

impl<'data> PeParser<'data> {
    /// Create parser with default options
    pub fn new(data: &'data [u8]) -> Result<Self> {
        Self::with_options(data, ParseOptions::default())
    }

    /// Create parser with custom options
    pub fn with_options(data: &'data [u8], options: ParseOptions) -> Result<Self> {
        let dos_header = parse_dos_header(data)?;

        let nt_offset = dos_header.e_lfanew as usize;
        let (nt_headers, data_directories) = parse_nt_headers(data, nt_offset)?;

        let section_offset = nt_offset
            .checked_add(4 + COFF_HEADER_SIZE)
            .and_then(|o| o.checked_add(nt_headers.file_header.size_of_optional_header as usize))
            .ok_or(PeError::InvalidOffset { offset: nt_offset })?;
        let section_headers = parse_section_headers(
            data,
            section_offset,
            nt_headers.file_header.number_of_sections,
        )?;

        Ok(Self {
            data,
            dos_header,
            nt_headers,
            data_directories,
            section_table: SectionTable::new(section_headers),
            options,
            imports: OnceCell::new(),
        })
    }

    /// Get DOS header
    pub fn dos_header(&self) -> &DosHeader {
        &self.dos_header
    }

    /// Get NT headers
    pub fn nt_headers(&self) -> &NtHeaders {
        &self.nt_headers
    }

    /// Check if PE is 64-bit
    pub fn is_64bit(&self) -> bool {
        self.nt_headers.optional_header.is_64bit()
    }

    /// Get machine type
    pub fn machine(&self) -> Machine {
        self.nt_headers.file_header.machine
    }

    /// Get entry point RVA
    pub fn entry_point(&self) -> u32 {
        self.nt_headers.optional_header.address_of_entry_point
    }

    /// Get image base
    pub fn image_base(&self) -> u64 {
        self.nt_headers.optional_header.image_base
    }

    /// Get all section headers
    pub fn sections(&self) -> &[SectionHeader] {
        self.section_table.sections()
    }

    /// Section names in table order
    pub fn section_names(&self) -> Vec<String> {
        self.section_table.names()
    }

    /// Convert RVA to file offset
    pub fn rva_to_offset(&self, rva: u32) -> Option<usize> {
        self.section_table.rva_to_offset(rva)
    }

    /// Get data directory by index; directories the header omits read as empty
    pub fn data_directory(&self, index: usize) -> DataDirectory {
        self.data_directories
            .get(index)
            .copied()
            .unwrap_or_default()
    }

    /// Get imports (lazy-loaded)
    pub fn imports(&self) -> Result<&ImportTable<'data>> {
        if let Some(imports) = self.imports.get() {
            return Ok(imports);
        }

        let import_dir = self.data_directory(IMAGE_DIRECTORY_ENTRY_IMPORT);
        let imports = parse_imports(
            self.data,
            &self.section_table,
            &import_dir,
            self.is_64bit(),
            &self.options,
        )?;

        Ok(self.imports.get_or_init(|| imports))
    }
}
