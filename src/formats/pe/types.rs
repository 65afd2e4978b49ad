//! PE type definitions and structures

use thiserror::Error;

// Signatures
pub const DOS_SIGNATURE: u16 = 0x5A4D; // MZ
pub const PE_SIGNATURE: [u8; 4] = *b"PE\0\0";
pub const PE32_MAGIC: u16 = 0x10B;
pub const PE32PLUS_MAGIC: u16 = 0x20B;

// Fixed structure sizes
pub const DOS_HEADER_SIZE: usize = 64;
pub const COFF_HEADER_SIZE: usize = 20;
pub const SECTION_HEADER_SIZE: usize = 40;
pub const IMPORT_DESCRIPTOR_SIZE: usize = 20;
pub const DATA_DIRECTORY_SIZE: usize = 8;
pub const MAX_DATA_DIRECTORIES: usize = 16;

// Data directory index of the import table
pub const IMAGE_DIRECTORY_ENTRY_IMPORT: usize = 1;

/// Loader limit on section count
pub const MAX_SECTIONS: u16 = 96;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeError {
    #[error("Invalid DOS signature")]
    InvalidDosSignature,
    #[error("Invalid PE signature")]
    InvalidPeSignature,
    #[error("Invalid optional header magic: 0x{0:04x}")]
    InvalidMagic(u16),
    #[error("Truncated header: expected {expected} bytes, got {actual}")]
    TruncatedHeader { expected: usize, actual: usize },
    #[error("Invalid RVA: 0x{rva:08x}")]
    InvalidRva { rva: u32 },
    #[error("Invalid file offset: 0x{offset:x}")]
    InvalidOffset { offset: usize },
    #[error("Malformed import table: {0}")]
    MalformedImportTable(&'static str),
    #[error("Too many sections: {0}")]
    TooManySections(u16),
    #[error("Limit exceeded: {0}")]
    LimitExceeded(&'static str),
    #[error("Invalid string encoding")]
    InvalidString,
}

pub type Result<T> = std::result::Result<T, PeError>;

/// Machine types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machine {
    Unknown,
    I386,   // 0x014c
    X86_64, // 0x8664
    Arm,    // 0x01c0
    ArmNT,  // 0x01c4
    Arm64,  // 0xaa64
    IA64,   // 0x0200
    Other(u16),
}

impl From<u16> for Machine {
    fn from(value: u16) -> Self {
        match value {
            0x0000 => Self::Unknown,
            0x014c => Self::I386,
            0x8664 => Self::X86_64,
            0x01c0 => Self::Arm,
            0x01c4 => Self::ArmNT,
            0xaa64 => Self::Arm64,
            0x0200 => Self::IA64,
            other => Self::Other(other),
        }
    }
}

impl Machine {
    pub fn name(&self) -> String {
        match self {
            Self::Unknown => "unknown".to_string(),
            Self::I386 => "i386".to_string(),
            Self::X86_64 => "x86_64".to_string(),
            Self::Arm => "arm".to_string(),
            Self::ArmNT => "armnt".to_string(),
            Self::Arm64 => "arm64".to_string(),
            Self::IA64 => "ia64".to_string(),
            Self::Other(m) => format!("0x{:04x}", m),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DosHeader {
    pub e_magic: u16,
    pub e_lfanew: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct CoffHeader {
    pub machine: Machine,
    pub number_of_sections: u16,
    pub time_date_stamp: u32,
    pub size_of_optional_header: u16,
    pub characteristics: u16,
}

/// The optional-header fields triage cares about, for both PE32 and PE32+.
#[derive(Debug, Clone, Copy)]
pub struct OptionalHeader {
    pub magic: u16,
    pub address_of_entry_point: u32,
    pub image_base: u64,
    pub number_of_rva_and_sizes: u32,
}

impl OptionalHeader {
    pub fn is_64bit(&self) -> bool {
        self.magic == PE32PLUS_MAGIC
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NtHeaders {
    pub file_header: CoffHeader,
    pub optional_header: OptionalHeader,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataDirectory {
    pub virtual_address: u32,
    pub size: u32,
}

impl DataDirectory {
    pub fn is_present(&self) -> bool {
        self.virtual_address != 0 && self.size != 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SectionHeader {
    pub name: [u8; 8],
    pub virtual_size: u32,
    pub virtual_address: u32,
    pub size_of_raw_data: u32,
    pub pointer_to_raw_data: u32,
    pub characteristics: u32,
}

#[derive(Debug, Clone)]
pub struct ImportDescriptor<'a> {
    pub dll_name: &'a str,
    pub original_first_thunk: u32,
    pub first_thunk: u32,
    pub entries: Vec<ImportEntry<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry<'a> {
    pub name: Option<&'a str>,
    pub ordinal: Option<u16>,
    pub hint: Option<u16>,
}

/// Bounds applied while walking attacker-controlled tables.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub max_import_descriptors: usize,
    pub max_imports: usize,
    pub max_name_len: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_import_descriptors: 4096,
            max_imports: 65_536,
            max_name_len: 512,
        }
    }
}
