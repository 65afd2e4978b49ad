//! Section table and address translation

use crate::formats::pe::types::SectionHeader;
use crate::formats::pe::utils::section_name_to_string;

/// Section table with RVA to file-offset translation.
///
/// Sections are kept in file order; malformed images may list them unsorted
/// or overlapping, so lookups scan linearly and take the first match.
#[derive(Debug, Clone, Default)]
pub struct SectionTable {
    sections: Vec<SectionHeader>,
}

impl SectionTable {
    pub fn new(sections: Vec<SectionHeader>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[SectionHeader] {
        &self.sections
    }

    pub fn names(&self) -> Vec<String> {
        self.sections
            .iter()
            .map(|s| section_name_to_string(&s.name))
            .collect()
    }

    /// Convert an RVA to a file offset.
    ///
    /// RVAs below the first section map one to one onto the headers. The
    /// result is not checked against the buffer; callers read through the
    /// bounds-checked helpers.
    pub fn rva_to_offset(&self, rva: u32) -> Option<usize> {
        for section in &self.sections {
            let size = section.virtual_size.max(section.size_of_raw_data);
            let start = section.virtual_address;
            let end = start.saturating_add(size);
            if rva >= start && rva < end {
                let delta = rva - start;
                return section
                    .pointer_to_raw_data
                    .checked_add(delta)
                    .map(|o| o as usize);
            }
        }

        let lowest = self
            .sections
            .iter()
            .map(|s| s.virtual_address)
            .filter(|&va| va != 0)
            .min();
        match lowest {
            Some(va) if rva < va => Some(rva as usize),
            None => Some(rva as usize),
            _ => None,
        }
    }
}
