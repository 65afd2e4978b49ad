//! Executable metadata extraction.
//!
//! Parser failures of any kind, including a malformed import table, become
//! [`ExecutableMetadata::NotRecognized`]; nothing here can abort a run.

use crate::formats::pe::{PeParser, Result as PeResult};
use crate::triage::report::{ExecutableMetadata, ImageMetadata};
use tracing::{debug, warn};

/// Read `data` as a PE image and collect its static metadata.
pub fn extract_metadata(data: &[u8]) -> ExecutableMetadata {
    match parse_image(data) {
        Ok(image) => {
            debug!(
                imports = image.imports.len(),
                libraries = image.libraries.len(),
                "Parsed PE image"
            );
            ExecutableMetadata::RecognizedImage(image)
        }
        Err(err) => {
            warn!(error = %err, "Not recognized as a PE image");
            ExecutableMetadata::NotRecognized {
                reason: err.to_string(),
            }
        }
    }
}

fn parse_image(data: &[u8]) -> PeResult<ImageMetadata> {
    let parser = PeParser::new(data)?;
    let imports = parser.imports()?;

    Ok(ImageMetadata {
        imports: imports.names().into_iter().map(str::to_string).collect(),
        libraries: imports.dll_names().into_iter().map(str::to_string).collect(),
        ordinal_imports: imports.ordinal_count(),
        machine: parser.machine().name(),
        is_64bit: parser.is_64bit(),
        entry_point: parser.entry_point(),
        image_base: parser.image_base(),
        sections: parser.section_names(),
    })
}
