use binscan::formats::pe::PeParser;
use binscan::triage::{extract_metadata, ExecutableMetadata};

use crate::common::pe::{self, Thunk};

fn reason(meta: ExecutableMetadata) -> String {
    match meta {
        ExecutableMetadata::NotRecognized { reason } => reason,
        other => panic!("expected NotRecognized, got {other:?}"),
    }
}

#[test]
fn synthetic_image_parses() {
    let image = pe::with_imports("ADVAPI32.dll", &["RegOpenKeyExA", "RegSetValueExA"]);
    let parser = PeParser::new(&image).unwrap();
    let imports = parser.imports().unwrap();
    assert_eq!(imports.names(), vec!["RegOpenKeyExA", "RegSetValueExA"]);
    assert_eq!(imports.dll_names(), vec!["ADVAPI32.dll"]);
}

#[test]
fn single_import_is_listed() {
    let image = pe::with_imports("KERNEL32.dll", &["CreateFileA"]);
    assert_eq!(extract_metadata(&image).imports(), ["CreateFileA"]);
}

#[test]
fn pe32_plus_reads_eight_byte_thunks() {
    let image = pe::plus_with_thunks(
        "KERNEL32.dll",
        &[Thunk::Name("CreateFileA"), Thunk::Ordinal(17)],
    );
    match extract_metadata(&image) {
        ExecutableMetadata::RecognizedImage(meta) => {
            assert_eq!(meta.imports, vec!["CreateFileA"]);
            assert_eq!(meta.libraries, vec!["KERNEL32.dll"]);
            assert_eq!(meta.ordinal_imports, 1);
            assert!(meta.is_64bit);
            assert_eq!(meta.machine, "x86_64");
            assert_eq!(meta.image_base, 0x1_4000_0000);
            assert_eq!(meta.sections, vec![".idata"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn pe32_ordinal_thunks_are_counted_not_listed() {
    let image = pe::with_thunks(
        "WS2_32.dll",
        &[Thunk::Ordinal(23), Thunk::Name("WSAStartup"), Thunk::Ordinal(4)],
    );
    match extract_metadata(&image) {
        ExecutableMetadata::RecognizedImage(meta) => {
            assert_eq!(meta.imports, vec!["WSAStartup"]);
            assert_eq!(meta.ordinal_imports, 2);
            assert!(!meta.is_64bit);
            assert_eq!(meta.machine, "i386");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn image_without_import_directory_has_no_imports() {
    match extract_metadata(&pe::minimal()) {
        ExecutableMetadata::RecognizedImage(meta) => {
            assert!(meta.imports.is_empty());
            assert!(meta.libraries.is_empty());
            assert_eq!(meta.entry_point, 0x1000);
            assert_eq!(meta.image_base, 0x40_0000);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn import_directory_outside_file_is_not_recognized() {
    let mut image = pe::with_imports("KERNEL32.dll", &["CreateFileA"]);
    let at = pe::import_directory_entry();
    image[at..at + 4].copy_from_slice(&0x0090_0000u32.to_le_bytes());
    assert!(!reason(extract_metadata(&image)).is_empty());
}

#[test]
fn every_truncation_is_handled() {
    let image = pe::with_imports("KERNEL32.dll", &["CreateFileA", "ExitProcess"]);
    for len in 0..image.len() {
        // Must never panic; short prefixes can never be full images
        let meta = extract_metadata(&image[..len]);
        if len < 0x178 {
            assert!(!meta.is_recognized(), "prefix of {len} bytes recognized");
        }
    }
    assert!(extract_metadata(&image).is_recognized());
}

#[test]
fn unterminated_import_name_is_not_recognized() {
    let mut image = pe::with_imports("KERNEL32.dll", &["CreateFileA"]);
    // Fill everything after the hint/name area with printable bytes up to EOF
    let len = image.len();
    for b in &mut image[0x200 + 0x180..len] {
        *b = b'A';
    }
    assert!(!extract_metadata(&image).is_recognized());
}

#[test]
fn pseudo_random_inputs_never_panic() {
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    let base = pe::with_imports("KERNEL32.dll", &["CreateFileA", "VirtualAllocEx"]);
    for _ in 0..2000 {
        let mut image = base.clone();
        for _ in 0..8 {
            let at = (next() as usize) % image.len();
            image[at] = next() as u8;
        }
        let _ = extract_metadata(&image);
    }
}
