use std::io::Cursor;

use mimereg::{ExtensionOverride, MimeError, MimeRegistry, RegistryBuilder};

const SAMPLE_DATASET: &str = "\
###############################
#  Sample media types
###############################

text/plain\t\t\t\ttxt text
# text/x-recovered\t\trec
#text/x-nospace\t\t\tnsp
# this line is a comment
Text/Upper\t\tupper
application/xml\t\txml
application/xml-external-parsed-entity\tent
image/jpeg\t\t\tjpeg jpg jpe jfif
image/x-first\t\tshared
image/x-second\t\tshared
application/vnd.bare
broken line without type
";

fn sample() -> MimeRegistry {
    RegistryBuilder::new()
        .dataset(SAMPLE_DATASET)
        .build()
        .expect("Failed to build sample registry")
}

fn extensions(registry: &MimeRegistry, type_name: &str) -> Vec<String> {
    registry.get(type_name).unwrap().extensions().to_vec()
}

#[test]
fn test_bundled_registry_builds() {
    let _ = env_logger::builder().is_test(true).try_init();

    let registry = MimeRegistry::bundled().expect("Failed to build bundled registry");
    assert!(registry.len() > 1000);
    assert!(registry.contains("application/json"));
    assert_eq!(registry.application_json().unwrap().type_name(), "application/json");
    assert_eq!(registry.image_png().unwrap().type_name(), "image/png");
    assert_eq!(registry.image_tiff().unwrap().type_name(), "image/tiff");
}

#[test]
fn test_jpeg_extensions_override() {
    let registry = MimeRegistry::global().unwrap();
    let jpeg = registry.image_jpeg().unwrap();
    assert_eq!(jpeg.extensions(), ["jpg", "jpeg", "jpe"]);
    assert_eq!(jpeg.preferred_extension(), Some("jpg"));

    for ext in [".JPG", "jpg", "JPG", "jpeg", "jpe"] {
        let resolved = registry.from_extension(ext).unwrap();
        assert_eq!(resolved.type_name(), "image/jpeg", "extension {}", ext);
        assert!(std::ptr::eq(resolved, jpeg));
    }
    assert!(registry.from_extension("jfif").is_none());
}

#[test]
fn test_tiff_extensions_override() {
    let registry = MimeRegistry::global().unwrap();
    assert_eq!(registry.image_tiff().unwrap().extensions(), ["tif", "tiff"]);
    for ext in ["tif", "TIFF"] {
        let resolved = registry.from_extension(ext).unwrap();
        assert_eq!(resolved.type_name(), "image/tiff");
    }
}

#[test]
fn test_xml_gains_ent_extension() {
    let registry = MimeRegistry::global().unwrap();
    let xml = registry.application_xml().unwrap();
    assert_eq!(xml.extensions().last().map(String::as_str), Some("ent"));
    assert_eq!(xml.extensions()[0], "xml");
    assert_eq!(
        registry.from_extension("ent").unwrap().type_name(),
        "application/xml"
    );
}

#[test]
fn test_global_registry_is_shared() {
    let first = MimeRegistry::global().unwrap();
    let second = MimeRegistry::global().unwrap();
    assert!(std::ptr::eq(first, second));
}

#[test]
fn test_global_registry_concurrent_first_access() {
    let handles: Vec<_> = (0..8)
        .map(|_| {
            std::thread::spawn(|| MimeRegistry::global().unwrap() as *const MimeRegistry as usize)
        })
        .collect();
    let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(addresses.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_construction_is_idempotent() {
    let first = MimeRegistry::bundled().unwrap();
    let second = MimeRegistry::bundled().unwrap();

    let names = |r: &MimeRegistry| {
        r.iter()
            .map(|m| (m.type_name(), m.extensions().to_vec()))
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&first), names(&second));

    let mappings = |r: &MimeRegistry| {
        r.extension_mappings()
            .map(|(e, t)| (e.to_string(), t.to_string()))
            .collect::<Vec<_>>()
    };
    assert_eq!(mappings(&first), mappings(&second));
}

#[test]
fn test_commented_types_are_recovered() {
    let registry = sample();
    assert_eq!(extensions(&registry, "text/x-recovered"), ["rec"]);
    assert_eq!(
        registry.from_extension("rec").unwrap().type_name(),
        "text/x-recovered"
    );
}

#[test]
fn test_hash_without_space_stays_commented() {
    let registry = sample();
    assert!(!registry.contains("text/x-nospace"));
    assert!(registry.from_extension("nsp").is_none());

    // The bundled table comments these out because their extensions belong to live types.
    let bundled = MimeRegistry::global().unwrap();
    assert!(!bundled.contains("chemical/x-daylight-smiles"));
    assert!(!bundled.contains("chemical/x-mif"));
    assert_eq!(
        bundled.from_extension("smi").unwrap().type_name(),
        "application/smil+xml"
    );
    assert_eq!(
        bundled.from_extension("mif").unwrap().type_name(),
        "application/vnd.mif"
    );
}

#[test]
fn test_dataset_type_names_are_lowercased() {
    let registry = sample();
    assert!(registry.contains("text/upper"));
    assert!(!registry.contains("Text/Upper"));
    assert_eq!(registry.from_extension("upper").unwrap().type_name(), "text/upper");
}

#[test]
fn test_mixed_case_bundled_entries_resolve() {
    let registry = MimeRegistry::global().unwrap();
    for (ext, type_name) in [
        ("docm", "application/vnd.ms-word.document.macroenabled.12"),
        ("xlsm", "application/vnd.ms-excel.sheet.macroenabled.12"),
        ("pptm", "application/vnd.ms-powerpoint.presentation.macroenabled.12"),
        ("amr", "audio/amr"),
        ("sgml", "text/sgml"),
        ("pcl", "application/vnd.hp-pcl"),
        ("hpgl", "application/vnd.hp-hpgl"),
    ] {
        let resolved = registry
            .from_extension(ext)
            .unwrap_or_else(|| panic!("{} not resolved", ext));
        assert_eq!(resolved.type_name(), type_name);
    }
}

#[test]
fn test_invalid_lines_are_dropped() {
    let registry = sample();
    assert!(!registry.contains("broken"));
    assert!(registry.iter().all(|m| !m.type_name().contains(' ')));
    assert!(registry
        .iter()
        .all(|m| m.type_name() == m.type_name().to_lowercase()));
}

#[test]
fn test_bare_type_lines() {
    let registry = sample();
    let bare = registry.get("application/vnd.bare").unwrap();
    assert!(bare.extensions().is_empty());
}

#[test]
fn test_last_registered_extension_wins() {
    let registry = sample();
    assert_eq!(registry.from_extension("shared").unwrap().type_name(), "image/x-second");
    assert_eq!(registry.type_name_for_extension("shared"), Some("image/x-second"));
}

#[test]
fn test_overrides_move_entries_to_end() {
    let registry = sample();
    let tail: Vec<String> = registry.iter().map(|m| m.type_name()).collect();
    let n = tail.len();
    assert_eq!(tail[n - 2], "image/jpeg");
    assert_eq!(tail[n - 1], "application/xml");

    // application/xml is listed before the entity type but still owns "ent".
    assert_eq!(registry.from_extension("ent").unwrap().type_name(), "application/xml");
    assert_eq!(extensions(&registry, "application/xml"), ["xml", "ent"]);
    assert_eq!(extensions(&registry, "image/jpeg"), ["jpg", "jpeg", "jpe"]);
}

#[test]
fn test_override_for_missing_type_is_skipped() {
    // The sample has no image/tiff, so that stock override is skipped.
    let registry = sample();
    assert!(!registry.contains("image/tiff"));
    assert!(registry.from_extension("tif").is_none());
}

#[test]
fn test_custom_overrides() {
    let builder = RegistryBuilder::new()
        .dataset(SAMPLE_DATASET)
        .replace_extensions("text/plain", ["text", "txt"])
        .append_extensions("image/x-first", ["shared"]);

    assert_eq!(builder.overrides().len(), 5);
    assert_eq!(
        builder.overrides()[4],
        ExtensionOverride::Append {
            type_name: "image/x-first".to_string(),
            extensions: vec!["shared".to_string()],
        }
    );

    let registry = builder.build().unwrap();
    assert_eq!(extensions(&registry, "text/plain"), ["text", "txt"]);
    assert_eq!(registry.from_extension("shared").unwrap().type_name(), "image/x-first");
}

#[test]
fn test_without_overrides_dataset_order_decides() {
    let registry = RegistryBuilder::new()
        .dataset(SAMPLE_DATASET)
        .clear_overrides()
        .build()
        .unwrap();
    assert_eq!(extensions(&registry, "image/jpeg"), ["jpeg", "jpg", "jpe", "jfif"]);
    assert_eq!(
        registry.from_extension("ent").unwrap().type_name(),
        "application/xml-external-parsed-entity"
    );
}

#[test]
fn test_dataset_reader() {
    let registry = RegistryBuilder::new()
        .dataset_reader(Cursor::new(SAMPLE_DATASET))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(registry.len(), sample().len());
}

#[test]
fn test_dataset_file() {
    let path = std::env::temp_dir().join("mimereg_registry_test.types");
    std::fs::write(&path, SAMPLE_DATASET).unwrap();

    let registry = RegistryBuilder::new().dataset_file(&path).build().unwrap();
    assert!(registry.contains("text/plain"));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_missing_dataset_is_initialization_failure() {
    let path = std::env::temp_dir().join("mimereg_missing_dir").join("mime.types");
    match RegistryBuilder::new().dataset_file(&path).build() {
        Err(MimeError::RegistryInitialization { source, .. }) => assert!(source.is_some()),
        other => panic!("Expected RegistryInitialization, got {:?}", other),
    }
}

#[test]
fn test_empty_dataset_is_initialization_failure() {
    let result = RegistryBuilder::new().dataset("# nothing here\n\n").build();
    assert!(matches!(result, Err(MimeError::RegistryInitialization { .. })));
}
