//! Catalog service tests against an in-memory filesystem

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rstest::{fixture, rstest};

use facettree::application::services::CatalogService;
use facettree::application::ApplicationError;
use facettree::domain::{BuildOptions, DomainError};
use facettree::infrastructure::traits::FileSystem;

#[derive(Debug, Default)]
struct MockFileSystem {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MockFileSystem {
    fn with_file(path: &str, content: &str) -> Self {
        let fs = Self::default();
        fs.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), content.to_string());
        fs
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "not found"))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.exists(path)
    }
}

const SINGLE_ROOT: &str = r#"{
    "identifier": "root",
    "name": "Root",
    "items": [0],
    "children": [
        { "identifier": "a", "name": "A", "items": [1, 2] },
        { "identifier": "b", "name": "B", "items": [3] }
    ]
}"#;

#[fixture]
fn service() -> CatalogService {
    let fs = MockFileSystem::with_file("/data/cat.json", SINGLE_ROOT);
    CatalogService::new(Arc::new(fs), BuildOptions::default())
}

#[rstest]
fn given_single_root_object_when_opening_then_builds_one_root(service: CatalogService) {
    // Act
    let catalog = service.open(Path::new("/data/cat.json")).unwrap();

    // Assert
    assert_eq!(catalog.facets.root_identifiers(), vec!["root"]);
    assert_eq!(catalog.display.roots().len(), 1);
    let root = catalog.display.get(catalog.display.roots()[0]).unwrap();
    assert_eq!(root.leaf_count(), Some(2));
}

#[rstest]
fn given_missing_file_when_opening_then_payload_not_found(service: CatalogService) {
    let err = service.open(Path::new("/data/missing.json")).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::PayloadNotFound(p) if p == Path::new("/data/missing.json")
    ));
}

#[rstest]
#[case("not json")]
#[case(r#"{"identifier": "x"}"#)]
#[case(r#"[{"name": "no identifier"}]"#)]
fn given_malformed_payload_when_parsing_then_payload_error(#[case] content: &str) {
    let err = CatalogService::parse_payload(content, Path::new("bad.json")).unwrap_err();

    assert!(matches!(err, ApplicationError::Payload { .. }), "got {err:?}");
}

#[test]
fn given_blank_name_in_payload_when_opening_then_domain_error() {
    // Arrange
    let fs = MockFileSystem::with_file("/p.json", r#"[{"identifier": "x", "name": " "}]"#);
    let service = CatalogService::new(Arc::new(fs), BuildOptions::default());

    // Act
    let err = service.open(Path::new("/p.json")).unwrap_err();

    // Assert
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::BlankName { .. })
    ));
}

#[rstest]
fn given_unknown_category_when_flattening_then_errors(service: CatalogService) {
    let catalog = service.open(Path::new("/data/cat.json")).unwrap();

    let err = service
        .flat_items(&catalog, &["nope".to_string()])
        .unwrap_err();

    assert!(matches!(err, ApplicationError::UnknownCategory(id) if id == "nope"));
}

#[rstest]
fn given_unknown_category_when_selecting_then_errors_without_selection(service: CatalogService) {
    let mut catalog = service.open(Path::new("/data/cat.json")).unwrap();

    let err = service
        .select(&mut catalog, &["nope".to_string()])
        .unwrap_err();

    assert!(matches!(err, ApplicationError::UnknownCategory(_)));
    assert_eq!(CatalogService::report(&catalog).selected_count, 0);
}

#[rstest]
fn given_known_categories_when_flattening_then_includes_own_data_first(service: CatalogService) {
    let catalog = service.open(Path::new("/data/cat.json")).unwrap();

    let all = service.flat_items(&catalog, &[]).unwrap();
    let a = service.flat_items(&catalog, &["a".to_string()]).unwrap();

    let all: Vec<i64> = all.iter().filter_map(|v| v.as_i64()).collect();
    let a: Vec<i64> = a.iter().filter_map(|v| v.as_i64()).collect();
    assert_eq!(all, vec![0, 1, 2, 3]);
    assert_eq!(a, vec![1, 2]);
}
