//! Integration tests for the project folder layout

use dataudit::utils::ProjectPaths;
use tempfile::TempDir;

#[test]
fn test_create_folder_structure() {
    let temp_dir = TempDir::new().unwrap();
    let paths = ProjectPaths::new(temp_dir.path(), "i01");
    paths.create_folder_structure().unwrap();

    assert!(paths.data_original_dir().is_dir());
    assert!(paths.data_prepared_dir().is_dir());
    assert!(paths.scripts_dir().is_dir());
    assert!(paths.outputs_dir().is_dir());

    // Idempotent
    paths.create_folder_structure().unwrap();
}

#[test]
fn test_iteration_dir_under_outputs() {
    let temp_dir = TempDir::new().unwrap();
    let paths = ProjectPaths::new(temp_dir.path(), "i03");

    let dir = paths.iteration_dir(None).unwrap();
    assert_eq!(dir, temp_dir.path().join("02_Outputs").join("i03"));
    assert!(dir.is_dir());
    assert_eq!(paths.iteration(), "i03");
}
