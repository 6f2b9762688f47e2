// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::FileOptions;

/// Build a package archive at `dir/file_name` from (entry name, content) pairs.
pub fn write_package(dir: &Path, file_name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(file_name);
    let file = File::create(&path).unwrap();
    let mut writer = ZipWriter::new(file);
    for (name, content) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
    path
}

/// Model document whose reference metadata points at the given build outputs.
pub fn model_with_metadata_paths(file_path: &str, symbols_path: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<DataSchemaModel FileFormatVersion="1.2" SchemaVersion="3.1">
  <Header>
    <CustomData Category="Reference" Type="SqlSchema">
      <Metadata Name="FileName" Value="{}" />
      <Metadata Name="LogicalName" Value="App.Database.dacpac" />
    </CustomData>
    <CustomData Category="Reference" Type="Assembly">
      <Metadata Name="AssemblySymbolsName" Value="{}" />
    </CustomData>
  </Header>
  <Model>
    <Element Type="SqlTable" Name="[dbo].[Orders]">
      <Property Name="IsAnsiNullsOn" Value="True" />
    </Element>
  </Model>
</DataSchemaModel>
"#,
        file_path, symbols_path
    )
}

/// Create an empty database file for use as a deployment target.
///
/// Returns (TempDir, db_path) - keep the TempDir alive to prevent cleanup.
pub fn setup_target_db() -> (TempDir, String) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir
        .path()
        .join("target.db")
        .to_str()
        .unwrap()
        .to_string();
    File::create(&db_path).unwrap();
    (temp_dir, db_path)
}
