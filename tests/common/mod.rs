#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use met_etl::schema::Schema;
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Builds a full MetObjects export where each row only sets the named columns;
/// every other column is left empty.
pub fn met_export(rows: &[&[(&str, &str)]]) -> String {
    let schema = Schema::met_objects();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(schema.headers()).expect("header");
    for fields in rows {
        let mut row = vec![String::new(); schema.columns.len()];
        for (name, value) in fields.iter() {
            let idx = schema
                .column_index(name)
                .unwrap_or_else(|| panic!("unknown column {name}"));
            row[idx] = value.to_string();
        }
        writer.write_record(&row).expect("row");
    }
    String::from_utf8(writer.into_inner().expect("flush")).expect("utf8")
}

/// A small export covering series titles, multi-country fields, missing
/// identifiers and a mix of dimension formats.
pub fn sample_export() -> String {
    met_export(&[
        &[
            ("Object ID", "1"),
            ("Title", "Vase A"),
            ("Country", "Egypt"),
            ("Artist Display Name", "Unknown"),
            ("Dimensions", "H. 4 in. (10.0 x 8.5 cm)"),
        ],
        &[
            ("Object ID", "2"),
            ("Title", "Vase A"),
            ("Constituent ID", "7"),
            ("Country", "Egypt"),
            ("Dimensions", "irregular shape"),
        ],
        &[
            ("Object ID", "3"),
            ("Title", "Vase A"),
            ("Country", "Egypt"),
            ("Dimensions", "20.0 x 11.5 x 3.25 cm"),
        ],
        &[
            ("Object ID", "4"),
            ("Title", "Panel"),
            ("Constituent ID", "12"),
            ("Country", "France or Italy"),
            ("Artist Display Name", "Workshop"),
            ("Dimensions", "45.72 x 30.48 cm"),
        ],
        &[
            ("Object ID", "5"),
            ("Title", "Panel"),
            ("Constituent ID", "13"),
            ("Country", "France or Italy"),
            ("Artist Display Name", "Workshop"),
        ],
        &[
            ("Object ID", "6"),
            ("Title", "Bowl"),
            ("Country", "USA|Canada|Mexico"),
            ("Is Highlight", "maybe"),
        ],
        &[("Object ID", "7"), ("Title", "Bowl")],
    ])
}
