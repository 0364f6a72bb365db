use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Build a deflated ZIP at `dir/name`.
pub fn create_zip(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    fs::create_dir_all(dir).expect("create zip dir");
    let path = dir.join(name);
    let file = fs::File::create(&path).expect("create zip file");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (entry, content) in files {
        writer.start_file(entry.to_string(), options).expect("start entry");
        writer.write_all(content).expect("write entry");
    }
    writer.finish().expect("finish zip");
    path
}

/// Write a config file into `dir` and return its path.
pub fn write_config(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("config.json");
    fs::write(&path, json).expect("write config");
    path
}

pub fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
