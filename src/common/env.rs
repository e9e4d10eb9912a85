//! Environment file loading and default path resolution
//!
//! `--bin` and `--test_path` fall back to `BIN_PATH` / `TEST_PATH` from the
//! process environment, which an optional local `.env` file may populate, and
//! finally to paths next to the tool's own executable.

use std::path::{Path, PathBuf};

/// Load `KEY=VALUE` pairs from a local env file.
///
/// Missing files are fine, variables already present in the process
/// environment are never overwritten, and malformed lines are skipped.
pub fn load_env_file(path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || std::env::var_os(key).is_some() {
            continue;
        }
        std::env::set_var(key, value.trim().trim_matches('"'));
    }
}

/// Default location of the server binary: next to our own executable.
pub fn default_bin_path() -> PathBuf {
    exe_dir().join("server")
}

/// Default location of the test document: next to our own executable.
pub fn default_test_path() -> PathBuf {
    exe_dir().join("tests.yaml")
}

fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_new_variables_without_clobbering_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "APITEST_ENV_TEST_FRESH=from_file").unwrap();
        writeln!(file, "APITEST_ENV_TEST_TAKEN=from_file").unwrap();
        writeln!(file, "not a pair").unwrap();
        drop(file);

        std::env::set_var("APITEST_ENV_TEST_TAKEN", "from_process");
        load_env_file(&path);

        assert_eq!(
            std::env::var("APITEST_ENV_TEST_FRESH").unwrap(),
            "from_file"
        );
        assert_eq!(
            std::env::var("APITEST_ENV_TEST_TAKEN").unwrap(),
            "from_process"
        );
    }

    #[test]
    fn missing_file_is_a_no_op() {
        load_env_file(Path::new("/definitely/not/here/.env"));
    }

    #[test]
    fn default_paths_are_absolute_siblings() {
        let bin = default_bin_path();
        let tests = default_test_path();
        assert_eq!(bin.parent(), tests.parent());
        assert!(bin.ends_with("server"));
        assert!(tests.ends_with("tests.yaml"));
    }
}
