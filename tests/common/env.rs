//! Isolated test environment for driving the nixlayer binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Result of running a nixlayer CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse stdout as a single JSON event.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.stdout.trim())
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout))
    }
}

/// Temp directory holding a state root and an empty XDG config home, so
/// the user's real settings never leak into a test.
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        Self { dir }
    }

    /// The `--root` passed to every command.
    pub fn state(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    pub fn state_path(&self, relative: &str) -> PathBuf {
        self.state().join(relative)
    }

    /// Scratch path outside the state root.
    pub fn scratch(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write_state(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.state_path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read_state(&self, relative: &str) -> String {
        fs::read_to_string(self.state_path(relative)).unwrap()
    }

    /// Target of the `current` symlink, as stored.
    pub fn current_target(&self) -> Option<PathBuf> {
        fs::read_link(self.state_path("current")).ok()
    }

    pub fn backup_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.state_path("backups"))
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .filter(|name| name.ends_with(".tar.gz"))
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(bin());
        cmd.arg("--root")
            .arg(self.state())
            .args(args)
            .current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("NIXLAYER_APPLY", "0")
            .env("USER", "tester")
            .env_remove("NIXLAYER_ROOT")
            .env_remove("NIXLAYER_DEFAULT_ENV")
            .env_remove("NIXLAYER_LOG")
            .env_remove("NIXLAYER_LOG_LEVEL");
        for (key, value) in env_vars {
            cmd.env(key, value);
        }
        run(cmd)
    }
}

pub fn bin() -> &'static Path {
    Path::new(env!("CARGO_BIN_EXE_nixlayer"))
}

fn run(mut cmd: Command) -> TestResult {
    let output = cmd.output().expect("failed to run nixlayer binary");
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}
