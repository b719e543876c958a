//! Fixture plumbing shared by the host integration tests.
//!
//! Fixtures come from a staged root (`LWTEST_FIXTURE_BIN_ROOT`, written by
//! `harness stage`) when one is set, otherwise from this cargo build's target
//! directory. Only a staged root carries the variant-2 library.

#![allow(dead_code)]

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use lwtest_core::{
    HOST_FULLPATH_STEM, HOST_NAME_STEM, LWTEST_A_STEM, LWTEST_B_STEM, executable_filename,
    library_filename,
};

pub const FIXTURE_BIN_ROOT_ENV: &str = "LWTEST_FIXTURE_BIN_ROOT";
pub const TEST_ROOT_ENV: &str = "LWTEST_TEST_ROOT";
pub const KEEP_ARTIFACTS_ENV: &str = "LWTEST_KEEP_TEST_ARTIFACTS";

/// Loader search-path variables cargo sets for test processes. Left in
/// place they would let a host find libraries the case did not lay out.
const LOADER_PATH_VARS: &[&str] = &[
    "LD_LIBRARY_PATH",
    "DYLD_LIBRARY_PATH",
    "DYLD_FALLBACK_LIBRARY_PATH",
];

static NEXT_CASE_ID: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// Fixture sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Fixtures {
    bin_dir: PathBuf,
    lib_dirs: Vec<PathBuf>,
    staged: bool,
}

impl Fixtures {
    pub fn locate() -> Self {
        if let Some(root) = std::env::var_os(FIXTURE_BIN_ROOT_ENV).filter(|v| !v.is_empty()) {
            let root = PathBuf::from(root);
            return Self {
                bin_dir: root.clone(),
                lib_dirs: vec![root],
                staged: true,
            };
        }
        // Dependency cdylibs stay in <profile>/deps; binaries are copied up
        // to <profile>.
        let bin_dir = Path::new(env!("CARGO_BIN_EXE_host_dynamic_loadlibrary_fullpath"))
            .parent()
            .expect("host binary has a parent directory")
            .to_path_buf();
        Self {
            lib_dirs: vec![bin_dir.join("deps"), bin_dir.clone()],
            bin_dir,
            staged: false,
        }
    }

    pub fn staged(&self) -> bool {
        self.staged
    }

    pub fn host(&self, stem: &str) -> PathBuf {
        if self.staged {
            return self.bin_dir.join(executable_filename(stem));
        }
        match stem {
            HOST_FULLPATH_STEM => PathBuf::from(env!("CARGO_BIN_EXE_host_dynamic_loadlibrary_fullpath")),
            HOST_NAME_STEM => PathBuf::from(env!("CARGO_BIN_EXE_host_dynamic_loadlibrary_name")),
            other => panic!("unknown host fixture {other}"),
        }
    }

    /// Path of a built library, if this fixture source has it.
    pub fn library(&self, stem: &str) -> Option<PathBuf> {
        let name = library_filename(stem);
        self.lib_dirs
            .iter()
            .map(|dir| dir.join(&name))
            .find(|path| path.is_file())
    }

    pub fn require_library(&self, stem: &str) -> PathBuf {
        self.library(stem).unwrap_or_else(|| {
            panic!(
                "fixture library {} not found in {:?}",
                library_filename(stem),
                self.lib_dirs
            )
        })
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Id the plain `lwtest_a` fixture returns. A staged root always holds
    /// the variant-1 build under that name; the target directory holds
    /// whatever `LWTEST_VARIANT` this build saw.
    pub fn default_fixture_id(&self) -> i32 {
        if self.staged {
            return lwtest_core::LWTEST_A_V1_ID;
        }
        let variant = option_env!("LWTEST_VARIANT")
            .and_then(|raw| lwtest_core::parse_variant(raw).ok())
            .unwrap_or(lwtest_core::DEFAULT_VARIANT);
        lwtest_core::fixture_id_for_variant(variant)
    }
}

pub fn fixture_line(id: i32) -> String {
    format!("HOST: {}={id}", lwtest_core::FIXTURE_ID_SYMBOL)
}

// ---------------------------------------------------------------------------
// Per-case scratch directory
// ---------------------------------------------------------------------------

pub struct TestCase {
    root: PathBuf,
    fixtures: Fixtures,
    keep_artifacts: bool,
}

impl TestCase {
    pub fn new(case_name: &str) -> Self {
        let base = std::env::var_os(TEST_ROOT_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("lwtest-tests"));
        let id = NEXT_CASE_ID.fetch_add(1, Ordering::Relaxed);
        let root = base
            .join("cases")
            .join(format!("{case_name}-{}-{id}", std::process::id()));
        if root.exists() {
            fs::remove_dir_all(&root).expect("stale case directory should be removable");
        }
        fs::create_dir_all(&root).expect("case directory should be creatable");
        Self {
            root,
            fixtures: Fixtures::locate(),
            keep_artifacts: std::env::var_os(KEEP_ARTIFACTS_ENV).is_some(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.root.join(relative);
        fs::create_dir_all(&path).expect("case subdirectory should be creatable");
        path
    }

    /// Copy `source` to `<case>/<dir>/<name>`.
    pub fn copy_as(&self, source: &Path, dir: &str, name: &str) -> PathBuf {
        let destination = self.mkdir(dir).join(name);
        fs::copy(source, &destination).unwrap_or_else(|e| {
            panic!(
                "failed to copy fixture {} -> {}: {e}",
                source.display(),
                destination.display()
            )
        });
        destination
    }

    /// Copy a host executable into `dir` under its platform filename.
    pub fn copy_host(&self, stem: &str, dir: &str) -> PathBuf {
        let source = self.fixtures.host(stem);
        self.copy_as(&source, dir, &executable_filename(stem))
    }

    /// Copy library `stem` into `dir` under the platform filename of `as_stem`.
    pub fn copy_library(&self, stem: &str, dir: &str, as_stem: &str) -> PathBuf {
        let source = self.fixtures.require_library(stem);
        self.copy_as(&source, dir, &library_filename(as_stem))
    }

    /// Lay out `lwtest_a` (from `a_stem`) next to `lwtest_b` in `dir`.
    pub fn install_fixture_pair(&self, a_stem: &str, dir: &str) -> PathBuf {
        self.copy_library(LWTEST_B_STEM, dir, LWTEST_B_STEM);
        self.copy_library(a_stem, dir, LWTEST_A_STEM)
    }
}

impl Drop for TestCase {
    fn drop(&mut self) {
        if self.keep_artifacts {
            return;
        }
        let _ = fs::remove_dir_all(&self.root);
    }
}

// ---------------------------------------------------------------------------
// Running hosts
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct RunResult {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunResult {
    pub fn has_line(&self, expected: &str) -> bool {
        self.stdout.lines().any(|line| line.trim_end() == expected)
    }

    pub fn has_line_starting(&self, prefix: &str) -> bool {
        self.stdout.lines().any(|line| line.starts_with(prefix))
    }
}

/// Run a host with a loader search path stripped down to system defaults.
pub fn run_host<I, S>(exe: &Path, args: I, cwd: &Path, env: &[(&str, &OsStr)]) -> RunResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(exe);
    command.args(args).current_dir(cwd).env_remove("LWTEST_LOG");
    for var in LOADER_PATH_VARS {
        command.env_remove(var);
    }
    if cfg!(windows) {
        let system_root = std::env::var_os("SystemRoot").unwrap_or_else(|| "C:\\Windows".into());
        command.env("PATH", Path::new(&system_root).join("System32"));
    }
    for (key, value) in env {
        command.env(key, value);
    }

    let output = command
        .output()
        .unwrap_or_else(|e| panic!("failed to spawn {}: {e}", exe.display()));
    RunResult {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

pub fn assert_exit_code(result: &RunResult, expected: i32) {
    assert_eq!(
        result.code,
        Some(expected),
        "unexpected exit code\nstdout:\n{}\nstderr:\n{}",
        result.stdout,
        result.stderr
    );
}
