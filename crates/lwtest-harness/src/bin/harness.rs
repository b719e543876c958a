//! CLI entrypoint for the lwtest fixture harness.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use lwtest_harness::cargo::CargoInvocation;
use lwtest_harness::{StageOptions, stage};

/// Staging and test tooling for the lwtest dynamic-loading fixtures.
#[derive(Debug, Parser)]
#[command(name = "harness")]
#[command(about = "Build, stage and test the lwtest fixtures")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build both lwtest_a variants, lwtest_b and the hosts into one directory.
    Stage {
        /// Output directory (default: target/lwtest-tests/fixtures/bin).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Build with the release profile.
        #[arg(long)]
        release: bool,
    },
    /// Stage the fixtures, then run the workspace tests against them.
    Test {
        /// Build with the release profile.
        #[arg(long)]
        release: bool,
        /// Keep per-case test directories after the run.
        #[arg(long)]
        keep_artifacts: bool,
    },
}

fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

fn target_dir(root: &Path) -> PathBuf {
    std::env::var_os("CARGO_TARGET_DIR")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| root.join("target"))
}

fn tests_root(target: &Path) -> PathBuf {
    target.join("lwtest-tests")
}

fn stage_options(out: Option<PathBuf>, release: bool) -> StageOptions {
    let root = workspace_root();
    let target = target_dir(&root);
    let out_dir = out.unwrap_or_else(|| tests_root(&target).join("fixtures").join("bin"));
    StageOptions {
        workspace_root: root,
        target_dir: target,
        out_dir,
        release,
        run_id: format!("stage-{}", std::process::id()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Stage { out, release } => {
            let opts = stage_options(out, release);
            let index = stage(&opts)?;
            eprintln!(
                "harness: staged {} artifacts into {}",
                index.artifacts.len(),
                opts.out_dir.display()
            );
        }
        Command::Test {
            release,
            keep_artifacts,
        } => {
            let opts = stage_options(None, release);
            stage(&opts)?;

            let mut cargo = CargoInvocation::new(&opts.workspace_root, "test")
                .arg("--workspace")
                .release(release)
                .env("CARGO_TARGET_DIR", opts.target_dir.as_os_str())
                .env("LWTEST_FIXTURE_BIN_ROOT", opts.out_dir.as_os_str())
                .env("LWTEST_TEST_ROOT", tests_root(&opts.target_dir).as_os_str());
            if std::env::var_os("RUST_TEST_THREADS").is_none() {
                cargo = cargo.env("RUST_TEST_THREADS", "1");
            }
            if keep_artifacts {
                cargo = cargo.env("LWTEST_KEEP_TEST_ARTIFACTS", "1");
            }
            cargo.run()?;
        }
    }

    Ok(())
}
