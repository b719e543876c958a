//! Build every fixture and lay it out in one directory.
//!
//! Layout of a staged directory (platform filenames):
//!
//! ```text
//! host_dynamic_loadlibrary_fullpath[.exe]
//! host_dynamic_loadlibrary_name[.exe]
//! lwtest_a      variant 1, the name the hosts look for
//! lwtest_a_v1   variant 1
//! lwtest_a_v2   variant 2
//! lwtest_b
//! artifact_index.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use lwtest_core::{
    HOST_FULLPATH_STEM, HOST_NAME_STEM, LWTEST_A_STEM, LWTEST_B_STEM, executable_filename,
    library_filename, variant_stem,
};

use crate::artifacts::{ArtifactIndex, ArtifactKind};
use crate::cargo::CargoInvocation;
use crate::error::HarnessError;

/// Variants staged for `lwtest_a`. The first one is also staged under the
/// plain name.
pub const STAGED_VARIANTS: [i64; 2] = [1, 2];

#[derive(Debug, Clone)]
pub struct StageOptions {
    pub workspace_root: PathBuf,
    pub target_dir: PathBuf,
    pub out_dir: PathBuf,
    pub release: bool,
    pub run_id: String,
}

impl StageOptions {
    /// `<target>/debug` or `<target>/release`.
    #[must_use]
    pub fn profile_dir(&self) -> PathBuf {
        self.target_dir.join(self.profile())
    }

    #[must_use]
    pub fn profile(&self) -> &'static str {
        if self.release { "release" } else { "debug" }
    }

    fn cargo(&self, subcommand: &str) -> CargoInvocation {
        CargoInvocation::new(&self.workspace_root, subcommand)
            .release(self.release)
            .env("CARGO_TARGET_DIR", self.target_dir.as_os_str())
    }
}

/// Build and stage all fixtures, returning the index written next to them.
pub fn stage(opts: &StageOptions) -> Result<ArtifactIndex, HarnessError> {
    fs::create_dir_all(&opts.out_dir).map_err(|e| {
        HarnessError::io(format!("failed to create {}", opts.out_dir.display()), e)
    })?;
    let profile_dir = opts.profile_dir();
    let mut index = ArtifactIndex::new(&opts.run_id, opts.profile());

    opts.cargo("build").args(["-p", "lwtest-b"]).run()?;
    opts.cargo("build").args(["-p", "lwtest-host", "--bins"]).run()?;

    for variant in STAGED_VARIANTS {
        opts.cargo("build")
            .args(["-p", "lwtest-a"])
            .env("LWTEST_VARIANT", variant.to_string())
            .run()?;
        let built = profile_dir.join(library_filename(LWTEST_A_STEM));
        let staged = copy_into(&built, &opts.out_dir, &library_filename(&variant_stem(variant)))?;
        index.add_file(&staged, ArtifactKind::Library, Some(variant))?;
        if variant == STAGED_VARIANTS[0] {
            let plain = copy_into(&built, &opts.out_dir, &library_filename(LWTEST_A_STEM))?;
            index.add_file(&plain, ArtifactKind::Library, Some(variant))?;
        }
    }

    let b = library_filename(LWTEST_B_STEM);
    let staged = copy_into(&profile_dir.join(&b), &opts.out_dir, &b)?;
    index.add_file(&staged, ArtifactKind::Library, None)?;

    for stem in [HOST_FULLPATH_STEM, HOST_NAME_STEM] {
        let exe = executable_filename(stem);
        let staged = copy_into(&profile_dir.join(&exe), &opts.out_dir, &exe)?;
        index.add_file(&staged, ArtifactKind::Host, None)?;
    }

    index.write_to(&opts.out_dir)?;
    Ok(index)
}

fn copy_into(source: &Path, dir: &Path, name: &str) -> Result<PathBuf, HarnessError> {
    if !source.is_file() {
        return Err(HarnessError::MissingArtifact(source.to_path_buf()));
    }
    let destination = dir.join(name);
    fs::copy(source, &destination).map_err(|e| {
        HarnessError::io(
            format!(
                "failed to copy {} -> {}",
                source.display(),
                destination.display()
            ),
            e,
        )
    })?;
    Ok(destination)
}
