//! Loads the fixture library from the path given as the first argument.
//!
//! Whatever that argument is gets handed to the loader as-is; only a missing
//! argument is a usage error. Further arguments are ignored.

use std::process::ExitCode;

use lwtest_host::LoadTarget;
use lwtest_host::config::HostConfig;
use lwtest_host::host::Host;

fn main() -> ExitCode {
    let config = HostConfig::from_env();
    let mut host = Host::from_config("host_dynamic_loadlibrary_fullpath", &config);

    match LoadTarget::from_args(std::env::args_os().skip(1)) {
        Ok(target) => host.execute(&target).into(),
        Err(err) => host.fail(&err).into(),
    }
}
