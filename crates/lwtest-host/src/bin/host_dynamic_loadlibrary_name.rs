//! Loads the fixture library by bare filename, leaving the lookup to the
//! platform's default library search path. Takes no arguments.

use std::process::ExitCode;

use lwtest_host::LoadTarget;
use lwtest_host::config::HostConfig;
use lwtest_host::host::Host;

fn main() -> ExitCode {
    let config = HostConfig::from_env();
    let mut host = Host::from_config("host_dynamic_loadlibrary_name", &config);
    host.execute(&LoadTarget::fixture_name()).into()
}
