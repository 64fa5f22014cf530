//! The operation catalog.
//!
//! Lists every exposed operation explicitly, in discovery order.

use std::sync::Arc;

use crate::domain::errors::RegistryError;
use crate::domain::models::Config;
use crate::domain::ports::{Operation, ProcessRunner};
use crate::infrastructure::process::TokioProcessRunner;
use crate::services::invocation::{CommandOperation, ExecutionSettings, Invoker, ToolProfile};
use crate::services::registry::OperationRegistry;
use crate::services::tools::{
    AmassProfile, ArjunBulkOperation, ArjunCustomProfile, ArjunProfile, DirsearchProfile,
    FfufProfile, GospiderFilteredProfile, GospiderProfile, HashcatProfile, HttpxProfile,
    IpinfoProfile, NmapProfile, NucleiProfile, SqlmapProfile, SubfinderProfile, TlsxProfile,
    WfuzzProfile, XsstrikeProfile,
};

fn command<P: ToolProfile>(profile: P, invoker: &Arc<Invoker>) -> Arc<dyn Operation> {
    Arc::new(CommandOperation::new(profile, Arc::clone(invoker)))
}

/// Build the registry around an invoker.
pub fn build_registry(invoker: &Arc<Invoker>) -> Result<OperationRegistry, RegistryError> {
    OperationRegistry::from_operations([
        command(NmapProfile, invoker),
        command(FfufProfile, invoker),
        command(WfuzzProfile, invoker),
        command(SqlmapProfile, invoker),
        command(HashcatProfile, invoker),
        command(HttpxProfile, invoker),
        command(SubfinderProfile, invoker),
        command(TlsxProfile, invoker),
        command(XsstrikeProfile, invoker),
        command(IpinfoProfile, invoker),
        command(AmassProfile, invoker),
        command(DirsearchProfile, invoker),
        command(GospiderProfile, invoker),
        command(GospiderFilteredProfile, invoker),
        command(ArjunProfile, invoker),
        Arc::new(ArjunBulkOperation::new(Arc::clone(invoker))) as Arc<dyn Operation>,
        command(ArjunCustomProfile, invoker),
        command(NucleiProfile, invoker),
    ])
}

/// Build the registry with a given process runner.
pub fn registry_with_runner(
    config: &Config,
    runner: Arc<dyn ProcessRunner>,
) -> Result<OperationRegistry, RegistryError> {
    let invoker = Arc::new(Invoker::new(runner, ExecutionSettings::from_config(config)));
    build_registry(&invoker)
}

/// Build the production registry backed by real processes.
pub fn registry_from_config(config: &Config) -> Result<OperationRegistry, RegistryError> {
    let runner = Arc::new(TokioProcessRunner::from_config(&config.execution));
    registry_with_runner(config, runner)
}
