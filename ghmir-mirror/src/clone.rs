//! Clone step: hands one entity to `ghorg`.

use std::path::Path;

use ghmir_core::ValidatedEntity;

use crate::command::{CommandRunner, ExternalCommand};

/// `ghorg clone <entity> --clone-type=<type> --token=<token> --backup
/// --include-submodules --path=<backup_root>`, output streamed to the
/// terminal.
pub fn clone_command(program: &str, entity: &ValidatedEntity, backup_root: &Path) -> ExternalCommand {
    ExternalCommand::new(program)
        .args(["clone", entity.name.as_str()])
        .arg(format!("--clone-type={}", entity.entity_type))
        .sensitive_arg("--token=", entity.source_token.clone())
        .args(["--backup", "--include-submodules"])
        .arg(format!("--path={}", backup_root.display()))
        .inherit_output()
}

/// Run the cloning tool. The error string is suitable for a warning log.
pub fn clone_entity(
    runner: &dyn CommandRunner,
    program: &str,
    entity: &ValidatedEntity,
    backup_root: &Path,
) -> Result<(), String> {
    let cmd = clone_command(program, entity, backup_root);
    tracing::info!(entity = %entity.name, command = %cmd, "cloning repositories");
    match runner.run(&cmd) {
        Ok(outcome) if outcome.is_success() => Ok(()),
        Ok(outcome) => Err(format!("{program} exited with {}", outcome.status_label())),
        Err(err) => Err(err.to_string()),
    }
}
