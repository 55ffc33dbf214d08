//! `nimbusctl disk` subcommands

use nimbusctl_core::EntityKind;

use crate::cli::DiskCommands;
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::OutputFormat;

use super::resource::ResourceFamily;

const DISKS: ResourceFamily = ResourceFamily {
    noun: "disk",
    path: "/disks",
    kind: EntityKind::DataDisk,
    collection: "disks",
};

pub async fn handle(
    cmd: DiskCommands,
    conn: &ConnectionManager,
    profile: Option<&str>,
    output: OutputFormat,
    assume_yes: bool,
) -> CliResult<()> {
    match cmd {
        DiskCommands::List => DISKS.list(conn, profile, output).await,
        DiskCommands::Show { name } => DISKS.show(conn, profile, &name, output).await,
        DiskCommands::Remove { name, wait } => {
            DISKS
                .remove(conn, profile, &name, &wait, assume_yes, output)
                .await
        }
    }
}
