//! `nimbusctl addon` subcommands

use nimbusctl_core::EntityKind;

use crate::cli::AddonCommands;
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::OutputFormat;

use super::resource::ResourceFamily;

const ADDONS: ResourceFamily = ResourceFamily {
    noun: "add-on",
    path: "/addons",
    kind: EntityKind::AddOn,
    collection: "addons",
};

pub async fn handle(
    cmd: AddonCommands,
    conn: &ConnectionManager,
    profile: Option<&str>,
    output: OutputFormat,
    assume_yes: bool,
) -> CliResult<()> {
    match cmd {
        AddonCommands::List => ADDONS.list(conn, profile, output).await,
        AddonCommands::Show { name } => ADDONS.show(conn, profile, &name, output).await,
        AddonCommands::Remove { name, wait } => {
            ADDONS
                .remove(conn, profile, &name, &wait, assume_yes, output)
                .await
        }
    }
}
