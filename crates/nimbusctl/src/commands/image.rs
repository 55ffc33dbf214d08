//! `nimbusctl image` subcommands

use nimbusctl_core::EntityKind;

use crate::cli::ImageCommands;
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::OutputFormat;

use super::resource::ResourceFamily;

const IMAGES: ResourceFamily = ResourceFamily {
    noun: "image",
    path: "/images",
    kind: EntityKind::OsImage,
    collection: "images",
};

pub async fn handle(
    cmd: ImageCommands,
    conn: &ConnectionManager,
    profile: Option<&str>,
    output: OutputFormat,
    assume_yes: bool,
) -> CliResult<()> {
    match cmd {
        ImageCommands::List => IMAGES.list(conn, profile, output).await,
        ImageCommands::Show { name } => IMAGES.show(conn, profile, &name, output).await,
        ImageCommands::Remove { name, wait } => {
            IMAGES
                .remove(conn, profile, &name, &wait, assume_yes, output)
                .await
        }
    }
}
