// CLI subcommand dispatch.

use clap::Subcommand;

use crate::context::Context;

pub mod export;
pub mod ls;
pub mod new;
pub mod rm;
pub mod show;
pub mod watch;
pub mod whoami;
pub mod write;

#[derive(Subcommand)]
pub enum Command {
    /// List documents, most recently created first
    Ls(ls::LsArgs),
    /// Create an empty document
    New(new::NewArgs),
    /// Show a document with its collaborators and statistics
    Show(show::ShowArgs),
    /// Delete a document permanently
    Rm(rm::RmArgs),
    /// Show or set the local identity
    Whoami(whoami::WhoamiArgs),
    /// Export a document as plain text
    Export(export::ExportArgs),
    /// Append text to a document and commit it
    Write(write::WriteArgs),
    /// Open a document and watch simulated collaborators in real time
    Watch(watch::WatchArgs),
}

pub fn run(cmd: Command, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        Command::Ls(args) => ls::run(args, ctx),
        Command::New(args) => new::run(args, ctx),
        Command::Show(args) => show::run(args, ctx),
        Command::Rm(args) => rm::run(args, ctx),
        Command::Whoami(args) => whoami::run(args, ctx),
        Command::Export(args) => export::run(args, ctx),
        Command::Write(args) => write::run(args, ctx),
        Command::Watch(args) => watch::run(args, ctx),
    }
}
