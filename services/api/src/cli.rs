use crate::demo::{run_policy_match, run_policy_parse, PolicyMatchArgs, PolicyParseArgs};
use crate::server;
use agency_portal::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "agency-portal-api",
    about = "Serve the insurance agency portal backend and inspect compiled policy labels",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Parse compiled policy labels offline
    Policies {
        #[command(subcommand)]
        command: PolicyCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PolicyCommand {
    /// Print every policy record found in a compiled label text
    Parse(PolicyParseArgs),
    /// Print the validation verdict for one plate
    Match(PolicyMatchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Policies {
            command: PolicyCommand::Parse(args),
        } => run_policy_parse(args),
        Command::Policies {
            command: PolicyCommand::Match(args),
        } => run_policy_match(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["agency-portal-api"]).expect("parses");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["agency-portal-api", "serve", "--port", "8080"])
            .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => assert_eq!(args.port, Some(8080)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn policy_match_requires_a_plate() {
        let result =
            Cli::try_parse_from(["agency-portal-api", "policies", "match", "--text", "x"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "agency-portal-api",
            "policies",
            "match",
            "--text",
            "x",
            "--plate",
            "AB123CD",
        ])
        .expect("parses");
        assert!(matches!(
            cli.command,
            Some(Command::Policies {
                command: PolicyCommand::Match(_)
            })
        ));
    }
}
