use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tfstate-bootstrap")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Create the S3 bucket and DynamoDB lock table backing a customer's Terraform state",
    long_about = None
)]
pub struct Cli {
    /// Customer name; the bucket is named <CUSTOMER>-terraform-state
    #[arg(required_unless_present = "completions")]
    pub customer: Option<String>,

    /// AWS region for the bucket and the lock table [default: eu-central-1]
    #[arg(short, long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// AWS profile from the shared config files
    #[arg(short, long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Custom AWS endpoint (e.g. http://localhost:4566 for LocalStack)
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Lock table name [default: terraform-state-lock, shared by all customers]
    #[arg(long)]
    pub table_name: Option<String>,

    /// Config file [default: ~/.config/tfstate-bootstrap/config.toml]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show what would be created without calling AWS
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with status 0 even if a step failed
    #[arg(long)]
    pub best_effort: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn test_cli_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_customer_is_required() {
        let err = Cli::try_parse_from(["tfstate-bootstrap"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.to_string().contains("Usage"));
    }

    #[test]
    fn test_parse_customer_and_flags() {
        let cli = Cli::try_parse_from([
            "tfstate-bootstrap",
            "acme",
            "--region",
            "us-east-1",
            "--table-name",
            "acme-lock",
            "-n",
            "--json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.customer.as_deref(), Some("acme"));
        assert_eq!(cli.region.as_deref(), Some("us-east-1"));
        assert_eq!(cli.table_name.as_deref(), Some("acme-lock"));
        assert!(cli.dry_run);
        assert!(cli.json);
        assert!(!cli.best_effort);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_completions_without_customer() {
        let cli = Cli::try_parse_from(["tfstate-bootstrap", "--completions", "bash"]).unwrap();
        assert!(cli.customer.is_none());
        assert_eq!(cli.completions, Some(Shell::Bash));
    }
}
