//! Command-line surface
//!
//! Every subcommand maps onto a screen action of the station client: signing
//! in, showing the role dashboard, or one of the dashboard's actions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use station_client::{EscalationStatus, Role};

#[derive(Debug, Parser)]
#[command(name = "station")]
#[command(about = "Digital Police Station client for citizens, police and government officials")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "station.toml")]
    pub config: PathBuf,

    /// Backend origin (overrides config file)
    #[arg(long, env = "STATION_API_URL")]
    pub api_url: Option<String>,

    /// Session file (overrides config file)
    #[arg(long, env = "STATION_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Answer yes to confirmations
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login(CredentialArgs),

    /// Create an account, then sign in
    Register(CredentialArgs),

    /// Remove the stored session
    Logout,

    /// Show the signed-in identity
    Whoami,

    /// Show the dashboard for the signed-in role
    Dashboard,

    /// FIR operations
    #[command(subcommand)]
    Fir(FirCommands),

    /// Ask the government to review a FIR (citizen)
    Escalate {
        /// FIR to escalate
        fir_id: String,
        /// Why the FIR needs review
        #[arg(short, long)]
        reason: String,
    },

    /// List escalations (government)
    Escalations {
        /// pending, in_review, resolved, rejected or all
        #[arg(short, long, default_value = "all")]
        status: String,
    },

    /// Change an escalation's review status (government)
    EscalationStatus {
        /// Escalation id
        id: i64,
        /// New status
        status: EscalationStatus,
    },

    /// Search FIRs by region (government)
    RegionSearch {
        region: String,
    },
}

#[derive(Debug, Args)]
pub struct CredentialArgs {
    /// citizen, police or government
    #[arg(short, long, default_value = "citizen")]
    pub role: Role,

    #[arg(long, env = "STATION_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Citizen aadhar number
    #[arg(long)]
    pub aadhar: Option<String>,

    /// Officer name (police register)
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub station_id: Option<String>,

    #[arg(long)]
    pub member_id: Option<String>,

    #[arg(long)]
    pub government_member_id: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum FirCommands {
    /// Show a FIR with its progress and culprits
    Show {
        fir_id: String,
    },

    /// File a new FIR (police)
    File(FileArgs),

    /// Add a progress entry to a FIR (police)
    Progress(ProgressArgs),

    /// Close a FIR (police)
    Close {
        fir_id: String,
    },

    /// Search FIRs (police)
    Search {
        query: String,
    },
}

/// Filing wizard fields, in step order
#[derive(Debug, Default, Args)]
pub struct FileArgs {
    #[arg(long)]
    pub fullname: Option<String>,
    #[arg(long)]
    pub age: Option<String>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub contact_number: Option<String>,
    #[arg(long)]
    pub id_proof_type: Option<String>,
    #[arg(long)]
    pub id_proof_value: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub incident_date: Option<String>,
    /// HH:MM
    #[arg(long)]
    pub incident_time: Option<String>,
    #[arg(long)]
    pub offence_type: Option<String>,
    #[arg(long)]
    pub incident_location: Option<String>,

    #[arg(long)]
    pub case_narrative: Option<String>,
}

impl FileArgs {
    /// (wire name, value) pairs for every field that was given.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("fullname", &self.fullname),
            ("age", &self.age),
            ("gender", &self.gender),
            ("address", &self.address),
            ("contact_number", &self.contact_number),
            ("id_proof_type", &self.id_proof_type),
            ("id_proof_value", &self.id_proof_value),
            ("incident_date", &self.incident_date),
            ("incident_time", &self.incident_time),
            ("offence_type", &self.offence_type),
            ("incident_location", &self.incident_location),
            ("case_narrative", &self.case_narrative),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

#[derive(Debug, Args)]
pub struct ProgressArgs {
    pub fir_id: String,

    /// Progress summary
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub evidence: Option<String>,
    #[arg(long)]
    pub photos: Option<String>,
    #[arg(long)]
    pub witness: Option<String>,
    #[arg(long)]
    pub other: Option<String>,

    #[arg(long)]
    pub culprit_name: Option<String>,
    #[arg(long)]
    pub culprit_age: Option<String>,
    #[arg(long)]
    pub culprit_gender: Option<String>,
    #[arg(long)]
    pub culprit_address: Option<String>,
    #[arg(long)]
    pub culprit_marks: Option<String>,
    #[arg(long)]
    pub culprit_custody: Option<String>,
    #[arg(long)]
    pub culprit_details: Option<String>,
    #[arg(long)]
    pub culprit_location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_police_login() {
        let cli = Cli::try_parse_from([
            "station",
            "login",
            "--role",
            "police",
            "--station-id",
            "9",
            "--member-id",
            "77",
            "--password",
            "pw",
        ])
        .unwrap();
        match cli.command {
            Commands::Login(args) => {
                assert_eq!(args.role, Role::Police);
                assert_eq!(args.station_id.as_deref(), Some("9"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_escalation_status() {
        let cli =
            Cli::try_parse_from(["station", "-y", "escalation-status", "3", "in_review"]).unwrap();
        assert!(cli.yes);
        match cli.command {
            Commands::EscalationStatus { id, status } => {
                assert_eq!(id, 3);
                assert_eq!(status, EscalationStatus::InReview);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_file_args_keep_given_fields() {
        let cli = Cli::try_parse_from([
            "station",
            "fir",
            "file",
            "--fullname",
            "Charlie Test",
            "--age",
            "28",
        ])
        .unwrap();
        let Commands::Fir(FirCommands::File(args)) = cli.command else {
            panic!("expected fir file");
        };
        assert_eq!(args.fields(), vec![("fullname", "Charlie Test"), ("age", "28")]);
    }
}
