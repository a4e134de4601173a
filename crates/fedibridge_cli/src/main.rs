//! Admin entry point for the follower database.
//!
//! # Responsibility
//! - Run schema init, full reset and read-only follower queries from a shell.
//! - Keep output line-oriented for scripting.

use clap::{Parser, Subcommand};
use fedibridge_core::{
    default_log_level, delete_all, init_db, init_logging, open_db, Follower, FollowerRepository,
    FollowingId, SqliteFollowerRepository,
};
use rusqlite::Connection;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(version, about = "Follower database admin tool", long_about = None)]
struct Cli {
    /// Path of the follower SQLite database.
    db_path: PathBuf,

    /// Absolute directory for rolling log files.
    #[arg(long, env = "FEDIBRIDGE_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Create or upgrade the schema.
    Init,
    /// Delete every follower.
    Reset,
    /// Print the number of followers.
    Count,
    /// Print one follower by handle.
    Get { acct: String, host: String },
    /// Print every follower following `following_id`.
    Followers { following_id: FollowingId },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(default_log_level(), log_dir)?;
    }

    let conn = open_db(&cli.db_path)?;
    execute(&conn, &cli.command, &mut io::stdout().lock())
}

fn execute(
    conn: &Connection,
    command: &Command,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let repo = SqliteFollowerRepository::new(conn);

    match command {
        Command::Init => {
            init_db(conn)?;
            writeln!(out, "schema ready")?;
        }
        Command::Reset => {
            let removed = delete_all(conn)?;
            writeln!(out, "removed={removed}")?;
        }
        Command::Count => writeln!(out, "followers={}", repo.get_followers_count()?)?,
        Command::Get { acct, host } => match repo.get_follower(acct, host)? {
            Some(follower) => write_follower(out, &follower)?,
            None => writeln!(out, "not found")?,
        },
        Command::Followers { following_id } => {
            for follower in repo.get_followers(*following_id)? {
                write_follower(out, &follower)?;
            }
        }
    }

    Ok(())
}

fn write_follower(out: &mut impl Write, follower: &Follower) -> io::Result<()> {
    let followings = follower
        .followings
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    writeln!(
        out,
        "id={} handle={}@{} followings=[{}] synced={}",
        follower.id,
        follower.acct,
        follower.host,
        followings,
        follower.followings_sync_status.len()
    )
}

#[cfg(test)]
mod tests {
    use super::{execute, Cli, Command};
    use clap::error::ErrorKind;
    use clap::Parser;
    use fedibridge_core::{open_db, FollowerRepository, SqliteFollowerRepository};
    use rusqlite::Connection;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn output_of(conn: &Connection, command: Command) -> String {
        let mut out = Vec::new();
        execute(conn, &command, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_every_subcommand() {
        let cases = [
            (vec!["init"], Command::Init),
            (vec!["reset"], Command::Reset),
            (vec!["count"], Command::Count),
            (
                vec!["get", "myhandle", "domain.ext"],
                Command::Get {
                    acct: "myhandle".to_string(),
                    host: "domain.ext".to_string(),
                },
            ),
            (vec!["followers", "12"], Command::Followers { following_id: 12 }),
        ];

        for (args, expected) in cases {
            let argv = ["fedibridge_cli", "followers.db"].into_iter().chain(args);
            let cli = Cli::try_parse_from(argv).unwrap();
            assert_eq!(cli.db_path, PathBuf::from("followers.db"));
            assert_eq!(cli.command, expected);
        }
    }

    #[test]
    fn parses_log_dir_flag() {
        let cli = Cli::try_parse_from([
            "fedibridge_cli",
            "--log-dir",
            "/var/log/bridge",
            "followers.db",
            "count",
        ])
        .unwrap();
        assert_eq!(cli.log_dir.as_deref(), Some("/var/log/bridge"));
        assert_eq!(cli.command, Command::Count);
    }

    #[test]
    fn rejects_malformed_arguments() {
        let err = Cli::try_parse_from(["fedibridge_cli", "followers.db", "followers", "abc"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err =
            Cli::try_parse_from(["fedibridge_cli", "followers.db", "get", "myhandle"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Cli::try_parse_from(["fedibridge_cli", "followers.db", "purge"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);

        let err = Cli::try_parse_from(["fedibridge_cli", "followers.db"]).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        ));
    }

    #[test]
    fn dispatch_reads_and_resets_database() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_db(dir.path().join("followers.db")).unwrap();
        let repo = SqliteFollowerRepository::new(&conn);
        let id = repo
            .create_follower(
                "myhandle",
                "domain.ext",
                &[12, 19],
                &BTreeMap::from([(12, 165)]),
            )
            .unwrap();

        assert_eq!(output_of(&conn, Command::Init), "schema ready\n");
        assert_eq!(output_of(&conn, Command::Count), "followers=1\n");
        assert_eq!(
            output_of(
                &conn,
                Command::Get {
                    acct: "myhandle".to_string(),
                    host: "domain.ext".to_string(),
                }
            ),
            format!("id={id} handle=myhandle@domain.ext followings=[12,19] synced=1\n")
        );
        assert_eq!(
            output_of(&conn, Command::Followers { following_id: 19 }),
            format!("id={id} handle=myhandle@domain.ext followings=[12,19] synced=1\n")
        );
        assert_eq!(output_of(&conn, Command::Followers { following_id: 24 }), "");

        assert_eq!(output_of(&conn, Command::Reset), "removed=1\n");
        assert_eq!(output_of(&conn, Command::Count), "followers=0\n");
        assert_eq!(
            output_of(
                &conn,
                Command::Get {
                    acct: "myhandle".to_string(),
                    host: "domain.ext".to_string(),
                }
            ),
            "not found\n"
        );
    }
}
