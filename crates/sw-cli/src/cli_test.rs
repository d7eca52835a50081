use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn migrate_accepts_target_version() {
    let cli = Cli::try_parse_from(["sw", "migrate", "--target", "1.1"]).unwrap();
    match cli.command {
        Commands::Migrate(args) => {
            assert_eq!(args.target, Some(SchemaVersion::new(1, 1, 0)));
            assert_eq!(args.output, OutputFormat::Text);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn migrate_rejects_malformed_target() {
    assert!(Cli::try_parse_from(["sw", "migrate", "--target", "one"]).is_err());
}

#[test]
fn global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["sw", "status", "-p", "/srv/cms", "-v", "-o", "json"]).unwrap();
    assert!(cli.global.verbose);
    assert_eq!(cli.global.project_dir, "/srv/cms");
    assert!(matches!(
        cli.command,
        Commands::Status(StatusArgs {
            output: OutputFormat::Json,
            limit: 20
        })
    ));
}

#[test]
fn unlock_takes_no_arguments() {
    let cli = Cli::try_parse_from(["sw", "unlock"]).unwrap();
    assert!(matches!(cli.command, Commands::Unlock));
    assert!(Cli::try_parse_from(["sw", "unlock", "extra"]).is_err());
}
