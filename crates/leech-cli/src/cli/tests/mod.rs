use super::*;
use leech_core::config::LeechConfig;


fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_config() {
    let cli = parse(&["leech", "config"]);
    assert!(cli.config.is_none());
    assert!(matches!(cli.command, CliCommand::Config));
}

#[test]
fn cli_parse_global_config_path() {
    let cli = parse(&["leech", "crawl", "--config", "/tmp/leech.toml"]);
    assert_eq!(cli.config, Some(PathBuf::from("/tmp/leech.toml")));
    assert!(matches!(cli.command, CliCommand::Crawl(_)));
}

#[test]
fn cli_parse_completions() {
    match parse(&["leech", "completions", "bash"]).command {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["leech", "status"]).is_err());
}

#[test]
fn load_config_from_explicit_path() {
    let dir = std::env::temp_dir().join(format!("leech-cli-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(&path, "[fetch]\nworkers = 3\n").unwrap();
    let cfg = load_config(Some(&path)).unwrap();
    assert_eq!(cfg.fetch.workers, 3);
    assert_eq!(cfg.catalog, LeechConfig::default().catalog);
    let _ = std::fs::remove_dir_all(&dir);
}
