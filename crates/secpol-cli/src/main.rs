//! `secpol` - security orchestration policy tool

use anyhow::{anyhow, Result};
use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use secpol_document::PolicyType;
use secpol_mutation::Operation;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

fn policy_arg() -> Arg {
    Arg::new("policy")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Policy YAML file")
}

fn project_arg() -> Arg {
    Arg::new("project")
        .long("project")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Project context TOML file")
}

fn policy_type_arg() -> Arg {
    Arg::new("type")
        .long("type")
        .required(true)
        .value_parser(PossibleValuesParser::new(PolicyType::ALL.map(PolicyType::as_str)))
        .help("Policy type")
}

fn cli() -> Command {
    Command::new("secpol")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve, validate and mutate security orchestration policies")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a policy file against the policy schema")
                .arg(policy_arg()),
        )
        .subcommand(
            Command::new("branches")
                .about("Print the branches a policy applies to")
                .arg(policy_arg())
                .arg(project_arg())
                .arg(policy_type_arg())
                .arg(
                    Arg::new("name")
                        .long("name")
                        .required(true)
                        .help("Policy name"),
                ),
        )
        .subcommand(
            Command::new("mutate")
                .about("Append, replace or remove one policy")
                .arg(policy_arg())
                .arg(
                    Arg::new("op")
                        .long("op")
                        .required(true)
                        .value_parser(PossibleValuesParser::new(Operation::ALL.map(Operation::as_str)))
                        .help("Operation"),
                )
                .arg(policy_type_arg())
                .arg(
                    Arg::new("entry")
                        .long("entry")
                        .required_if_eq_any([("op", "append"), ("op", "replace")])
                        .value_parser(value_parser!(PathBuf))
                        .help("Policy entry YAML file; remove accepts --name instead"),
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .help("Explicit policy name; for replace, the policy to rename"),
                )
                .arg(
                    Arg::new("write")
                        .long("write")
                        .action(ArgAction::SetTrue)
                        .help("Write the result back to the policy file"),
                ),
        )
        .subcommand(
            Command::new("approvals")
                .about("Print approval rules projected from scan-result policies")
                .arg(policy_arg())
                .arg(project_arg()),
        )
        .subcommand(
            Command::new("scan-actions")
                .about("Print scan actions a pipeline on a git ref must run")
                .arg(policy_arg())
                .arg(project_arg())
                .arg(
                    Arg::new("ref")
                        .long("ref")
                        .required(true)
                        .help("Git ref, e.g. refs/heads/main"),
                )
                .arg(
                    Arg::new("on-demand")
                        .long("on-demand")
                        .action(ArgAction::SetTrue)
                        .help("Print on-demand DAST actions instead of pipeline scans"),
                ),
        )
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn path(args: &ArgMatches, id: &str) -> Result<PathBuf> {
    args.get_one::<PathBuf>(id)
        .cloned()
        .ok_or_else(|| anyhow!("missing argument: {id}"))
}

fn string<'a>(args: &'a ArgMatches, id: &str) -> Result<&'a str> {
    args.get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing argument: {id}"))
}

fn policy_type(args: &ArgMatches) -> Result<PolicyType> {
    string(args, "type")?.parse().map_err(|e: String| anyhow!(e))
}

fn run(matches: &ArgMatches) -> Result<ExitCode> {
    let mut out = std::io::stdout().lock();

    match matches.subcommand() {
        Some(("validate", args)) => {
            let valid = commands::validate(&path(args, "policy")?, &mut out)?;
            return Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }
        Some(("branches", args)) => commands::branches(
            &path(args, "policy")?,
            &path(args, "project")?,
            policy_type(args)?,
            string(args, "name")?,
            &mut out,
        )?,
        Some(("mutate", args)) => {
            let mutate = commands::MutateArgs {
                policy: path(args, "policy")?,
                operation: string(args, "op")?.parse().map_err(|e: String| anyhow!(e))?,
                policy_type: policy_type(args)?,
                entry: args.get_one::<PathBuf>("entry").cloned(),
                name: args.get_one::<String>("name").cloned(),
                write: args.get_flag("write"),
            };
            commands::mutate(&mutate, &mut out)?;
        }
        Some(("approvals", args)) => {
            commands::approvals(&path(args, "policy")?, &path(args, "project")?, &mut out)?;
        }
        Some(("scan-actions", args)) => commands::scan_actions(
            &path(args, "policy")?,
            &path(args, "project")?,
            string(args, "ref")?,
            args.get_flag("on-demand"),
            &mut out,
        )?,
        Some((other, _)) => return Err(anyhow!("unknown subcommand: {other}")),
        None => return Err(anyhow!("no subcommand given")),
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"), matches.get_flag("log-json"));

    match run(&matches) {
        Ok(code) => code,
        Err(error) => {
            tracing::debug!(?error, "command failed");
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn parses_mutate_invocation() {
        let matches = cli()
            .try_get_matches_from([
                "secpol",
                "mutate",
                "policy.yml",
                "--op",
                "replace",
                "--type",
                "scan_result_policy",
                "--entry",
                "entry.yml",
                "--name",
                "Old name",
                "--write",
                "--verbose",
            ])
            .unwrap();

        assert!(matches.get_flag("verbose"));
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "mutate");
        assert_eq!(policy_type(args).unwrap(), PolicyType::ScanResultPolicy);
        assert_eq!(string(args, "op").unwrap(), "replace");
        assert!(args.get_flag("write"));
    }

    #[test]
    fn remove_accepts_name_without_entry() {
        let matches = cli()
            .try_get_matches_from([
                "secpol",
                "mutate",
                "policy.yml",
                "--op",
                "remove",
                "--type",
                "scan_execution_policy",
                "--name",
                "Nightly secret detection",
            ])
            .unwrap();

        let (_, args) = matches.subcommand().unwrap();
        assert!(args.get_one::<PathBuf>("entry").is_none());
        assert_eq!(string(args, "name").unwrap(), "Nightly secret detection");
    }

    #[test]
    fn append_requires_entry() {
        let result = cli().try_get_matches_from([
            "secpol",
            "mutate",
            "policy.yml",
            "--op",
            "append",
            "--type",
            "scan_execution_policy",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_policy_type() {
        let result = cli().try_get_matches_from([
            "secpol",
            "branches",
            "policy.yml",
            "--project",
            "project.toml",
            "--type",
            "network_policy",
            "--name",
            "x",
        ]);
        assert!(result.is_err());
    }
}
