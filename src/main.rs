mod client;
mod config;
mod dns_bytes;
mod dns_header;
mod dns_label;
mod dns_message;
mod dns_name;
mod dns_question_and_answer;
mod error;
mod logging;
mod transport;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use client::DnsClient;
use config::{Config, DEFAULT_DNS_HOST, DEFAULT_DNS_PORT};

const HELP_TEXT: &str = include_str!("../doc/help.txt");

/// Flags that are also accepted with a single leading dash
const LONG_FLAGS: [&str; 4] = ["dnsport", "dnshost", "authonly", "verbose"];

#[derive(Parser, Debug)]
#[command(name = "dns-lookup", disable_help_subcommand = true)]
struct Args {
    /// DNS server port
    #[arg(long = "dnsport", global = true, default_value_t = DEFAULT_DNS_PORT)]
    dns_port: u16,

    /// DNS server address (e.g., 8.8.8.8)
    #[arg(long = "dnshost", global = true, default_value = DEFAULT_DNS_HOST)]
    dns_host: String,

    /// Ask for authoritative answers only
    #[arg(
        long = "authonly",
        global = true,
        default_value = "false",
        action = clap::ArgAction::Set,
        value_parser = parse_flag_bool
    )]
    auth_only: bool,

    /// Log request and response details to stderr
    #[arg(
        long,
        global = true,
        default_value = "false",
        action = clap::ArgAction::Set,
        value_parser = parse_flag_bool
    )]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up the A records of one or more host names
    Query { hosts: Vec<String> },
    /// Show usage
    Help,
}

fn parse_flag_bool(value: &str) -> Result<bool, String> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("expected true or false, got {:?}", value))
    }
}

/// Rewrite `-dnsport` style flags to `--dnsport`
fn normalize_flags(args: impl IntoIterator<Item = String>) -> Vec<String> {
    args.into_iter()
        .map(|arg| match arg.strip_prefix('-') {
            Some(name) if LONG_FLAGS.contains(&name) => format!("--{}", name),
            _ => arg,
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let raw: Vec<String> = std::env::args().collect();
    if raw.len() <= 1 {
        println!("{}", HELP_TEXT);
        return Ok(());
    }

    let args = Args::parse_from(normalize_flags(raw));

    let config = Config::new(args.dns_port, args.dns_host, args.auth_only, args.verbose)
        .context("Invalid configuration")?;

    logging::init_logging(config.verbose);

    match args.command {
        None => bail!("Missing command. Use the 'help' command for more information"),
        Some(Command::Help) => println!("{}", HELP_TEXT),
        Some(Command::Query { hosts }) => {
            if hosts.is_empty() {
                bail!("Missing host name");
            }

            let server = config.server_addr();
            let mut client = DnsClient::connect(config)
                .with_context(|| format!("Failed to reach DNS server {}", server))?;

            let message = match client.query(&hosts) {
                Ok(message) => message,
                Err(e) if e.is_parse_failure() => {
                    return Err(e).context("Failed to parse the DNS response")
                }
                Err(e) => return Err(e).context("Failed to get a response from the DNS server"),
            };

            println!("{}", message);
        }
    }

    Ok(())
}
