use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use podmail_access::{is_member, parse_capability_header};
use podmail_credentials::TokenCodec;
use podmail_notify::{Config, Discovery, MailError, Mailer, Message, Service, discovery_plan};
use podmail_query::{Bindings, Plan, Resolution, Resolver, Variable};
use podmail_rdf::{Iri, Term};
use podmail_remote::{Fetch, HttpFetcher};
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "podmail")]
#[command(bin_name = "podmail")]
#[command(about = "Inspect how podmail sees Solid pods", long_about = None)]
pub struct PodmailCli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report whether a person has a verified email address
    Status { web_id: Iri },

    /// Crawl a person's pod and print what was found
    Resolve {
        web_id: Iri,

        /// JSON plan to run instead of the settings discovery plan
        #[arg(short, long)]
        plan: Option<PathBuf>,
    },

    /// Check whether a person belongs to any of the given groups
    Member {
        user: Iri,

        #[arg(required = true)]
        groups: Vec<Iri>,
    },

    /// Parse a WAC-Allow header value
    Capability { header: String },

    /// List the settings documents of a person the service may write to
    Writable { web_id: Iri },
}

impl Command {
    /// Run the command against pods reached over HTTP
    pub async fn run(&self, config: &Config) -> Result<String> {
        let fetcher = HttpFetcher::new(config.fetcher_config())?;
        self.run_with(config, fetcher).await
    }

    /// Run the command against pods reached through `fetcher`
    pub async fn run_with<F>(&self, config: &Config, fetcher: F) -> Result<String>
    where
        F: Fetch,
    {
        debug!(command = ?self, "Running command");

        match self {
            Command::Status { web_id } => {
                status(config, fetcher, config.load_codec()?, web_id).await
            }
            Command::Resolve { web_id, plan } => {
                let plan = match plan {
                    Some(path) => {
                        let json = tokio::fs::read_to_string(path)
                            .await
                            .with_context(|| format!("Could not read plan {}", path.display()))?;
                        Plan::from_json(&json)?
                    }
                    None => discovery_plan(&config.email_discovery_type),
                };
                let seed = Bindings::new().bind(
                    Variable::new(podmail_notify::PERSON)?,
                    Term::Iri(web_id.clone()),
                );
                let resolution = resolver(config, fetcher).resolve(&plan, seed).await;
                Ok(render_resolution(&resolution)?)
            }
            Command::Member { user, groups } => {
                let mut output = String::new();
                let mut any = false;
                for group in groups {
                    let member = is_member(&fetcher, user, group).await;
                    any |= member;
                    writeln!(output, "{group}\t{}", if member { "member" } else { "not a member" })?;
                }
                write!(output, "{}", if any { "allowed" } else { "denied" })?;
                Ok(output)
            }
            Command::Capability { header } => {
                let permissions = parse_capability_header(header)?;
                let list = |modes: &[podmail_access::Permission]| {
                    modes
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(" ")
                };
                Ok(format!(
                    "user\t{}\npublic\t{}\nwritable\t{}",
                    list(&permissions.user),
                    list(&permissions.public),
                    permissions.user_can_write()
                ))
            }
            Command::Writable { web_id } => {
                let discovery = discovery(config, resolver(config, fetcher));
                let writable = discovery.find_writable_settings(web_id).await;
                Ok(writable
                    .iter()
                    .map(Iri::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
    }
}

/// Command line runs never send mail
struct NoMail;

#[async_trait]
impl Mailer for NoMail {
    async fn send(&self, message: Message) -> Result<(), MailError> {
        Err(MailError {
            recipient: message.to.address,
            reason: "the command line does not send mail".to_string(),
        })
    }
}

async fn status<F: Fetch>(
    config: &Config,
    fetcher: F,
    codec: TokenCodec,
    web_id: &Iri,
) -> Result<String> {
    let service = Service::new(config.clone(), fetcher, codec, NoMail);
    let status = service.status(web_id).await?;
    Ok(serde_json::to_string_pretty(&status)?)
}

fn resolver<F: Fetch>(config: &Config, fetcher: F) -> Resolver<F> {
    Resolver::new(fetcher).with_config(config.resolver_config())
}

fn discovery<F: Fetch>(config: &Config, resolver: Resolver<F>) -> Discovery<F> {
    Discovery::new(
        resolver,
        &config.email_discovery_type,
        config.verification_token_predicate.clone(),
    )
}

fn render_resolution(resolution: &Resolution) -> Result<String, std::fmt::Error> {
    let mut output = String::new();
    writeln!(
        output,
        "status\t{:?}\npasses\t{}\nquads\t{}",
        resolution.status,
        resolution.passes,
        resolution.store.len()
    )?;
    for (document, outcome) in &resolution.outcomes {
        match outcome {
            podmail_query::Outcome::Loaded { triples } => {
                writeln!(output, "loaded\t{document}\t{triples} triples")?
            }
            podmail_query::Outcome::Failed { error } => {
                writeln!(output, "failed\t{document}\t{error}")?
            }
        }
    }
    for (variable, values) in resolution.bindings.iter() {
        for value in values {
            writeln!(output, "{variable}\t{value}")?;
        }
    }
    Ok(output.trim_end().to_string())
}
