//! `changedesk` -- command-line front end for the change-request desk.
//!
//! Lists requests and project activity through the pagination window,
//! prints a project's conversation thread, and lets a Department Head
//! answer the latest open turn.
//!
//! # Usage
//!
//! ```text
//! changedesk requests [all|pending|inprogress|completed] [page] [search...]
//! changedesk stats
//! changedesk activity [page] [search...]
//! changedesk thread <project_id>
//! changedesk respond <project_id> <accepted|rejected> <remarks...>
//! ```
//!
//! # Environment variables
//!
//! | Variable                | Required | Default | Description                    |
//! |-------------------------|----------|---------|--------------------------------|
//! | `CHANGEDESK_API_URL`    | yes      | --      | API base URL                   |
//! | `CHANGEDESK_API_TOKEN`  | yes      | --      | Bearer token                   |
//! | `CHANGEDESK_ACTOR_ID`   | yes      | --      | Authenticated user id          |
//! | `CHANGEDESK_ACTOR_ROLE` | yes      | --      | submitter/assigner/depthead/resolver |
//! | `REQUEST_TIMEOUT_SECS`  | no       | `120`   | Per-call timeout               |
//! | `RETRY_MAX_ATTEMPTS`    | no       | `3`     | Attempts for reads             |
//! | `PER_PAGE`              | no       | `15`    | Rows per page                  |

mod render;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use changedesk_client::{ClientConfig, HttpSession};
use changedesk_core::conversation::{TurnDecision, TurnResponse};
use changedesk_core::search::{RequestQuery, StatusFilter};
use changedesk_core::types::DbId;
use changedesk_core::workflow::Workflow;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "changedesk_cli=info,changedesk_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&config, &args).await {
        tracing::error!(error = %e, "Command failed");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(config: &ClientConfig, args: &[String]) -> anyhow::Result<()> {
    let session = HttpSession::new(config).context("building HTTP session")?;
    let call_budget = session.call_budget();
    let workflow = Workflow::with_timeout(session, call_budget);
    let per_page = config.per_page;

    tracing::info!(
        actor_id = config.actor.user_id,
        role = config.actor.role.as_str(),
        api_url = %config.api_url,
        "Starting changedesk",
    );

    let command = args.first().map(String::as_str).unwrap_or("requests");
    let rest = args.get(1..).unwrap_or_default();

    match command {
        "requests" => {
            let status = match rest.first() {
                Some(name) => StatusFilter::from_name(name)?,
                None => StatusFilter::All,
            };
            let page = parse_page(rest.get(1))?;
            let text = rest.get(2..).unwrap_or_default().join(" ");
            let query = RequestQuery::new(status, text);

            let page = workflow.request_page(&query, page, per_page).await?;
            for r in &page.items {
                println!("{}", render::request_row(r));
            }
            println!("{}", render::page_footer(&page.info));
        }
        "stats" => {
            let stats = workflow.stats().await?;
            println!("{}", render::stats_block(&stats));
        }
        "activity" => {
            let page = parse_page(rest.first())?;
            let text = rest.get(1..).unwrap_or_default().join(" ");
            let page = workflow.activity_page(&text, page, per_page).await?;
            for a in &page.items {
                println!("{}", render::activity_row(a));
            }
            println!("{}", render::page_footer(&page.info));
        }
        "thread" => {
            let project_id = parse_id(rest.first(), "project_id")?;
            let thread = workflow.conversation(project_id).await?;
            if thread.is_empty() {
                println!("No conversation for project {project_id}");
            }
            for turn in &thread {
                println!("{}", render::turn_entry(turn));
            }
        }
        "respond" => {
            let project_id = parse_id(rest.first(), "project_id")?;
            let decision = match rest.get(1) {
                Some(name) => TurnDecision::from_name(name)?,
                None => bail!("respond needs a decision: accepted or rejected"),
            };
            let remarks = rest.get(2..).unwrap_or_default().join(" ");
            let response = TurnResponse {
                decision,
                remarks: Some(remarks),
                attachment: None,
            };
            let turn = workflow.respond_to_latest(project_id, response).await?;
            println!("{}", render::turn_entry(&turn));
        }
        other => bail!("unknown command '{other}'"),
    }
    Ok(())
}

fn parse_page(arg: Option<&String>) -> anyhow::Result<usize> {
    match arg {
        Some(v) => v
            .parse()
            .with_context(|| format!("page must be a positive number, got '{v}'")),
        None => Ok(1),
    }
}

fn parse_id(arg: Option<&String>, name: &str) -> anyhow::Result<DbId> {
    let value = arg.with_context(|| format!("missing {name}"))?;
    value
        .parse()
        .with_context(|| format!("{name} must be an integer, got '{value}'"))
}
