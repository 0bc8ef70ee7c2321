use clap::{ArgAction, Parser};
use onboard::app::{Outcome, Session};
use onboard::auth::{AuthFlow, InMemoryIdentity};
use onboard::config::WizardConfig;
use onboard::logging;
use onboard::terminal::Terminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "onboard",
    version,
    about = "Email sign-in followed by a step-by-step onboarding wizard",
    long_about = "Signs in with an email address and a one-time code, then walks through \
                  the onboarding steps. Codes come from an in-memory identity service and \
                  are written to the log; pass -v to see them or --code to fix one."
)]
struct Cli {
    /// Wizard definition in YAML; defaults to the built-in onboarding steps
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Submit this email address straight away
    #[arg(short, long)]
    email: Option<String>,

    /// Issue this code instead of a random one
    #[arg(long)]
    code: Option<String>,

    /// Go straight to onboarding
    #[arg(long)]
    skip_login: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(Outcome::Completed(_)) => ExitCode::SUCCESS,
        Ok(Outcome::Aborted) => ExitCode::from(130),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let config = match &cli.config {
        Some(path) => WizardConfig::load(path)?,
        None => WizardConfig::default(),
    };

    let terminal = Terminal::new()?;
    let mut session = Session::new(BufReader::new(tokio::io::stdin()), terminal, config);

    if cli.skip_login {
        return Ok(session.onboard().await?);
    }

    let mut identity = InMemoryIdentity::new();
    if let Some(code) = cli.code {
        identity = identity.with_fixed_code(code);
    }
    let mut flow = AuthFlow::new(Arc::new(identity));
    let Some(signed_in) = session.login(&mut flow, cli.email.as_deref()).await? else {
        return Ok(Outcome::Aborted);
    };
    info!(user_id = %signed_in.user_id, new_user = signed_in.new_user, "starting onboarding");

    let outcome = session.onboard().await?;
    if outcome == Outcome::Aborted {
        session.sign_out(&mut flow).await?;
    }
    Ok(outcome)
}
