//! Ask command implementation

use crate::cli::output::{format_response, format_response_json};
use crate::cli::AskArgs;
use crate::client::RouterClient;
use crate::config::ClientConfig;
use crate::controller::SubmitOutcome;

/// Route one query and render the answer. The exchange is recorded in the session.
pub async fn handle_ask(args: &AskArgs, config: &ClientConfig) -> anyhow::Result<String> {
    let client = RouterClient::from_config(config)?;

    let outcome = client
        .submit(
            &args.query,
            args.system_prompt.as_deref(),
            args.model.as_deref(),
        )
        .await?;

    match outcome {
        SubmitOutcome::Completed(entry) => Ok(if args.json {
            format_response_json(&entry)
        } else {
            format_response(&entry)
        }),
        SubmitOutcome::Failed { message } => anyhow::bail!(message),
        SubmitOutcome::Discarded => anyhow::bail!("request was cancelled"),
    }
}
