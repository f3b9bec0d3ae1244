//! Runs a sequence of turns and prints what the agent answers.

use std::io::Write;

use owo_colors::OwoColorize;
use taxagent_core::{Agent, RunResponse};
use taxagent_model::AgentService;
use tracing::Instrument;

use crate::Error;

/// Turns run when no input is given.
pub const DEFAULT_INPUTS: [&str; 2] = [
    "give me policies on terms and conditions",
    "get all rows from table flight_data",
];

/// Context telling the agent who the logged in user is.
pub const DEMO_CONTEXT: &str = "[Context: The logged in user ID is: user_123]";

const BAR_CHAR: &str = "▎";

/// How [`run_turns`] runs and prints the turns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    /// Continue the session of the previous turn instead of starting a
    /// new one for every input.
    pub chain_session: bool,
    /// Text prepended to every input.
    pub context: Option<String>,
    /// Print the execution traces after each answer.
    pub show_traces: bool,
    /// Colorize the headers.
    pub color: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            chain_session: false,
            context: None,
            show_traces: true,
            color: false,
        }
    }
}

/// Runs `inputs` one after another and writes every answer to `out`.
///
/// Turns are independent unless [`RunOptions::chain_session`] is set.
/// The first failing turn stops the run.
pub async fn run_turns<S, W>(
    agent: &Agent<S>,
    inputs: &[String],
    options: &RunOptions,
    out: &mut W,
) -> Result<Vec<RunResponse>, Error>
where
    S: AgentService,
    W: Write,
{
    let mut responses: Vec<RunResponse> = Vec::with_capacity(inputs.len());
    for (idx, input) in inputs.iter().enumerate() {
        let message = match &options.context {
            Some(context) => format!("{context} {input}"),
            None => input.clone(),
        };
        let session_id = match responses.last() {
            Some(last) if options.chain_session => Some(last.session_id()),
            _ => None,
        };

        let span = info_span!("run turn", turn = idx + 1);
        let response = agent
            .run(&message, session_id)
            .instrument(span)
            .await?;

        if options.color {
            writeln!(out, "{}{}", BAR_CHAR.bright_cyan(), input.bold())?;
        } else {
            writeln!(out, "> {input}")?;
        }
        response.pretty_print(out)?;
        if options.show_traces && !response.traces().is_empty() {
            writeln!(out)?;
            if options.color {
                writeln!(out, "{}", "Traces:".dimmed())?;
            } else {
                writeln!(out, "Traces:")?;
            }
            response.pretty_print_traces(out)?;
        }
        writeln!(out)?;
        responses.push(response);
    }
    Ok(responses)
}
