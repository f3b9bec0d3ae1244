use taxagent_model::{
    AgentService, ChatDetails, CreateSessionDetails, RequiredAction,
};
use tracing::Instrument;

use super::Agent;
use crate::error::{Error, service_error};
use crate::response::RunResponse;

impl<S: AgentService> Agent<S> {
    /// Runs one conversation turn.
    ///
    /// Without `session_id` the turn runs in a new session, so two calls
    /// without an id share no context. Pass
    /// [`RunResponse::session_id`] of a previous turn to continue that
    /// conversation.
    ///
    /// While the service asks for local function calls, the registered
    /// tools are executed and their outputs sent back, at most
    /// `max_steps` exchanges in total.
    pub async fn run(
        &self,
        input: &str,
        session_id: Option<&str>,
    ) -> Result<RunResponse, Error> {
        if self.binding.is_none() {
            return Err(Error::NotSetUp);
        }
        if self.max_steps == 0 {
            return Err(Error::MaxStepsExceeded(0));
        }
        let span = info_span!("turn", session = session_id);
        self.run_turn(input, session_id).instrument(span).await
    }

    async fn run_turn(
        &self,
        input: &str,
        session_id: Option<&str>,
    ) -> Result<RunResponse, Error> {
        let endpoint_id = self.config.endpoint_id();
        let session_id = match session_id {
            Some(id) => id.to_owned(),
            None => {
                let details = CreateSessionDetails::default();
                let session = self
                    .service
                    .create_session(endpoint_id, &details)
                    .await
                    .map_err(service_error)?;
                debug!("created session {}", session.id);
                session.id
            }
        };

        let mut details = ChatDetails {
            user_message: input.to_owned(),
            should_stream: false,
            session_id: Some(session_id.clone()),
            performed_actions: vec![],
        };
        for step in 1..=self.max_steps {
            trace!("chat step {step}");
            let result = self
                .service
                .chat(endpoint_id, &details)
                .await
                .map_err(service_error)?;

            let has_calls = result.required_actions.iter().any(|action| {
                matches!(action, RequiredAction::FunctionCalling { .. })
            });
            if !has_calls {
                return Ok(RunResponse::new(session_id, result));
            }

            debug!(
                "service requires {} action(s)",
                result.required_actions.len()
            );
            let performed_actions =
                self.tool_executor.perform(&result.required_actions).await;
            details = ChatDetails {
                user_message: String::new(),
                should_stream: false,
                session_id: Some(session_id.clone()),
                performed_actions,
            };
        }

        warn!("turn exceeded {} steps", self.max_steps);
        Err(Error::MaxStepsExceeded(self.max_steps))
    }
}
