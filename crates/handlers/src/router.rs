//! Dispatches one trigger event to its handler.
//!
//! | Action | Handler |
//! |--------|---------|
//! | `opened` | [`GreetingHandler`] |
//! | `closed` | [`StoryPublisher`] |
//! | anything else | none; the run reports [`RunOutcome::Unsupported`] |

use pipeline::{EventAction, GitHubEvent, MetaphorError, RunId};
use tracing::{info, instrument, warn};

use crate::{GreetingHandler, RunOutcome, StoryPublisher};

/// Routes events by action. No state is kept between events.
pub struct EventRouter {
    greeter: GreetingHandler,
    publisher: StoryPublisher,
}

impl EventRouter {
    pub fn new(greeter: GreetingHandler, publisher: StoryPublisher) -> Self {
        Self { greeter, publisher }
    }

    /// Handles `event` end to end.
    #[instrument(
        name = "run",
        skip_all,
        fields(run_id = %run_id, action = %event.action, repository = %event.repository, number = %event.subject.number)
    )]
    pub async fn dispatch(
        &self,
        run_id: RunId,
        event: &GitHubEvent,
    ) -> Result<RunOutcome, MetaphorError> {
        let outcome = match &event.action {
            EventAction::Opened => self.greeter.handle(event).await?,
            EventAction::Closed => self.publisher.handle(event).await?,
            EventAction::Other(action) => {
                warn!(%action, "unsupported event action");
                return Ok(RunOutcome::Unsupported {
                    action: action.clone(),
                });
            }
        };
        info!(%outcome, "event handled");
        Ok(outcome)
    }
}
