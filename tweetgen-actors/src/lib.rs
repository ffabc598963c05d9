pub mod actor;
pub mod builder;
pub mod generator;
pub mod system;

use tokio::sync::oneshot;
use tweetgen_common::{Generation, Provider, TweetRequest};

/// Result of one generation as seen by the UI: the text, or the error message.
pub type GenerateOutcome = std::result::Result<Generation, String>;

/// Ask the generator actor for one batch of tweets.
pub struct GenerateCmd {
    pub request: TweetRequest,
    pub provider: Provider,
    pub reply: oneshot::Sender<GenerateOutcome>,
}

impl GenerateCmd {
    pub fn new(
        request: TweetRequest,
        provider: Provider,
    ) -> (Self, oneshot::Receiver<GenerateOutcome>) {
        let (reply, rx) = oneshot::channel();
        (
            Self {
                request,
                provider,
                reply,
            },
            rx,
        )
    }
}
