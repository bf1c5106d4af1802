//! Blocking HTTP transport for the sky classifier.
//!
//! A thin [`ureq`] agent.  Status codes are passed through untouched so the
//! classifier can report them; only transport failures become errors.

use std::time::Duration;

use log::debug;

use crate::app::ports::{ClassifierError, ClassifierTransport, HttpReply};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("allsky-modules/", env!("CARGO_PKG_VERSION"));

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { agent }
    }
}

impl ClassifierTransport for UreqTransport {
    fn get(&mut self, url: &str, query: &[(&str, &str)]) -> Result<HttpReply, ClassifierError> {
        let request = query
            .iter()
            .fold(self.agent.get(url), |req, (k, v)| req.query(k, v));
        debug!("GET {}", request.url());

        let response = match request.call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                return Ok(HttpReply {
                    status: code,
                    body: resp.into_string().unwrap_or_default(),
                });
            }
            Err(ureq::Error::Transport(e)) => {
                return Err(ClassifierError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        let body = response
            .into_string()
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;
        Ok(HttpReply { status, body })
    }
}
