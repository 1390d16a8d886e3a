//! The advisory collaborator: free-text guidance requested asynchronously and appended to
//! the mission log as ground traffic.

mod advisor;
mod http_advisor;

#[cfg(test)]
mod tests;

pub use advisor::{
    Advisor, AdvisoryError, AdvisoryRequest, EMPTY_MESSAGE, FALLBACK_MESSAGE, OfflineAdvisor, request_guidance,
};
pub use http_advisor::HttpAdvisor;
