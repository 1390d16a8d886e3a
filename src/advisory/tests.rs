use super::*;
use crate::dsky::Code;
use crate::flight_control::FlightState;
use async_trait::async_trait;
use std::time::Duration;

struct ScriptedAdvisor {
    reply: Result<String, AdvisoryError>,
    delay: Duration,
}

#[async_trait]
impl Advisor for ScriptedAdvisor {
    async fn guidance(&self, _request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
        tokio::time::sleep(self.delay).await;
        self.reply.clone()
    }
}

fn request() -> AdvisoryRequest {
    let code = |v| Code::new(v).unwrap();
    AdvisoryRequest::new(&FlightState::IDLE, code(63), code(16), code(68))
}

#[tokio::test]
async fn test_guidance_passed_through() {
    let advisor = ScriptedAdvisor { reply: Ok(" MONITOR V16 N68 \n".into()), delay: Duration::ZERO };
    let text = request_guidance(&advisor, &request(), Duration::from_secs(1)).await;
    assert_eq!(text, "MONITOR V16 N68");
}

#[tokio::test]
async fn test_empty_reply() {
    let advisor = ScriptedAdvisor { reply: Ok("   ".into()), delay: Duration::ZERO };
    assert_eq!(request_guidance(&advisor, &request(), Duration::from_secs(1)).await, EMPTY_MESSAGE);
}

#[tokio::test]
async fn test_failure_falls_back() {
    let advisor = ScriptedAdvisor { reply: Err(AdvisoryError::NoConnection), delay: Duration::ZERO };
    assert_eq!(request_guidance(&advisor, &request(), Duration::from_secs(1)).await, FALLBACK_MESSAGE);
    assert_eq!(request_guidance(&OfflineAdvisor, &request(), Duration::from_secs(1)).await, FALLBACK_MESSAGE);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_falls_back() {
    let advisor = ScriptedAdvisor { reply: Ok("TOO LATE".into()), delay: Duration::from_secs(30) };
    let text = request_guidance(&advisor, &request(), Duration::from_millis(8000)).await;
    assert_eq!(text, FALLBACK_MESSAGE);
}

#[test]
fn test_request_snapshot() {
    let req = request();
    assert_eq!(req.altitude, 15_000.0);
    assert_eq!(req.velocity, -100.0);
    assert_eq!(req.summary(), "ALT 15000.0 M, VEL -100.0 M/S, FUEL 100.0%, THRUST 0%, P63 V16 N68");
}

#[test]
fn test_http_advisor_trims_base_url() {
    let advisor = HttpAdvisor::new("http://localhost:8000/").unwrap();
    assert_eq!(advisor.url(), "http://localhost:8000");
}
