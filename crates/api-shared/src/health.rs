use crate::types::HealthRes;
use chrono::SecondsFormat;
use era_core::constants::SERVICE_NAME;

/// Simple health service used by the REST API
///
/// Reports that the process is up, which service it is and when the check ran.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    pub fn new() -> Self {
        Self
    }

    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` with status `"OK"`, the service name and the current UTC time.
    pub fn check_health() -> HealthRes {
        HealthRes {
            status: "OK".into(),
            service: SERVICE_NAME.into(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_reports_ok_with_parseable_timestamp() {
        let res = HealthService::check_health();
        assert_eq!(res.status, "OK");
        assert_eq!(res.service, SERVICE_NAME);
        assert!(chrono::DateTime::parse_from_rfc3339(&res.timestamp).is_ok());
        assert!(res.timestamp.ends_with('Z'));
    }
}
