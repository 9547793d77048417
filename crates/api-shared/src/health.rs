use crate::wire::HealthRes;

/// Simple health service shared by the REST API and the runner.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Patient records service is alive".into(),
        }
    }
}
