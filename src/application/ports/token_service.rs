/// Per-action security tokens guarding mutating requests, in the spirit of a
/// CSRF token service. Tokens are opaque to callers.
pub trait TokenService: Send + Sync {
    fn generate(&self, action: &str) -> anyhow::Result<String>;
    fn validate(&self, action: &str, token: &str) -> bool;
}
