use std::sync::Arc;

use uuid::Uuid;

/// Source of random tokens used for fallback file names and collision suffixes.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> String;
}

pub type SharedTokenSource = Arc<dyn TokenSource>;

/// Hex-encoded v4 UUIDs, 32 characters without dashes.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidTokens;

impl TokenSource for UuidTokens {
    fn token(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

impl<F> TokenSource for F
where
    F: Fn() -> String + Send + Sync,
{
    fn token(&self) -> String {
        self()
    }
}

pub fn default_tokens() -> SharedTokenSource {
    Arc::new(UuidTokens)
}
