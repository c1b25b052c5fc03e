/// Source of the current user's display name.
///
/// Used whenever a command doesn't come with an explicit author.
pub trait UserResolver {
    fn current_user(&self) -> String;
}

impl<F: Fn() -> String> UserResolver for F {
    fn current_user(&self) -> String {
        self()
    }
}

/// A resolver that always returns the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedUser(pub String);

impl FixedUser {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl UserResolver for FixedUser {
    fn current_user(&self) -> String {
        self.0.clone()
    }
}
