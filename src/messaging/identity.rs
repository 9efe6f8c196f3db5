use crate::common::Identity;

/// Works out who the view is acting as.
///
/// The signed-in user wins; otherwise the name a guest typed in. Blank values
/// count as absent, and with neither the view has no active user.
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    identity: Option<Identity>,
    guest_username: String,
}

impl IdentityResolver {
    pub fn new(identity: Option<Identity>) -> Self {
        Self {
            identity,
            guest_username: String::new(),
        }
    }

    pub fn active_username(&self) -> Option<&str> {
        self.identity
            .as_ref()
            .map(|identity| identity.username.trim())
            .filter(|username| !username.is_empty())
            .or_else(|| Some(self.guest_username.trim()).filter(|name| !name.is_empty()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn guest_username(&self) -> &str {
        &self.guest_username
    }

    pub fn set_identity(&mut self, identity: Option<Identity>) {
        self.identity = identity;
    }

    pub fn set_guest_username(&mut self, name: &str) {
        self.guest_username = name.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> Option<Identity> {
        Some(Identity {
            username: name.to_string(),
        })
    }

    #[test]
    fn no_identity_and_no_guest_means_not_ready() {
        let resolver = IdentityResolver::default();
        assert_eq!(resolver.active_username(), None);
    }

    #[test]
    fn guest_name_used_when_signed_out() {
        let mut resolver = IdentityResolver::new(None);
        resolver.set_guest_username("  alice ");
        assert_eq!(resolver.active_username(), Some("alice"));
        assert!(!resolver.is_authenticated());
    }

    #[test]
    fn signed_in_user_beats_guest_name() {
        let mut resolver = IdentityResolver::new(user("dana"));
        resolver.set_guest_username("alice");
        assert_eq!(resolver.active_username(), Some("dana"));
    }

    #[test]
    fn blank_values_count_as_absent() {
        let mut resolver = IdentityResolver::new(user("   "));
        resolver.set_guest_username("   ");
        assert_eq!(resolver.active_username(), None);

        resolver.set_guest_username("eve");
        assert_eq!(resolver.active_username(), Some("eve"));
    }
}
