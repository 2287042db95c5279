//! Browser-side route guard.
//!
//! The frontend fetches its identity from `GET /api/session` after hydration, so
//! the guard has to cope with an identity that is not there yet. It never decides
//! anything while loading and fires a redirect at most once per resolved state.

use crate::access::{self, Role, SessionIdentity, Verdict};

/// ClientIdentity
///
/// What the client SDK currently knows. `Loaded(SessionIdentity::anonymous())`
/// means "finished loading, nobody is signed in".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientIdentity {
    Loading,
    Loaded(SessionIdentity),
}

/// Requirement
///
/// The access rule a page hands to its guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Any signed-in user with a known role.
    Authenticated,
    Role(Role),
    /// A rejected role is sent to its own home. The set must therefore include
    /// the role owning the section the page lives in, or that page redirects to
    /// itself forever. An empty set rejects everyone; build it with `any_of`.
    AnyOf(Vec<Role>),
}

impl Requirement {
    /// `AnyOf` for a non-empty role set; `None` for an empty one.
    pub fn any_of(roles: impl IntoIterator<Item = Role>) -> Option<Self> {
        let roles: Vec<Role> = roles.into_iter().collect();
        (!roles.is_empty()).then_some(Requirement::AnyOf(roles))
    }

    fn accepts(&self, role: Role) -> bool {
        match self {
            Requirement::Authenticated => true,
            Requirement::Role(required) => *required == role,
            Requirement::AnyOf(allowed) => allowed.contains(&role),
        }
    }
}

/// GuardView
///
/// What the guarded component should show right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardView {
    Loading,
    Redirecting(&'static str),
    Render,
}

/// RouteGuard
///
/// Reactive recheck run after the page has loaded. `view` is the render-time
/// decision; `on_change` is the effect that runs whenever the identity changes.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    requirement: Requirement,
    // The resolved state the last redirect fired for.
    fired: Option<(SessionIdentity, &'static str)>,
}

impl RouteGuard {
    pub fn new(requirement: Requirement) -> Self {
        Self {
            requirement,
            fired: None,
        }
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    pub fn verdict(&self, identity: &SessionIdentity) -> Verdict {
        access::evaluate(identity, |role| self.requirement.accepts(role))
    }

    pub fn view(&self, state: &ClientIdentity) -> GuardView {
        match state {
            ClientIdentity::Loading => GuardView::Loading,
            ClientIdentity::Loaded(identity) => match self.verdict(identity).target() {
                Some(target) => GuardView::Redirecting(target),
                None => GuardView::Render,
            },
        }
    }

    /// on_change
    ///
    /// Returns the navigation to perform for this identity change, if any.
    /// Repeated notifications for the same resolved state return `None`, and a
    /// matching state re-arms the guard so a later mismatch redirects again.
    pub fn on_change(&mut self, state: &ClientIdentity) -> Option<&'static str> {
        let ClientIdentity::Loaded(identity) = state else {
            return None;
        };

        match self.verdict(identity).target() {
            None => {
                self.fired = None;
                None
            }
            Some(target) => {
                let already_fired = self
                    .fired
                    .as_ref()
                    .is_some_and(|(seen, seen_target)| seen == identity && *seen_target == target);
                if already_fired {
                    return None;
                }
                self.fired = Some((identity.clone(), target));
                Some(target)
            }
        }
    }
}
