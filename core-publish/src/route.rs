//! Create-route resolution.
//!
//! Some sites register a dedicated `job_listing` post type, others only have
//! plain `posts`. The primary route is tried on the first create of a run;
//! a route-not-found answer switches to the fallback for the rest of the run.

use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    Unresolved,
    /// First create on the primary route is in flight
    ProbingPrimary,
    ResolvedPrimary,
    ResolvedFallback,
}

#[derive(Debug, Clone)]
pub struct RouteResolver {
    primary: String,
    fallback: String,
    state: RouteState,
}

impl RouteResolver {
    pub fn new(primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            fallback: fallback.into(),
            state: RouteState::Unresolved,
        }
    }

    pub fn state(&self) -> RouteState {
        self.state
    }

    /// Forget the previous run's choice.
    pub fn reset(&mut self) {
        self.state = RouteState::Unresolved;
    }

    /// Route for the next create call. Starts probing if unresolved.
    pub fn route_for_create(&mut self) -> &str {
        match self.state {
            RouteState::Unresolved => {
                debug!(route = %self.primary, "Probing primary route");
                self.state = RouteState::ProbingPrimary;
                &self.primary
            }
            RouteState::ProbingPrimary | RouteState::ResolvedPrimary => &self.primary,
            RouteState::ResolvedFallback => &self.fallback,
        }
    }

    /// Best current guess without changing state, for read-back.
    pub fn current_route(&self) -> &str {
        match self.state {
            RouteState::ResolvedFallback => &self.fallback,
            _ => &self.primary,
        }
    }

    /// A create on `route` succeeded.
    pub fn record_success(&mut self, route: &str) {
        if self.state == RouteState::ProbingPrimary && route == self.primary {
            info!(route, "Using primary route");
            self.state = RouteState::ResolvedPrimary;
        }
    }

    /// The primary route does not exist. Returns the fallback route to retry
    /// on, or `None` when the fallback itself was missing.
    pub fn record_route_not_found(&mut self, route: &str) -> Option<String> {
        if route != self.primary || self.state == RouteState::ResolvedFallback {
            return None;
        }
        info!(primary = %self.primary, fallback = %self.fallback, "Primary route missing, switching to fallback");
        self.state = RouteState::ResolvedFallback;
        Some(self.fallback.clone())
    }
}
