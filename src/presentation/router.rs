use crate::domain::session::Session;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{trace, warn};

/// Param key the catch-all entry stores the unmatched remainder under.
pub const CATCH_ALL_PARAM: &str = "pathMatch";

const MAX_REDIRECT_HOPS: usize = 8;

/// Outcome of an authorization policy or per-route guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(String),
}

pub type Guard = Arc<dyn Fn(&ResolvedRoute, Option<&Session>) -> RouteDecision + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_unauth: bool,
}

impl RouteMeta {
    /// Children inherit every flag their ancestors set.
    fn merged_with(self, child: RouteMeta) -> RouteMeta {
        RouteMeta {
            requires_auth: self.requires_auth || child.requires_auth,
            requires_unauth: self.requires_unauth || child.requires_unauth,
        }
    }
}

/// One entry of the route table. Paths are segment patterns: static segments,
/// `:name` captures, or the `*` catch-all. Child paths are relative to the
/// parent.
pub struct Route {
    path: String,
    name: Option<String>,
    views: BTreeMap<String, String>,
    meta: RouteMeta,
    redirect_to: Option<String>,
    guard: Option<Guard>,
    children: Vec<Route>,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            views: BTreeMap::new(),
            meta: RouteMeta::default(),
            redirect_to: None,
            guard: None,
            children: Vec::new(),
        }
    }

    /// A pure redirect entry; no views, no guards.
    pub fn redirect(path: impl Into<String>, target: impl Into<String>) -> Self {
        let mut route = Self::new(path);
        route.redirect_to = Some(target.into());
        route
    }

    /// The wildcard not-found entry. Declare it last.
    pub fn catch_all(view: impl Into<String>) -> Self {
        Self::new("*").view(view)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the view for the `default` outlet.
    pub fn view(self, view: impl Into<String>) -> Self {
        self.outlet("default", view)
    }

    /// Sets the view for a named outlet.
    pub fn outlet(mut self, outlet: impl Into<String>, view: impl Into<String>) -> Self {
        self.views.insert(outlet.into(), view.into());
        self
    }

    pub fn requires_auth(mut self) -> Self {
        self.meta.requires_auth = true;
        self
    }

    pub fn requires_unauth(mut self) -> Self {
        self.meta.requires_unauth = true;
        self
    }

    pub fn guard<F>(mut self, guard: F) -> Self
    where
        F: Fn(&ResolvedRoute, Option<&Session>) -> RouteDecision + Send + Sync + 'static,
    {
        self.guard = Some(Arc::new(guard));
        self
    }

    pub fn child(mut self, route: Route) -> Self {
        self.children.push(route);
        self
    }
}

/// A fully matched route: the deepest entry of the matched chain, with params
/// and metadata merged along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub name: Option<String>,
    pub pattern: String,
    pub params: BTreeMap<String, String>,
    pub views: BTreeMap<String, String>,
    pub meta: RouteMeta,
}

impl ResolvedRoute {
    pub fn view(&self, outlet: &str) -> Option<&str> {
        self.views.get(outlet).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched(ResolvedRoute),
    Redirect(String),
    NotFound,
}

/// Declarative route table with an explicit authorization policy: routes
/// flagged `requires_auth` redirect to the login target without a session,
/// routes flagged `requires_unauth` redirect to the authenticated target with
/// one. Per-route guards run afterwards, parent first.
pub struct RouteTable {
    routes: Vec<Route>,
    login_target: String,
    authed_target: String,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes,
            login_target: "/auth".to_string(),
            authed_target: "/".to_string(),
        }
    }

    /// Overrides where the built-in policy redirects to.
    pub fn with_policy_targets(
        mut self,
        login: impl Into<String>,
        authenticated: impl Into<String>,
    ) -> Self {
        self.login_target = login.into();
        self.authed_target = authenticated.into();
        self
    }

    /// One resolution step: match, then redirect entries, then the
    /// authorization policy, then per-route guards.
    pub fn resolve(&self, path: &str, session: Option<&Session>) -> Resolution {
        let segs = path_segments(path);
        let Some(outcome) = match_routes(
            &self.routes,
            &segs,
            "",
            RouteMeta::default(),
            BTreeMap::new(),
        ) else {
            trace!(path = path, "No route matched");
            return Resolution::NotFound;
        };

        if let Some(target) = outcome.redirect_to {
            return Resolution::Redirect(target);
        }

        if outcome.resolved.meta.requires_auth && session.is_none() {
            trace!(path = path, "Unauthenticated access to protected route");
            return Resolution::Redirect(self.login_target.clone());
        }
        if outcome.resolved.meta.requires_unauth && session.is_some() {
            trace!(path = path, "Authenticated access to guest-only route");
            return Resolution::Redirect(self.authed_target.clone());
        }

        for guard in &outcome.guards {
            if let RouteDecision::Redirect(target) = guard(&outcome.resolved, session) {
                return Resolution::Redirect(target);
            }
        }

        Resolution::Matched(outcome.resolved)
    }

    /// Follows redirects until a route matches, with a hop bound against
    /// redirect loops.
    pub fn navigate(&self, path: &str, session: Option<&Session>) -> Option<ResolvedRoute> {
        let mut current = path.to_string();
        for _ in 0..MAX_REDIRECT_HOPS {
            match self.resolve(&current, session) {
                Resolution::Matched(resolved) => return Some(resolved),
                Resolution::Redirect(target) => {
                    trace!(from = %current, to = %target, "Following redirect");
                    current = target;
                }
                Resolution::NotFound => return None,
            }
        }
        warn!(path = path, "Redirect chain did not settle");
        None
    }
}

struct MatchOutcome {
    resolved: ResolvedRoute,
    guards: Vec<Guard>,
    redirect_to: Option<String>,
}

fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn join_pattern(prefix: &str, path: &str) -> String {
    let tail = path.trim_start_matches('/');
    if tail.is_empty() {
        if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.to_string()
        }
    } else {
        format!("{}/{}", prefix.trim_end_matches('/'), tail)
    }
}

/// First declared match wins; a parent whose children all miss falls through
/// to the next sibling.
fn match_routes(
    routes: &[Route],
    remaining: &[&str],
    prefix: &str,
    inherited: RouteMeta,
    params: BTreeMap<String, String>,
) -> Option<MatchOutcome> {
    for route in routes {
        if route.path == "*" {
            let mut params = params.clone();
            params.insert(CATCH_ALL_PARAM.to_string(), remaining.join("/"));
            return Some(outcome_for(route, prefix, inherited, params));
        }

        let own: Vec<&str> = path_segments(&route.path);
        if own.len() > remaining.len() {
            continue;
        }

        let mut captured = params.clone();
        let mut matched = true;
        for (pattern_seg, path_seg) in own.iter().zip(remaining.iter()) {
            if let Some(param) = pattern_seg.strip_prefix(':') {
                captured.insert(param.to_string(), (*path_seg).to_string());
            } else if pattern_seg != path_seg {
                matched = false;
                break;
            }
        }
        if !matched {
            continue;
        }

        let rest = &remaining[own.len()..];
        if rest.is_empty() {
            return Some(outcome_for(route, prefix, inherited, captured));
        }

        if !route.children.is_empty() {
            let child_prefix = join_pattern(prefix, &route.path);
            let child_meta = inherited.merged_with(route.meta);
            if let Some(mut outcome) =
                match_routes(&route.children, rest, &child_prefix, child_meta, captured)
            {
                if let Some(guard) = &route.guard {
                    outcome.guards.insert(0, Arc::clone(guard));
                }
                return Some(outcome);
            }
        }
    }
    None
}

fn outcome_for(
    route: &Route,
    prefix: &str,
    inherited: RouteMeta,
    params: BTreeMap<String, String>,
) -> MatchOutcome {
    MatchOutcome {
        resolved: ResolvedRoute {
            name: route.name.clone(),
            pattern: join_pattern(prefix, &route.path),
            params,
            views: route.views.clone(),
            meta: inherited.merged_with(route.meta),
        },
        guards: route.guard.iter().map(Arc::clone).collect(),
        redirect_to: route.redirect_to.clone(),
    }
}

/// The route table of the coach application.
pub fn coach_app_routes() -> RouteTable {
    RouteTable::new(vec![
        Route::redirect("/", "/coaches"),
        Route::new("/coaches").name("coaches").view("CoachesList").child(
            Route::new(":id").name("coach-detail").view("CoachDetail").child(
                Route::new("contact").name("contact-coach").view("ContactCoach"),
            ),
        ),
        Route::new("/register")
            .name("register-coach")
            .view("CoachRegistration")
            .requires_auth(),
        Route::new("/requests")
            .name("requests")
            .view("RequestsReceived")
            .requires_auth(),
        Route::new("/auth")
            .name("user-auth")
            .view("UserAuth")
            .requires_unauth(),
        Route::catch_all("NotFound"),
    ])
    .with_policy_targets("/auth", "/coaches")
}
