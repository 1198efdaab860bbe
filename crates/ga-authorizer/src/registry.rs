// registry.rs — The action registry.
//
// Actions are dispatched through an explicit registry populated at
// construction time: action name → declared complexity + check handler.
// An action that was never registered is denied with `unknown_action` —
// there is no fallback lookup, no default grant.

use std::collections::{BTreeMap, HashMap};

use ga_agent::Agent;
use ga_policy::{ActionComplexity, AuthzOutcome, DenialReason, PolicyTable};

/// A pluggable authorization check for one action kind.
///
/// The standard implementation is [`MaturityCheck`]; deployments can
/// register bespoke handlers for actions with extra gating rules.
pub trait ActionCheck: Send + Sync {
    fn check(
        &self,
        agent: &Agent,
        complexity: ActionComplexity,
        table: &PolicyTable,
    ) -> AuthzOutcome;
}

/// The standard check: the agent's maturity must cover the complexity,
/// per the policy table.
pub struct MaturityCheck;

impl ActionCheck for MaturityCheck {
    fn check(
        &self,
        agent: &Agent,
        complexity: ActionComplexity,
        table: &PolicyTable,
    ) -> AuthzOutcome {
        table.permits(agent.maturity, complexity)
    }
}

/// A registered action: its declared complexity and its check handler.
pub struct RegisteredAction {
    pub complexity: ActionComplexity,
    pub check: Box<dyn ActionCheck>,
}

/// Explicit action-name → handler map, resolved at registration time.
pub struct ActionRegistry {
    actions: HashMap<String, RegisteredAction>,
}

impl ActionRegistry {
    /// An empty registry — every dispatch is `unknown_action`.
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Seed the registry from a configured action catalog, installing the
    /// standard maturity check for each action.
    pub fn from_catalog(catalog: &BTreeMap<String, ActionComplexity>) -> Self {
        let mut registry = Self::new();
        for (action, complexity) in catalog {
            registry.register(action, *complexity, Box::new(MaturityCheck));
        }
        registry
    }

    /// Register (or replace) an action handler.
    pub fn register(
        &mut self,
        action: impl Into<String>,
        complexity: ActionComplexity,
        check: Box<dyn ActionCheck>,
    ) {
        self.actions.insert(
            action.into(),
            RegisteredAction { complexity, check },
        );
    }

    /// Look up an action's registration.
    pub fn resolve(&self, action: &str) -> Option<&RegisteredAction> {
        self.actions.get(action)
    }

    /// The denial every unknown action gets.
    pub fn unknown(action: &str) -> AuthzOutcome {
        AuthzOutcome::Denied {
            reason: DenialReason::UnknownAction {
                action: action.to_string(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
