use std::time::Duration;

use taskhub_auth::Principal;
use taskhub_infra::RequestContext;

/// Upper bound on the work done for one HTTP request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Execution context for a request that carries no identity.
pub fn anonymous() -> RequestContext {
    RequestContext::background().with_timeout(REQUEST_TIMEOUT)
}

/// Principal context for a request (the verified, live user).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> &str {
        &self.principal.id
    }

    pub fn request_context(&self) -> RequestContext {
        anonymous().with_principal(self.principal.clone())
    }
}
