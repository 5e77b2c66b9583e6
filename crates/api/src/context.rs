use forgestore_core::UserId;

/// Role granted by the upstream identity service.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Role {
    Customer,
    Admin,
}

/// Caller context for a request.
///
/// Immutable and present for all domain routes; resolved by the identity
/// middleware before any handler runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CallerContext {
    user_id: UserId,
    role: Role,
}

impl CallerContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
