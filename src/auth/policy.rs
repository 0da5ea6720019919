//! Role-based access control, collapsed into one decision function.
//!
//! Every handler asks this module the same question: may this role perform
//! this action, given what we know about the target? The answer is a pure
//! `Decision` with no side effects; logging and the actual storage work stay
//! with the caller.

use crate::error::ApiError;
use crate::model::role::Role;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DenyReason {
    /// Requester role missing, unrecognized, or not in the action's role set.
    Role,
    /// Account-management actions never apply to the requester's own account.
    SelfAction,
    /// Support may not touch another Support account.
    PeerProtection,
    /// Only Admin may create, promote to, or modify Admin.
    PrivilegeEscalation,
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::Role => "forbidden-role",
            DenyReason::SelfAction => "forbidden-self-action",
            DenyReason::PeerProtection => "forbidden-peer-protection",
            DenyReason::PrivilegeEscalation => "forbidden-privilege-escalation",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// An action under policy. Account-management variants carry the target
/// attributes the guard rules depend on; `target_role` is `None` when the
/// stored role name no longer parses.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Action {
    ListAccounts,
    CreateAccount {
        new_role: Role,
    },
    UpdateAccountRole {
        target_is_self: bool,
        target_role: Option<Role>,
        new_role: Role,
    },
    DeleteAccount {
        target_is_self: bool,
        target_role: Option<Role>,
    },
    UpdateOwnAccount {
        changes_role: bool,
    },
    CreateEmployee,
    UpdateEmployee,
    DeleteEmployee,
    CreateAttendance,
    DeleteAttendance,
    CreatePayroll,
    DeletePayroll,
    CreateReport,
    DeleteReport,
    UpdateSettings,
    DeleteSettings,
    DeleteFeedback,
}

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const ACCOUNT_MANAGERS: &[Role] = &[Role::Admin, Role::Support];
const HR_WRITERS: &[Role] = &[Role::Admin, Role::Manager];
const ATTENDANCE_WRITERS: &[Role] = &[Role::Admin, Role::Manager, Role::OfficeStaff];

/// Base role table. `None` means any authenticated role.
fn allowed_roles(action: &Action) -> Option<&'static [Role]> {
    match action {
        Action::ListAccounts
        | Action::CreateAccount { .. }
        | Action::UpdateAccountRole { .. }
        | Action::DeleteAccount { .. } => Some(ACCOUNT_MANAGERS),

        Action::CreateEmployee
        | Action::UpdateEmployee
        | Action::DeleteEmployee
        | Action::CreatePayroll
        | Action::DeletePayroll
        | Action::CreateReport
        | Action::DeleteReport => Some(HR_WRITERS),

        Action::CreateAttendance | Action::DeleteAttendance => Some(ATTENDANCE_WRITERS),

        Action::DeleteSettings | Action::DeleteFeedback => Some(ADMIN_ONLY),

        Action::UpdateSettings | Action::UpdateOwnAccount { .. } => None,
    }
}

/// Decide ALLOW or DENY. Never panics: a missing or unparseable requester
/// role is just another input that denies with `forbidden-role`.
pub fn evaluate(role: Option<Role>, action: &Action) -> Decision {
    let Some(role) = role else {
        return Decision::Deny(DenyReason::Role);
    };

    if let Some(allowed) = allowed_roles(action) {
        if !allowed.contains(&role) {
            return Decision::Deny(DenyReason::Role);
        }
    }

    // Guard rules on top of the table; first match wins.
    match *action {
        Action::UpdateOwnAccount { changes_role } => {
            if changes_role {
                // Role changes to one's own account only happen through the
                // account-management endpoints, by someone else.
                Decision::Deny(DenyReason::SelfAction)
            } else {
                Decision::Allow
            }
        }

        Action::CreateAccount { new_role } => {
            if new_role == Role::Admin && role != Role::Admin {
                return Decision::Deny(DenyReason::PrivilegeEscalation);
            }
            if role == Role::Support && new_role == Role::Support {
                return Decision::Deny(DenyReason::PeerProtection);
            }
            Decision::Allow
        }

        Action::DeleteAccount {
            target_is_self,
            target_role,
        } => account_target_guards(role, target_is_self, target_role, None),

        Action::UpdateAccountRole {
            target_is_self,
            target_role,
            new_role,
        } => account_target_guards(role, target_is_self, target_role, Some(new_role)),

        _ => Decision::Allow,
    }
}

fn account_target_guards(
    role: Role,
    target_is_self: bool,
    target_role: Option<Role>,
    new_role: Option<Role>,
) -> Decision {
    if target_is_self {
        return Decision::Deny(DenyReason::SelfAction);
    }
    if target_role == Some(Role::Admin) && role != Role::Admin {
        return Decision::Deny(DenyReason::PrivilegeEscalation);
    }
    if role == Role::Support {
        if new_role == Some(Role::Admin) {
            return Decision::Deny(DenyReason::PrivilegeEscalation);
        }
        if target_role == Some(Role::Support) || new_role == Some(Role::Support) {
            return Decision::Deny(DenyReason::PeerProtection);
        }
    }
    Decision::Allow
}

/// Handler-facing wrapper: turn a denial into the `forbidden` API error.
pub fn authorize(role: Option<Role>, action: &Action) -> Result<(), ApiError> {
    match evaluate(role, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(ApiError::Forbidden(reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [Role; 4] = [Role::Admin, Role::Manager, Role::OfficeStaff, Role::Support];

    fn allow(role: Role, action: Action) {
        assert_eq!(evaluate(Some(role), &action), Decision::Allow, "{role:?} {action:?}");
    }

    fn deny(role: Role, action: Action, reason: DenyReason) {
        assert_eq!(
            evaluate(Some(role), &action),
            Decision::Deny(reason),
            "{role:?} {action:?}"
        );
    }

    #[test]
    fn missing_role_denies_every_action() {
        for action in [
            Action::ListAccounts,
            Action::CreateEmployee,
            Action::UpdateSettings,
            Action::DeleteFeedback,
        ] {
            assert_eq!(evaluate(None, &action), Decision::Deny(DenyReason::Role));
        }
    }

    #[test]
    fn account_management_is_admin_and_support_only() {
        for role in [Role::Manager, Role::OfficeStaff] {
            deny(role, Action::ListAccounts, DenyReason::Role);
            deny(
                role,
                Action::CreateAccount { new_role: Role::OfficeStaff },
                DenyReason::Role,
            );
            deny(
                role,
                Action::DeleteAccount { target_is_self: false, target_role: Some(Role::OfficeStaff) },
                DenyReason::Role,
            );
        }
        allow(Role::Admin, Action::ListAccounts);
        allow(Role::Support, Action::ListAccounts);
    }

    #[test]
    fn base_table_for_record_keeping() {
        allow(Role::Manager, Action::CreateEmployee);
        deny(Role::OfficeStaff, Action::CreateEmployee, DenyReason::Role);
        deny(Role::Support, Action::UpdateEmployee, DenyReason::Role);

        allow(Role::OfficeStaff, Action::CreateAttendance);
        allow(Role::Manager, Action::DeleteAttendance);
        deny(Role::Support, Action::CreateAttendance, DenyReason::Role);

        allow(Role::Manager, Action::CreatePayroll);
        deny(Role::OfficeStaff, Action::DeletePayroll, DenyReason::Role);

        allow(Role::Manager, Action::CreateReport);
        deny(Role::Support, Action::DeleteReport, DenyReason::Role);

        allow(Role::Admin, Action::DeleteSettings);
        for role in [Role::Manager, Role::OfficeStaff, Role::Support] {
            deny(role, Action::DeleteSettings, DenyReason::Role);
            deny(role, Action::DeleteFeedback, DenyReason::Role);
        }
    }

    #[test]
    fn settings_update_is_open_to_all_roles() {
        for role in ALL_ROLES {
            allow(role, Action::UpdateSettings);
        }
    }

    #[test]
    fn nobody_touches_their_own_account() {
        for role in [Role::Admin, Role::Support] {
            deny(
                role,
                Action::DeleteAccount { target_is_self: true, target_role: Some(role) },
                DenyReason::SelfAction,
            );
            deny(
                role,
                Action::UpdateAccountRole {
                    target_is_self: true,
                    target_role: Some(role),
                    new_role: Role::Manager,
                },
                DenyReason::SelfAction,
            );
        }
    }

    #[test]
    fn self_rule_fires_before_admin_target_rule() {
        // An Admin deleting itself is a self-action, not an admin-target case.
        deny(
            Role::Admin,
            Action::DeleteAccount { target_is_self: true, target_role: Some(Role::Admin) },
            DenyReason::SelfAction,
        );
        // Support deleting itself: self-action, not peer protection.
        deny(
            Role::Support,
            Action::DeleteAccount { target_is_self: true, target_role: Some(Role::Support) },
            DenyReason::SelfAction,
        );
    }

    #[test]
    fn admin_targets_require_an_admin_requester() {
        deny(
            Role::Support,
            Action::DeleteAccount { target_is_self: false, target_role: Some(Role::Admin) },
            DenyReason::PrivilegeEscalation,
        );
        deny(
            Role::Support,
            Action::UpdateAccountRole {
                target_is_self: false,
                target_role: Some(Role::Admin),
                new_role: Role::Manager,
            },
            DenyReason::PrivilegeEscalation,
        );
        // Manager and Office Staff never reach the guard: the table stops them.
        deny(
            Role::Manager,
            Action::DeleteAccount { target_is_self: false, target_role: Some(Role::Admin) },
            DenyReason::Role,
        );
        allow(
            Role::Admin,
            Action::DeleteAccount { target_is_self: false, target_role: Some(Role::Admin) },
        );
    }

    #[test]
    fn support_peer_protection() {
        deny(
            Role::Support,
            Action::DeleteAccount { target_is_self: false, target_role: Some(Role::Support) },
            DenyReason::PeerProtection,
        );
        deny(
            Role::Support,
            Action::UpdateAccountRole {
                target_is_self: false,
                target_role: Some(Role::Support),
                new_role: Role::Manager,
            },
            DenyReason::PeerProtection,
        );
        deny(
            Role::Support,
            Action::UpdateAccountRole {
                target_is_self: false,
                target_role: Some(Role::OfficeStaff),
                new_role: Role::Support,
            },
            DenyReason::PeerProtection,
        );
        deny(
            Role::Support,
            Action::CreateAccount { new_role: Role::Support },
            DenyReason::PeerProtection,
        );
        // Admin is not bound by peer protection.
        allow(
            Role::Admin,
            Action::DeleteAccount { target_is_self: false, target_role: Some(Role::Support) },
        );
    }

    #[test]
    fn support_cannot_mint_or_promote_admins() {
        deny(
            Role::Support,
            Action::CreateAccount { new_role: Role::Admin },
            DenyReason::PrivilegeEscalation,
        );
        deny(
            Role::Support,
            Action::UpdateAccountRole {
                target_is_self: false,
                target_role: Some(Role::OfficeStaff),
                new_role: Role::Admin,
            },
            DenyReason::PrivilegeEscalation,
        );
    }

    #[test]
    fn admin_may_create_another_admin() {
        allow(Role::Admin, Action::CreateAccount { new_role: Role::Admin });
        allow(
            Role::Admin,
            Action::UpdateAccountRole {
                target_is_self: false,
                target_role: Some(Role::OfficeStaff),
                new_role: Role::Admin,
            },
        );
    }

    #[test]
    fn own_profile_update_allows_everything_but_role_changes() {
        for role in ALL_ROLES {
            allow(role, Action::UpdateOwnAccount { changes_role: false });
            deny(
                role,
                Action::UpdateOwnAccount { changes_role: true },
                DenyReason::SelfAction,
            );
        }
    }

    #[test]
    fn unparseable_target_role_is_an_ordinary_target() {
        // A stored role name the enum no longer knows blocks neither rule 2
        // nor rule 3; the base table already vetted the requester.
        allow(
            Role::Support,
            Action::DeleteAccount { target_is_self: false, target_role: None },
        );
    }

    #[test]
    fn reason_codes() {
        assert_eq!(DenyReason::Role.code(), "forbidden-role");
        assert_eq!(DenyReason::SelfAction.code(), "forbidden-self-action");
        assert_eq!(DenyReason::PeerProtection.code(), "forbidden-peer-protection");
        assert_eq!(
            DenyReason::PrivilegeEscalation.code(),
            "forbidden-privilege-escalation"
        );
    }
}
