//! Role → view gate.
//!
//! Advisory only. It decides which top-level views a session renders; it is
//! not a security boundary, since every record is held locally and nothing is
//! enforced server-side. Each role's table lists every view with no wildcard
//! arm, so adding a `View` fails to compile until every role decides on it.

use serde::{Deserialize, Serialize};

use crate::types::Role;

/// Top-level views of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Dashboard,
    Animals,
    Tasks,
    Feed,
    Health,
    Finance,
    Forecast,
    Optimizer,
    Calendar,
    Advisor,
    Users,
    Settings,
}

impl View {
    pub const ALL: [View; 12] = [
        View::Dashboard,
        View::Animals,
        View::Tasks,
        View::Feed,
        View::Health,
        View::Finance,
        View::Forecast,
        View::Optimizer,
        View::Calendar,
        View::Advisor,
        View::Users,
        View::Settings,
    ];
}

/// Whether `role` may see `view`. `Role::Unassigned` sees nothing.
pub fn is_permitted(role: Role, view: View) -> bool {
    use View::*;

    match role {
        Role::Admin => match view {
            Dashboard | Animals | Tasks | Feed | Health | Finance | Forecast | Optimizer
            | Calendar | Advisor | Users | Settings => true,
        },
        Role::Manager => match view {
            Dashboard | Animals | Tasks | Feed | Health | Finance | Forecast | Optimizer
            | Calendar | Advisor => true,
            Users | Settings => false,
        },
        Role::Veterinarian => match view {
            Dashboard | Animals | Tasks | Health | Calendar | Advisor => true,
            Feed | Finance | Forecast | Optimizer | Users | Settings => false,
        },
        Role::Worker => match view {
            Dashboard | Animals | Tasks | Feed | Calendar => true,
            Health | Finance | Forecast | Optimizer | Advisor | Users | Settings => false,
        },
        Role::Accountant => match view {
            Dashboard | Finance | Forecast | Optimizer | Calendar => true,
            Animals | Tasks | Feed | Health | Advisor | Users | Settings => false,
        },
        Role::Unassigned => false,
    }
}

/// Views `role` may see, in declaration order.
pub fn permitted_views(role: Role) -> Vec<View> {
    View::ALL
        .iter()
        .copied()
        .filter(|view| is_permitted(role, *view))
        .collect()
}

/// First permitted view, used as the landing view after sign-in.
pub fn landing_view(role: Role) -> Option<View> {
    View::ALL.iter().copied().find(|view| is_permitted(role, *view))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: [Role; 6] = [
        Role::Admin,
        Role::Manager,
        Role::Veterinarian,
        Role::Worker,
        Role::Accountant,
        Role::Unassigned,
    ];

    #[test]
    fn test_unassigned_sees_nothing() {
        for view in View::ALL {
            assert!(!is_permitted(Role::Unassigned, view), "{:?}", view);
        }
        assert!(permitted_views(Role::Unassigned).is_empty());
        assert_eq!(landing_view(Role::Unassigned), None);
    }

    #[test]
    fn test_admin_sees_everything() {
        assert_eq!(permitted_views(Role::Admin), View::ALL.to_vec());
    }

    #[test]
    fn test_every_known_role_has_dashboard() {
        for role in ROLES.iter().filter(|r| **r != Role::Unassigned) {
            assert!(is_permitted(*role, View::Dashboard), "{:?}", role);
            assert_eq!(landing_view(*role), Some(View::Dashboard));
        }
    }

    #[test]
    fn test_only_admin_manages_users() {
        for role in ROLES {
            assert_eq!(is_permitted(role, View::Users), role == Role::Admin);
        }
    }

    #[test]
    fn test_accountant_cannot_see_herd() {
        assert!(is_permitted(Role::Accountant, View::Finance));
        assert!(!is_permitted(Role::Accountant, View::Animals));
        assert!(!is_permitted(Role::Accountant, View::Health));
    }

    #[test]
    fn test_unknown_stored_role_fails_closed() {
        let role: Role = serde_json::from_str("\"superuser\"").unwrap();
        assert!(permitted_views(role).is_empty());
    }
}
