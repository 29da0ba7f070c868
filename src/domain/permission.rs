//! Bitmask permission model used to gate privileged operations client-side.
//!
//! The server stores a user's grants as a single integer where each
//! [`PermissionNode`] owns one bit. The client never computes grants, it only
//! checks them before offering or issuing privileged calls.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::types::TypeConstraintError;

macro_rules! permission_nodes {
    ($($variant:ident = $bit:literal => $desc:literal),+ $(,)?) => {
        /// A single grantable capability; the discriminant is its bit.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u64)]
        pub enum PermissionNode {
            $($variant = 1u64 << $bit),+
        }

        impl PermissionNode {
            /// Every node in bit order.
            pub const ALL: &'static [PermissionNode] = &[$(PermissionNode::$variant),+];

            /// Stable identifier used in permission edit requests.
            pub const fn name(self) -> &'static str {
                match self {
                    $(PermissionNode::$variant => stringify!($variant)),+
                }
            }

            /// Short human description of what the node unlocks.
            pub const fn description(self) -> &'static str {
                match self {
                    $(PermissionNode::$variant => $desc),+
                }
            }
        }

        impl FromStr for PermissionNode {
            type Err = TypeConstraintError;

            fn from_str(name: &str) -> Result<Self, Self::Err> {
                match name {
                    $(stringify!($variant) => Ok(PermissionNode::$variant),)+
                    _ => Err(TypeConstraintError::InvalidValue(format!(
                        "unknown permission node `{name}`"
                    ))),
                }
            }
        }
    };
}

permission_nodes! {
    AdminEntry = 0 => "show the administration entry",
    UserShowList = 1 => "view the user list",
    UserGetProfile = 2 => "view user details",
    UserSetPassword = 3 => "set user passwords",
    UserEditBaseInfo = 4 => "edit user base information",
    UserEditPermission = 5 => "edit user permissions",
    ControllerShowList = 6 => "view the controller list",
    ControllerTier2Rating = 7 => "edit controller tier-2 rating",
    ControllerEditRating = 8 => "edit controller rating",
    ControllerShowRecord = 9 => "view controller records",
    ControllerCreateRecord = 10 => "create controller records",
    ControllerDeleteRecord = 11 => "delete controller records",
    ControllerChangeUnderMonitor = 12 => "change controller under-monitor state",
    ControllerChangeSolo = 13 => "change controller solo state",
    ControllerChangeGuest = 14 => "change controller guest state",
    ActivityPublish = 15 => "publish activities",
    ActivityShowList = 16 => "view the activity list",
    ActivityEdit = 17 => "edit activities",
    ActivityEditState = 18 => "edit activity status",
    ActivityEditPilotState = 19 => "edit activity pilot status",
    ActivityDelete = 20 => "delete activities",
    AuditLogShow = 21 => "view audit logs",
    TicketShowList = 22 => "view the ticket list",
    TicketReply = 23 => "reply to tickets",
    TicketRemove = 24 => "delete tickets",
    FlightPlanShowList = 25 => "view the flight plan list",
    FlightPlanChangeLock = 26 => "lock or unlock flight plans",
    FlightPlanDelete = 27 => "delete flight plans",
    ClientManagerEntry = 28 => "open the online client manager",
    ClientSendMessage = 29 => "send messages to clients",
    ClientKill = 30 => "kick clients from the server",
    ClientSendBroadcastMessage = 31 => "send broadcast messages",
}

impl PermissionNode {
    /// The bit this node occupies in a permission mask.
    pub const fn bit(self) -> u64 {
        self as u64
    }
}

impl Display for PermissionNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of [`Permission::records`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PermissionRecord {
    pub name: &'static str,
    pub desc: &'static str,
    pub granted: bool,
    #[serde(skip)]
    pub node: PermissionNode,
}

/// A user's granted permission mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(u64);

impl Permission {
    pub const fn new(mask: u64) -> Self {
        Self(mask)
    }

    /// Mask with every node granted.
    pub fn all() -> Self {
        Self(PermissionNode::ALL.iter().fold(0, |mask, node| mask | node.bit()))
    }

    /// Raw mask as stored by the server.
    pub const fn mask(self) -> u64 {
        self.0
    }

    pub const fn has_permission(self, node: PermissionNode) -> bool {
        self.0 & node.bit() == node.bit()
    }

    /// True when at least one of `nodes` is granted; an empty list grants nothing.
    pub fn has_any_permissions(self, nodes: &[PermissionNode]) -> bool {
        nodes.iter().any(|node| self.has_permission(*node))
    }

    /// True when every one of `nodes` is granted; an empty list is vacuously granted.
    pub fn has_permissions(self, nodes: &[PermissionNode]) -> bool {
        nodes.iter().all(|node| self.has_permission(*node))
    }

    /// Looks the node up by name; unknown names are never granted.
    pub fn has_permission_str(self, name: &str) -> bool {
        name.parse::<PermissionNode>()
            .map(|node| self.has_permission(node))
            .unwrap_or(false)
    }

    #[must_use]
    pub const fn grant(self, node: PermissionNode) -> Self {
        Self(self.0 | node.bit())
    }

    #[must_use]
    pub const fn revoke(self, node: PermissionNode) -> Self {
        Self(self.0 & !node.bit())
    }

    /// Grant state of every node, in bit order.
    pub fn records(self) -> Vec<PermissionRecord> {
        PermissionNode::ALL
            .iter()
            .map(|&node| PermissionRecord {
                name: node.name(),
                desc: node.description(),
                granted: self.has_permission(node),
                node,
            })
            .collect()
    }

    /// Nodes whose grant differs between `self` and `target`, keyed by name.
    ///
    /// This is the body the server expects when a user's permissions are edited.
    pub fn diff(self, target: Permission) -> BTreeMap<String, bool> {
        PermissionNode::ALL
            .iter()
            .filter(|&&node| self.has_permission(node) != target.has_permission(node))
            .map(|&node| (node.name().to_string(), target.has_permission(node)))
            .collect()
    }
}

impl From<u64> for Permission {
    fn from(mask: u64) -> Self {
        Self(mask)
    }
}

impl FromIterator<PermissionNode> for Permission {
    fn from_iter<I: IntoIterator<Item = PermissionNode>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Permission::default(), |permission, node| permission.grant(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_occupy_consecutive_bits() {
        assert_eq!(PermissionNode::ALL.len(), 32);
        for (index, node) in PermissionNode::ALL.iter().enumerate() {
            assert_eq!(node.bit(), 1u64 << index, "{node}");
        }
        assert_eq!(PermissionNode::ClientSendBroadcastMessage.bit(), 1u64 << 31);
    }

    #[test]
    fn every_node_is_checked_independently() {
        for &node in PermissionNode::ALL {
            let only = Permission::new(node.bit());
            for &other in PermissionNode::ALL {
                assert_eq!(only.has_permission(other), node == other);
            }
        }
    }

    #[test]
    fn any_and_all_semantics() {
        let permission: Permission = [PermissionNode::TicketShowList, PermissionNode::TicketReply]
            .into_iter()
            .collect();

        assert!(permission.has_any_permissions(&[
            PermissionNode::TicketRemove,
            PermissionNode::TicketReply
        ]));
        assert!(!permission.has_any_permissions(&[]));
        assert!(permission.has_permissions(&[]));
        assert!(permission.has_permissions(&[
            PermissionNode::TicketShowList,
            PermissionNode::TicketReply
        ]));
        assert!(!permission.has_permissions(&[
            PermissionNode::TicketShowList,
            PermissionNode::TicketRemove
        ]));
    }

    #[test]
    fn string_lookup_rejects_unknown_names() {
        let permission = Permission::new(PermissionNode::AuditLogShow.bit());
        assert!(permission.has_permission_str("AuditLogShow"));
        assert!(!permission.has_permission_str("AdminEntry"));
        assert!(!permission.has_permission_str("auditlogshow"));
        assert!(!permission.has_permission_str("NoSuchNode"));
    }

    #[test]
    fn higher_bits_do_not_leak_into_checks() {
        let permission = Permission::new(1u64 << 40);
        assert!(PermissionNode::ALL.iter().all(|node| !permission.has_permission(*node)));
    }

    #[test]
    fn records_follow_bit_order() {
        let records = Permission::new(0b101).records();
        assert_eq!(records.len(), 32);
        assert_eq!(records[0].name, "AdminEntry");
        assert!(records[0].granted);
        assert!(!records[1].granted);
        assert!(records[2].granted);
    }

    #[test]
    fn diff_lists_only_changed_nodes() {
        let current = Permission::new(0).grant(PermissionNode::AdminEntry);
        let target = current
            .revoke(PermissionNode::AdminEntry)
            .grant(PermissionNode::ClientKill);

        let diff = current.diff(target);

        assert_eq!(diff.len(), 2);
        assert_eq!(diff.get("AdminEntry"), Some(&false));
        assert_eq!(diff.get("ClientKill"), Some(&true));
    }

    #[test]
    fn all_covers_the_low_32_bits() {
        assert_eq!(Permission::all().mask(), u32::MAX as u64);
    }
}
