//! Effective-permission computation and operation gates (spec §4.8).
//! `Role` and `CollectionPermissionLevel` ordinals live on the domain types
//! themselves in `gst-core`; this crate only composes them.

use gst_core::{CollectionPermissionLevel, GstError, GstResult, Role};

/// `implicit_role_perm`: the floor every member of a role gets on any
/// collection with no explicit grant. Viewer has none.
fn implicit_role_perm(role: Role) -> Option<CollectionPermissionLevel> {
    match role {
        Role::Admin => Some(CollectionPermissionLevel::Owner),
        Role::Manager => Some(CollectionPermissionLevel::Editor),
        Role::Member | Role::Free => Some(CollectionPermissionLevel::Viewer),
        Role::Viewer => None,
    }
}

/// `admin` short-circuits to owner without a permission-repo lookup; every
/// other role's effective permission is `max(implicit, explicit)`, treating
/// a missing or errored explicit lookup as "no explicit perm".
pub fn effective_permission(
    role: Role,
    explicit: Option<CollectionPermissionLevel>,
) -> Option<CollectionPermissionLevel> {
    if role == Role::Admin {
        return Some(CollectionPermissionLevel::Owner);
    }
    match (implicit_role_perm(role), explicit) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn require(
    effective: Option<CollectionPermissionLevel>,
    min: CollectionPermissionLevel,
    collection_id: gst_core::CollectionId,
) -> GstResult<()> {
    match effective {
        Some(level) if level >= min => Ok(()),
        _ => Err(GstError::CollectionPermDenied {
            collection_id: collection_id.0,
        }),
    }
}

pub fn can_create_collection(role: Role) -> bool {
    role.ordinal() >= Role::Member.ordinal()
}

pub fn can_read(
    effective: Option<CollectionPermissionLevel>,
    collection_id: gst_core::CollectionId,
) -> GstResult<()> {
    require(effective, CollectionPermissionLevel::Viewer, collection_id)
}

pub fn can_edit(
    effective: Option<CollectionPermissionLevel>,
    collection_id: gst_core::CollectionId,
) -> GstResult<()> {
    require(effective, CollectionPermissionLevel::Editor, collection_id)
}

pub fn can_manage(
    effective: Option<CollectionPermissionLevel>,
    collection_id: gst_core::CollectionId,
) -> GstResult<()> {
    require(effective, CollectionPermissionLevel::Owner, collection_id)
}

pub fn check_not_self_removal(actor: gst_core::UserId, target: gst_core::UserId) -> GstResult<()> {
    if actor == target {
        return Err(GstError::SelfPermissionRemoval);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gst_core::CollectionPermissionLevel as Perm;

    #[test]
    fn admin_is_always_owner_without_explicit_grant() {
        assert_eq!(effective_permission(Role::Admin, None), Some(Perm::Owner));
    }

    #[test]
    fn manager_gets_editor_floor() {
        assert_eq!(effective_permission(Role::Manager, None), Some(Perm::Editor));
    }

    #[test]
    fn explicit_grant_wins_when_higher_than_implicit() {
        assert_eq!(
            effective_permission(Role::Member, Some(Perm::Owner)),
            Some(Perm::Owner)
        );
    }

    #[test]
    fn viewer_with_no_explicit_grant_has_no_access() {
        assert_eq!(effective_permission(Role::Viewer, None), None);
    }

    #[test]
    fn manager_bypasses_editor_gate_but_not_owner_gate() {
        let effective = effective_permission(Role::Manager, None);
        let collection_id = gst_core::CollectionId::new();
        assert!(can_edit(effective, collection_id).is_ok());
        assert!(can_manage(effective, collection_id).is_err());
    }

    #[test]
    fn self_removal_is_forbidden() {
        let user = gst_core::UserId::new();
        assert!(check_not_self_removal(user, user).is_err());
    }

    #[test]
    fn viewer_role_cannot_create_collection() {
        assert!(!can_create_collection(Role::Viewer));
        assert!(can_create_collection(Role::Member));
    }
}
