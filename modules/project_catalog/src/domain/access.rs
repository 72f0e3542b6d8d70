//! Access policy
//!
//! Catalog entities (tags, applications, tools, software) are world-readable
//! and staff-writable. Projects are visible only to their owner; staff get no
//! bypass.

use crate::contract::{Actor, CatalogError, Principal};

/// Require any authenticated caller
pub fn require_authenticated(principal: &Principal) -> Result<Actor, CatalogError> {
    match principal {
        Principal::Anonymous => Err(CatalogError::Unauthenticated),
        Principal::Authenticated(actor) => Ok(*actor),
    }
}

/// Require a staff caller for catalog writes
///
/// Anonymous callers get `Unauthenticated`, authenticated non-staff get
/// `Forbidden`.
pub fn require_catalog_writer(principal: &Principal) -> Result<Actor, CatalogError> {
    let actor = require_authenticated(principal)?;
    if !actor.is_staff {
        return Err(CatalogError::Forbidden);
    }
    Ok(actor)
}

/// Resolve the owner id every project query is scoped to
pub fn project_scope(principal: &Principal) -> Result<i32, CatalogError> {
    require_authenticated(principal).map(|actor| actor.user_id)
}

/// Deleting a user is allowed to staff and to the user themself
pub fn require_user_admin(principal: &Principal, user_id: i32) -> Result<Actor, CatalogError> {
    let actor = require_authenticated(principal)?;
    if actor.is_staff || actor.user_id == user_id {
        Ok(actor)
    } else {
        Err(CatalogError::Forbidden)
    }
}
