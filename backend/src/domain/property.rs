//! User property document model.
//!
//! Properties live in the document store under a caller-supplied user
//! identifier. The identifier is deliberately not validated against the
//! user registry: the two stores have independent lifecycles and may be
//! eventually consistent with each other.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Auxiliary free-text attributes stored per user identifier.
///
/// At most one record exists per `user_id`; writes are upserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProperty {
    /// Caller-supplied identifier of the user the record belongs to.
    #[schema(example = "42")]
    pub user_id: String,
    /// Home address of the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Organisation the user belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<String>,
    /// User's favourite colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favourite_colour: Option<String>,
}
