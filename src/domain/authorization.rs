//! Position-close authorization gate.
//!
//! A fixed allow-list of callers, captured at construction. There is no
//! way to add or remove members afterwards; a changed list means a new
//! adapter instance.

use std::collections::BTreeSet;

use alloy::primitives::Address;

use crate::error::AdapterError;

/// Immutable set of addresses allowed to invoke a guarded operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationSet {
    members: BTreeSet<Address>,
}

impl AuthorizationSet {
    /// Captures the allow-list. Duplicates collapse.
    pub fn new(members: impl IntoIterator<Item = Address>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    /// Pure membership predicate.
    pub fn contains(&self, caller: Address) -> bool {
        self.members.contains(&caller)
    }

    /// Fails with `AdapterError::Unauthorized` unless `caller` is a member.
    pub fn ensure(&self, caller: Address) -> Result<(), AdapterError> {
        if self.contains(caller) {
            Ok(())
        } else {
            Err(AdapterError::Unauthorized(caller))
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }
}

impl FromIterator<Address> for AuthorizationSet {
    fn from_iter<T: IntoIterator<Item = Address>>(iter: T) -> Self {
        Self::new(iter)
    }
}
