//! # Type Classifier
//!
//! Decides whether a credential's type is one the caller can handle.

use crate::credential::{Credential, CredentialType};

impl Credential {
    /// Whether the credential's type is known.
    ///
    /// - Undeterminable type: `false`.
    /// - With `supported_types`: strict membership.
    /// - Without: `true` unless the type is the `unknown` sentinel.
    pub fn is_known(&self, supported_types: Option<&[CredentialType]>) -> bool {
        let Some(credential_type) = self.credential_type() else {
            return false;
        };
        match supported_types {
            Some(supported) => supported.contains(&credential_type),
            None => !credential_type.is_unknown(),
        }
    }
}
