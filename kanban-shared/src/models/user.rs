/// User model and payloads
///
/// Users are the people tasks get assigned to. Email addresses are unique at
/// registration time; later patches may change them without a uniqueness
/// check.
///
/// # Stored Form
///
/// ```json
/// { "id": 1, "nome": "Ana Silva", "email": "ana@x.com" }
/// ```

use crate::store::Record;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned id
    pub id: i64,

    /// Display name
    pub nome: String,

    /// Email address, compared case-sensitively
    pub email: String,
}

/// Input for registering a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateUser {
    #[validate(custom(function = "crate::rules::validate_nome"))]
    pub nome: String,

    #[validate(custom(function = "crate::rules::validate_email"))]
    pub email: String,
}

/// Partial update of a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserPatch {
    /// Overwrites the provided fields of `user`
    pub fn apply(self, user: &mut User) {
        if let Some(nome) = self.nome {
            user.nome = nome;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
    }
}

impl Record for User {
    type Draft = CreateUser;

    const COLLECTION: &'static str = "users";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: CreateUser) -> Self {
        User {
            id,
            nome: draft.nome,
            email: draft.email,
        }
    }
}
