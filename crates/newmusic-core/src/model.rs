//! Wire types shared by the client, the session store and the CLI.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::tokens::{AccessToken, RefreshToken};

/// Role of a back-office user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Perfil {
    Administrador,
    Professor,
    Funcionario,
}

impl Perfil {
    /// Returns the wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Perfil::Administrador => "ADMINISTRADOR",
            Perfil::Professor => "PROFESSOR",
            Perfil::Funcionario => "FUNCIONARIO",
        }
    }
}

impl fmt::Display for Perfil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed-in user, as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub nome: String,
    pub perfil: Perfil,
    #[serde(default)]
    pub professor_id: Option<i64>,
}

impl AuthUser {
    /// Check if the user's role is one of `allowed`.
    pub fn has_any_role(&self, allowed: &[Perfil]) -> bool {
        allowed.contains(&self.perfil)
    }
}

/// Response body of `auth/login`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub id: i64,
    pub email: String,
    pub nome: String,
    pub perfil: Perfil,
    #[serde(default)]
    pub professor_id: Option<i64>,
}

impl LoginResponse {
    /// Split the response into the user and the token pair.
    pub fn into_parts(self) -> (AuthUser, TokenPair) {
        let user = AuthUser {
            id: self.id,
            email: self.email,
            nome: self.nome,
            perfil: self.perfil,
            professor_id: self.professor_id,
        };
        let tokens = TokenPair {
            access_token: AccessToken::new(self.access_token),
            refresh_token: RefreshToken::new(self.refresh_token),
        };
        (user, tokens)
    }
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("perfil", &self.perfil)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

/// Error body produced by the backend's exception handler.
///
/// `erros` is only filled for field validation failures. Entries without a
/// string message are dropped so that `mensagem` is never lost to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub mensagem: Option<String>,
    #[serde(default, deserialize_with = "lenient_field_errors")]
    pub erros: BTreeMap<String, String>,
}

fn lenient_field_errors<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Object(fields)) = value else {
        return Ok(BTreeMap::new());
    };

    Ok(fields
        .into_iter()
        .filter_map(|(field, message)| match message {
            serde_json::Value::String(message) => Some((field, message)),
            _ => None,
        })
        .collect())
}
