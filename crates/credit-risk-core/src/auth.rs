//! Demo credential table and password verification.
//!
//! The broader system only needs a `{username, role}` pair per call; the
//! components stay stateless and the caller owns the session. Passwords are
//! stored as SHA-256 hex digests. Replace the demo table before any real
//! deployment.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::CreditRiskError;
use crate::CreditRiskResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Analyst,
    Cro,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Analyst => "analyst",
            Role::Cro => "cro",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CreditRiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "analyst" => Ok(Role::Analyst),
            "cro" => Ok(Role::Cro),
            _ => Err(CreditRiskError::InvalidCredentials),
        }
    }
}

/// The session handle a successful sign-in produces. Passed by the caller
/// into anything that tags results with user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

struct Credential {
    username: &'static str,
    display_name: &'static str,
    password_sha256: &'static str,
    role: Role,
}

// Demo accounts: analyst/analyst123, cro/cro123.
const DEMO_USERS: [Credential; 2] = [
    Credential {
        username: "analyst",
        display_name: "Analyst",
        password_sha256: "20249749412d73a3f5799f6f1dcf910e7b4aa3ce4de133b1f8a63c044792a4e9",
        role: Role::Analyst,
    },
    Credential {
        username: "cro",
        display_name: "CRO",
        password_sha256: "5521e0ded58fd0636d8e0d4e8af32bd76255f904c075d3bf24f776f64a62f215",
        role: Role::Cro,
    },
];

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Check a username/password pair against the credential table.
pub fn authenticate(username: &str, password: &str) -> CreditRiskResult<AuthenticatedUser> {
    let candidate = DEMO_USERS
        .iter()
        .find(|c| c.username == username)
        .ok_or(CreditRiskError::InvalidCredentials)?;
    if sha256_hex(password) != candidate.password_sha256 {
        return Err(CreditRiskError::InvalidCredentials);
    }
    Ok(AuthenticatedUser {
        username: candidate.username.to_string(),
        display_name: candidate.display_name.to_string(),
        role: candidate.role,
    })
}
