use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    pub mobile: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub mobile: Option<String>,
}

/// Bank login used to open a connection. Creating one starts a job on the
/// server.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConnection {
    pub login_id: String,
    pub password: String,
    pub institution: Institution,
}

impl fmt::Debug for NewConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewConnection")
            .field("login_id", &self.login_id)
            .field("password", &"<redacted>")
            .field("institution", &self.institution)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Institution {
    pub id: String,
}
