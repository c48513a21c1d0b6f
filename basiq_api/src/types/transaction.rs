use serde::{Deserialize, Serialize};

use super::null_as_default;

/// A single bank transaction. Only the fields used for spending summaries
/// are decoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Signed decimal, string encoded by the API.
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub sub_class: SubClass,
}

impl Transaction {
    pub fn category_code(&self) -> &str {
        &self.sub_class.code
    }

    pub fn category_title(&self) -> &str {
        &self.sub_class.title
    }
}

/// Spending category a transaction was classified into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubClass {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionList {
    #[serde(rename = "type", default)]
    pub list_type: String,

    #[serde(default)]
    pub count: i64,

    #[serde(default)]
    pub size: i64,

    #[serde(default)]
    pub data: Vec<Transaction>,
}
