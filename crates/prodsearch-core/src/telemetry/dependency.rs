use std::fmt;
use std::str::FromStr;

use crate::error::ProdSearchError;

/// Kind of call made to the search cluster (`op` label).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EsOperation {
    Search,
    Get,
    Index,
    Bulk,
    Delete,
    Count,
    HealthCheck,
}

impl EsOperation {
    pub const ALL: [EsOperation; 7] = [
        EsOperation::Search,
        EsOperation::Get,
        EsOperation::Index,
        EsOperation::Bulk,
        EsOperation::Delete,
        EsOperation::Count,
        EsOperation::HealthCheck,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EsOperation::Search => "search",
            EsOperation::Get => "get",
            EsOperation::Index => "index",
            EsOperation::Bulk => "bulk",
            EsOperation::Delete => "delete",
            EsOperation::Count => "count",
            EsOperation::HealthCheck => "health_check",
        }
    }
}

impl fmt::Display for EsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EsOperation {
    type Err = ProdSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EsOperation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ProdSearchError::UnknownLabelValue(format!("es operation {s:?}")))
    }
}

/// Outcome of a call to the search cluster (`status` label).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallStatus {
    Ok,
    Error,
    Timeout,
}

impl CallStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CallStatus::Ok => "ok",
            CallStatus::Error => "error",
            CallStatus::Timeout => "timeout",
        }
    }

    /// `Ok` for `Ok(_)`, `Error` otherwise.
    pub fn of<T, E>(res: &Result<T, E>) -> Self {
        if res.is_ok() {
            CallStatus::Ok
        } else {
            CallStatus::Error
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallStatus {
    type Err = ProdSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(CallStatus::Ok),
            "error" => Ok(CallStatus::Error),
            "timeout" => Ok(CallStatus::Timeout),
            other => Err(ProdSearchError::UnknownLabelValue(format!(
                "call status {other:?}"
            ))),
        }
    }
}
