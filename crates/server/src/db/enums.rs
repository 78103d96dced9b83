use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComputerStatus {
    Online,
    Offline,
    Error,
}

impl FromStr for ComputerStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONLINE" => Ok(ComputerStatus::Online),
            "OFFLINE" => Ok(ComputerStatus::Offline),
            "ERROR" => Ok(ComputerStatus::Error),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ComputerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcedureExecutionStatus {
    Pending,
    Running,
    Success,
    Failed,
    Cancelled,
}

impl ProcedureExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcedureExecutionStatus::Success
                | ProcedureExecutionStatus::Failed
                | ProcedureExecutionStatus::Cancelled
        )
    }
}

impl FromStr for ProcedureExecutionStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ProcedureExecutionStatus::Pending),
            "RUNNING" => Ok(ProcedureExecutionStatus::Running),
            "SUCCESS" => Ok(ProcedureExecutionStatus::Success),
            "FAILED" => Ok(ProcedureExecutionStatus::Failed),
            "CANCELLED" => Ok(ProcedureExecutionStatus::Cancelled),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ProcedureExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomCommandStatus {
    Pending,
    Sent,
    Success,
    Failed,
}

impl CustomCommandStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CustomCommandStatus::Success | CustomCommandStatus::Failed)
    }
}

impl FromStr for CustomCommandStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(CustomCommandStatus::Pending),
            "SENT" => Ok(CustomCommandStatus::Sent),
            "SUCCESS" => Ok(CustomCommandStatus::Success),
            "FAILED" => Ok(CustomCommandStatus::Failed),
            _ => Err(()),
        }
    }
}

impl fmt::Display for CustomCommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemLicenseStatus {
    Valid,
    Expired,
    ExceededLimit,
    NotActivated,
}

impl FromStr for SystemLicenseStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VALID" => Ok(SystemLicenseStatus::Valid),
            "EXPIRED" => Ok(SystemLicenseStatus::Expired),
            "EXCEEDED_LIMIT" => Ok(SystemLicenseStatus::ExceededLimit),
            "NOT_ACTIVATED" => Ok(SystemLicenseStatus::NotActivated),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SystemLicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
