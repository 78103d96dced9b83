use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptType {
    #[serde(rename = "CMD")]
    Cmd,
    PowerShell,
    Python,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoftwareUpdateMode {
    All,
    Specific,
}

/// Three independent toggles; any combination is allowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowsUpdateScope {
    pub security_updates: bool,
    pub feature_updates: bool,
    pub driver_updates: bool,
}

/// The type-specific payload of a procedure. A closed variant set: changing
/// the kind replaces the payload wholesale, so fields of a previous kind
/// cannot linger in storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "procedureSystemType")]
pub enum ProcedureKind {
    #[serde(rename_all = "camelCase")]
    CustomScript {
        script_type: ScriptType,
        script_content: String,
        run_as_user: bool,
    },
    #[serde(rename_all = "camelCase")]
    WindowsUpdate { scope: WindowsUpdateScope },
    #[serde(rename_all = "camelCase")]
    SoftwareUpdate {
        mode: SoftwareUpdateMode,
        /// Comma-separated package list; only meaningful when mode is
        /// `specific`, cleared to "" otherwise.
        specific_software: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub kind: ProcedureKind,
    // Derived from `kind` by the script compiler on every create/update.
    pub script_type: ScriptType,
    pub script_content: String,
    pub run_as_user: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
