use indexmap::IndexMap;
use serde::Deserialize;

/// Decoded body of a save endpoint reply.
///
/// Every field except `success` is optional on the wire; absent fields
/// deserialize to their defaults so callers never branch on presence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SaveResult {
    pub success: bool,
    pub error: Option<String>,
    pub errors: Vec<ErrorEntry>,
    /// Region name -> replacement text, scoped to the saved widget.
    #[serde(rename = "updateMap")]
    pub update_map: IndexMap<String, String>,
    pub tooltip: Option<String>,
    /// Role handed back after a removal so it can rejoin the add list.
    #[serde(rename = "currentRole")]
    pub current_role: Option<String>,
    /// Display text for chips created by a role addition.
    #[serde(rename = "newProjectRolesNodes")]
    pub new_role_nodes: Vec<String>,
    /// Roles granted by an addition, to prune from the add list.
    #[serde(rename = "currentProjectRole")]
    pub granted_roles: Vec<String>,
    #[serde(rename = "additionalData")]
    pub additional_data: Option<serde_json::Value>,
}

impl SaveResult {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEntry {
    pub message: String,
}

const UNKNOWN_ERROR: &str = "An unknown error occurred.";

/// What a settled save means for the widget that issued it.
///
/// Exactly one case applies per settlement; there is no retry path.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    /// 2xx and `success: true`.
    Saved(SaveResult),
    /// 2xx and `success: false` with a single message.
    Rejected { message: String },
    /// 2xx and a structured `errors` list.
    RejectedMany { messages: Vec<String> },
    /// Transport failure, HTTP error status, or an undecodable body.
    Failed { title: String, detail: String },
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    pub fn classify(result: SaveResult) -> Self {
        if result.success {
            return Self::Saved(result);
        }
        if let Some(message) = result.error {
            return Self::Rejected { message };
        }
        if !result.errors.is_empty() {
            return Self::RejectedMany {
                messages: result.errors.into_iter().map(|e| e.message).collect(),
            };
        }
        Self::Rejected {
            message: UNKNOWN_ERROR.to_string(),
        }
    }

    /// Decode a 2xx reply body.
    ///
    /// `lenient` marks endpoints that answer with an empty or non-JSON body;
    /// for those any 2xx counts as a success.
    pub fn decode_body(body: &str, lenient: bool) -> Self {
        match serde_json::from_str::<SaveResult>(body) {
            Ok(result) => Self::classify(result),
            Err(_) if lenient => Self::Saved(SaveResult::succeeded()),
            Err(err) => Self::Failed {
                title: "parsererror occurred while processing the data".to_string(),
                detail: format!("Reason: {err}"),
            },
        }
    }
}
