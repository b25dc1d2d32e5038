use serde::{Deserialize, Serialize};

/// The closed catalog of method names that may appear on the wire, plus an
/// `Unknown` sentinel so the codec round-trips methods this build doesn't
/// know about yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InteractiveMethod {
    Capture,
    CreateControls,
    CreateGroups,
    CreateScenes,
    DeleteControls,
    DeleteGroup,
    DeleteScene,
    GetActiveParticipants,
    GetAllParticipants,
    GetGroups,
    GetMemoryStats,
    GetScenes,
    GetThrottleState,
    GetTime,
    GiveInput,
    Hello,
    IssueMemoryWarning,
    OnControlCreate,
    OnControlDelete,
    OnControlUpdate,
    OnGroupCreate,
    OnGroupDelete,
    OnGroupUpdate,
    OnParticipantJoin,
    OnParticipantLeave,
    OnParticipantUpdate,
    OnReady,
    OnSceneCreate,
    OnSceneDelete,
    OnSceneUpdate,
    Ready,
    SetBandwidthThrottle,
    SetCompression,
    UpdateControls,
    UpdateGroups,
    UpdateParticipants,
    UpdateScenes,
    /// Forward-compatible fallback for any wire string this build does not
    /// recognize, carrying the original string so the frame still round-trips.
    Unknown(String),
}

impl InteractiveMethod {
    /// The wire string for this method.
    pub fn as_wire_str(&self) -> &str {
        match self {
            Self::Capture => "capture",
            Self::CreateControls => "createControls",
            Self::CreateGroups => "createGroups",
            Self::CreateScenes => "createScenes",
            Self::DeleteControls => "deleteControls",
            Self::DeleteGroup => "deleteGroup",
            Self::DeleteScene => "deleteScene",
            Self::GetActiveParticipants => "getActiveParticipants",
            Self::GetAllParticipants => "getAllParticipants",
            Self::GetGroups => "getGroups",
            Self::GetMemoryStats => "getMemoryStats",
            Self::GetScenes => "getScenes",
            Self::GetThrottleState => "getThrottleState",
            Self::GetTime => "getTime",
            Self::GiveInput => "giveInput",
            Self::Hello => "hello",
            Self::IssueMemoryWarning => "issueMemoryWarning",
            Self::OnControlCreate => "onControlCreate",
            Self::OnControlDelete => "onControlDelete",
            Self::OnControlUpdate => "onControlUpdate",
            Self::OnGroupCreate => "onGroupCreate",
            Self::OnGroupDelete => "onGroupDelete",
            Self::OnGroupUpdate => "onGroupUpdate",
            Self::OnParticipantJoin => "onParticipantJoin",
            Self::OnParticipantLeave => "onParticipantLeave",
            Self::OnParticipantUpdate => "onParticipantUpdate",
            Self::OnReady => "onReady",
            Self::OnSceneCreate => "onSceneCreate",
            Self::OnSceneDelete => "onSceneDelete",
            Self::OnSceneUpdate => "onSceneUpdate",
            Self::Ready => "ready",
            Self::SetBandwidthThrottle => "setBandwidthThrottle",
            Self::SetCompression => "setCompression",
            Self::UpdateControls => "updateControls",
            Self::UpdateGroups => "updateGroups",
            Self::UpdateParticipants => "updateParticipants",
            Self::UpdateScenes => "updateScenes",
            Self::Unknown(raw) => raw,
        }
    }

    /// Parses a wire string, falling back to `Unknown` rather than failing.
    pub fn from_wire_str(raw: &str) -> Self {
        match raw {
            "capture" => Self::Capture,
            "createControls" => Self::CreateControls,
            "createGroups" => Self::CreateGroups,
            "createScenes" => Self::CreateScenes,
            "deleteControls" => Self::DeleteControls,
            "deleteGroup" => Self::DeleteGroup,
            "deleteScene" => Self::DeleteScene,
            "getActiveParticipants" => Self::GetActiveParticipants,
            "getAllParticipants" => Self::GetAllParticipants,
            "getGroups" => Self::GetGroups,
            "getMemoryStats" => Self::GetMemoryStats,
            "getScenes" => Self::GetScenes,
            "getThrottleState" => Self::GetThrottleState,
            "getTime" => Self::GetTime,
            "giveInput" => Self::GiveInput,
            "hello" => Self::Hello,
            "issueMemoryWarning" => Self::IssueMemoryWarning,
            "onControlCreate" => Self::OnControlCreate,
            "onControlDelete" => Self::OnControlDelete,
            "onControlUpdate" => Self::OnControlUpdate,
            "onGroupCreate" => Self::OnGroupCreate,
            "onGroupDelete" => Self::OnGroupDelete,
            "onGroupUpdate" => Self::OnGroupUpdate,
            "onParticipantJoin" => Self::OnParticipantJoin,
            "onParticipantLeave" => Self::OnParticipantLeave,
            "onParticipantUpdate" => Self::OnParticipantUpdate,
            "onReady" => Self::OnReady,
            "onSceneCreate" => Self::OnSceneCreate,
            "onSceneDelete" => Self::OnSceneDelete,
            "onSceneUpdate" => Self::OnSceneUpdate,
            "ready" => Self::Ready,
            "setBandwidthThrottle" => Self::SetBandwidthThrottle,
            "setCompression" => Self::SetCompression,
            "updateControls" => Self::UpdateControls,
            "updateGroups" => Self::UpdateGroups,
            "updateParticipants" => Self::UpdateParticipants,
            "updateScenes" => Self::UpdateScenes,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether this method name denotes a server-pushed event rather than a
    /// request/reply RPC (the `onXxx` family, plus `giveInput` and
    /// `issueMemoryWarning`).
    pub fn is_inbound_event(&self) -> bool {
        matches!(
            self,
            Self::OnReady
                | Self::OnParticipantJoin
                | Self::OnParticipantLeave
                | Self::OnParticipantUpdate
                | Self::OnGroupCreate
                | Self::OnGroupDelete
                | Self::OnGroupUpdate
                | Self::OnSceneCreate
                | Self::OnSceneDelete
                | Self::OnSceneUpdate
                | Self::OnControlCreate
                | Self::OnControlDelete
                | Self::OnControlUpdate
                | Self::GiveInput
                | Self::IssueMemoryWarning
        )
    }
}

impl Serialize for InteractiveMethod {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_wire_str())
    }
}

impl<'de> Deserialize<'de> for InteractiveMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire_str(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_method_round_trips() {
        let method = InteractiveMethod::CreateScenes;
        let json = serde_json::to_string(&method).unwrap();
        assert_eq!(json, "\"createScenes\"");
        let back: InteractiveMethod = serde_json::from_str(&json).unwrap();
        assert_eq!(back, method);
    }

    #[test]
    fn unknown_method_round_trips_via_raw_string() {
        let method = InteractiveMethod::from_wire_str("futureMethod");
        assert_eq!(method, InteractiveMethod::Unknown("futureMethod".into()));
        let json = serde_json::to_string(&method).unwrap();
        assert_eq!(json, "\"futureMethod\"");
    }

    #[test]
    fn event_methods_are_classified() {
        assert!(InteractiveMethod::OnSceneCreate.is_inbound_event());
        assert!(InteractiveMethod::GiveInput.is_inbound_event());
        assert!(!InteractiveMethod::CreateScenes.is_inbound_event());
    }
}
