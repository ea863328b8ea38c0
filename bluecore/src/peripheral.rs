use uuid::Uuid;

/// A backend-assigned handle identifying a remote peripheral.
///
/// Handles stay valid across connect/disconnect cycles for the lifetime of the
/// radio backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeripheralId(Uuid);

impl PeripheralId {
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for PeripheralId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PeripheralId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of a remote peripheral as reported by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeripheralInfo {
    pub id: PeripheralId,
    pub name: Option<String>,
}

/// The connection state of a remote peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeripheralState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}
