use uuid::Uuid;

/// A remote central that has connected to the local peripheral.
///
/// Centrals are identified by a backend-assigned UUID; the same central keeps
/// the same identifier across subscribe and request events for one session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Central {
    identifier: Uuid,
    maximum_update_value_length: usize,
}

impl Central {
    pub fn new(identifier: Uuid, maximum_update_value_length: usize) -> Self {
        Self {
            identifier,
            maximum_update_value_length,
        }
    }

    pub fn identifier(&self) -> Uuid {
        self.identifier
    }

    /// The maximum number of bytes the backend can deliver to this central in
    /// a single notification.
    pub fn maximum_update_value_length(&self) -> usize {
        self.maximum_update_value_length
    }
}
