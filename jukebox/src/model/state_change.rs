/// Payload of the status broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChanged {
    pub is_playing: bool,
}
