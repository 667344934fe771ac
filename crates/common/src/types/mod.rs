use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Acknowledgement body for successful writes.
#[derive(Serialize, Debug)]
pub struct Message {
    pub message: &'static str,
}
