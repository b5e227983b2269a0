use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuadrantError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Rank {rank} is not valid in a group of size {size}")]
    InvalidRank { rank: usize, size: usize },

    #[error("Peer rank {peer} disconnected")]
    PeerDisconnected { peer: usize },

    #[error("Message from rank {peer} has length {got}, expected {expected}")]
    LengthMismatch {
        peer: usize,
        expected: usize,
        got: usize,
    },

    #[error("Timed out waiting for tag {tag} from rank {peer}")]
    Timeout { peer: usize, tag: u32 },

    #[error("Worker for rank {rank} panicked")]
    WorkerPanicked { rank: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type QuadrantResult<T> = Result<T, QuadrantError>;
