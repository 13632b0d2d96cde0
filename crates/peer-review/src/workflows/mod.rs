pub mod canvas;
pub mod peer_review;
