// Adapters layer: concrete implementations for the external systems (Plex, Firebase).

pub mod firebase;
pub mod plex;
