// Adapters layer: concrete implementations of the domain ports (http, terminal ui, speech).

pub mod console;
pub mod http;
pub mod recognizer;
