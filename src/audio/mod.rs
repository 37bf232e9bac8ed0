pub mod decode;
pub mod signal;

pub use signal::AudioSignal;
