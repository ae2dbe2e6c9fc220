pub mod config;
pub mod error;
pub mod event;
pub mod poller;
pub mod source;

pub use config::{HorizonConfig, StartLedger};
pub use error::HorizonError;
pub use event::HorizonEvent;
pub use poller::{EventHandler, HorizonPoller, LoggingEventHandler, PollReport};
pub use source::{EventSource, SimulatedEventSource};
