pub mod handoff;
pub mod wizard;

pub use handoff::{EphemeralStore, MemoryStore, SessionHandoff, HANDOFF_KEY};
pub use wizard::{EnhancerState, OutlinerState, Wizard, WizardState};
