pub mod enums;
pub mod examination;
pub mod feedback;
pub mod patient;
pub mod payment;
pub mod prescription;
pub mod profile;
pub mod queue;
pub mod stock;

pub use examination::*;
pub use feedback::*;
pub use patient::*;
pub use payment::*;
pub use prescription::*;
pub use profile::*;
pub use queue::*;
pub use stock::*;
