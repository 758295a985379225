pub mod account;
pub mod drone;

pub use account::{Account, AccountView};
pub use drone::{Drone, DroneAttributes, DroneRow, DroneSubmission, DroneView};
