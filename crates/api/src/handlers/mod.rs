pub mod feedback;
pub mod message;
pub mod participant;
pub mod session;
