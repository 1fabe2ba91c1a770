//! Collaborators that touch the outside world: files, subprocesses and the
//! terminal.

pub mod dictionary;
pub mod doctor;
pub mod journal;
pub mod sandbox;
pub mod session;
