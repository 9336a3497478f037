//! Infrastructure layer.

pub mod collaborator;
pub mod database;

pub use self::{
    collaborator::{Collaborator, Tables},
    database::{Database, Memory},
};
