mod car;
mod customer;
mod lease;
mod owner;

pub use self::{car::*, customer::*, lease::*, owner::*};
