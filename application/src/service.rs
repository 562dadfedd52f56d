use std::fmt::Display;

use error_stack::Report;
use kernel::KernelError;

pub use self::{car::*, customer::*, lease::*, owner::*};

mod car;
mod customer;
mod lease;
mod owner;

pub(crate) trait OrNotFound<T> {
    fn or_not_found(self, entity: &str, id: impl Display) -> error_stack::Result<T, KernelError>;
}

impl<T> OrNotFound<T> for Option<T> {
    fn or_not_found(self, entity: &str, id: impl Display) -> error_stack::Result<T, KernelError> {
        self.ok_or_else(|| {
            Report::new(KernelError::NotFound).attach_printable(format!("{entity} {id} not found"))
        })
    }
}
