mod color;
mod id;
mod make;
mod model;
mod status;

pub use self::{color::*, id::*, make::*, model::*, status::*};
use crate::entity::CarOwnerId;
use crate::KernelError;
use destructure::Destructure;
use error_stack::Report;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References, Destructure)]
pub struct Car {
    id: CarId,
    model: CarModel,
    make: CarMake,
    color: CarColor,
    status: CarStatus,
    owner_id: Option<CarOwnerId>,
}

impl Car {
    pub fn new(
        id: CarId,
        model: CarModel,
        make: CarMake,
        color: CarColor,
        status: CarStatus,
        owner_id: Option<CarOwnerId>,
    ) -> Self {
        Self {
            id,
            model,
            make,
            color,
            status,
            owner_id,
        }
    }

    /// Moves an idle car onto a lease.
    pub fn lease(&mut self) -> error_stack::Result<(), KernelError> {
        if !self.is_available() {
            return Err(Report::new(KernelError::StateConflict).attach_printable(format!(
                "car {} is {} and cannot be leased",
                self.id, self.status
            )));
        }
        self.status = CarStatus::OnLease;
        Ok(())
    }

    pub fn release(&mut self) {
        self.status = CarStatus::Idle;
    }

    /// Administrative status change.
    ///
    /// `ON_LEASE` is owned by the lease lifecycle: it can neither be set nor left from here.
    pub fn change_status(&mut self, status: CarStatus) -> error_stack::Result<(), KernelError> {
        if self.status == CarStatus::OnLease {
            return Err(Report::new(KernelError::StateConflict)
                .attach_printable(format!("car {} has an active lease", self.id)));
        }
        if status == CarStatus::OnLease {
            return Err(Report::new(KernelError::StateConflict)
                .attach_printable("ON_LEASE is only reachable by starting a lease"));
        }
        self.status = status;
        Ok(())
    }

    pub fn is_available(&self) -> bool {
        self.status == CarStatus::Idle
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use crate::entity::{Car, CarColor, CarId, CarMake, CarModel, CarStatus};
    use crate::KernelError;

    fn car(status: CarStatus) -> Car {
        Car::new(
            CarId::new(Uuid::new_v4()),
            CarModel::new("Corolla"),
            CarMake::new("Toyota"),
            CarColor::new("White"),
            status,
            None,
        )
    }

    #[test]
    fn lease_idle_car() {
        let mut car = car(CarStatus::Idle);
        assert!(car.is_available());
        assert!(car.lease().is_ok());
        assert_eq!(car.status(), &CarStatus::OnLease);
        assert!(!car.is_available());

        car.release();
        assert_eq!(car.status(), &CarStatus::Idle);
        assert!(car.is_available());
    }

    #[test]
    fn reject_lease_unless_idle() {
        for status in [CarStatus::OnLease, CarStatus::OnService] {
            let mut car = car(status);
            assert!(!car.is_available());
            let error = car.lease().unwrap_err();
            assert_eq!(error.current_context(), &KernelError::StateConflict);
            assert_eq!(car.status(), &status);
        }
    }

    #[test]
    fn change_status_keeps_lease_states() {
        let mut car = car(CarStatus::Idle);
        car.change_status(CarStatus::OnService).unwrap();
        assert_eq!(car.status(), &CarStatus::OnService);
        car.change_status(CarStatus::Idle).unwrap();

        let error = car.change_status(CarStatus::OnLease).unwrap_err();
        assert_eq!(error.current_context(), &KernelError::StateConflict);

        car.lease().unwrap();
        let error = car.change_status(CarStatus::OnService).unwrap_err();
        assert_eq!(error.current_context(), &KernelError::StateConflict);
        assert_eq!(car.status(), &CarStatus::OnLease);
    }
}
