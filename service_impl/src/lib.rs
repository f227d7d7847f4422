pub mod availability;
pub mod clock;
pub mod permission;
pub mod reservation;
pub mod review;
pub mod scheduler;
pub mod test;
pub mod uuid_service;

pub use availability::AvailabilityServiceImpl;
pub use clock::ClockServiceImpl;
pub use permission::PermissionServiceDev;
pub use reservation::ReservationServiceImpl;
pub use review::ReviewServiceImpl;
pub use scheduler::SchedulerServiceImpl;
pub use uuid_service::UuidServiceImpl;
