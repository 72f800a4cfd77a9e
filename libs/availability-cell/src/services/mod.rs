pub mod overlap;
pub mod schedule;
pub mod slots;

pub use schedule::ScheduleService;
