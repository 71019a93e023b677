mod availability_toggle;
mod key_result;

pub use availability_toggle::AvailabilityToggle;
pub use key_result::KeyResult;
