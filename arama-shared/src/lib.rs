pub mod events;
pub mod pii;

pub use events::EnquiryNotification;
pub use pii::Masked;
