/// Data models module
///
/// This module defines the row types persisted by the evento backend and
/// the joined or computed views the API returns alongside them.

mod status;
pub use status::{EventStatus, PaymentStatus};

mod user;
pub use user::User;

mod event;
pub use event::{Availability, Event};

mod booking;
pub use booking::{completed_revenue, Booking, BookingWithEvent, Revenue};

mod enquiry;
pub use enquiry::Enquiry;

mod session;
pub use session::{Credential, Session};
