mod duration;
mod quantity;
mod subticking;

pub use duration::Duration;
pub use quantity::{Boundaries, FINE_PER_COARSE, TimeQuantity};
pub use subticking::Subticking;
