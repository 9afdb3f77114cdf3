//! Consumer-facing compass API
//!
//! The cast gesture pipeline (`gesture`, `momentum`, `session`), the state
//! aggregate driven by the display loop (`callback`) and display helpers.

pub mod gesture;
pub mod momentum;
pub mod session;
pub mod callback;
pub mod types;
pub mod formatting;

// Re-export commonly used API types
pub use types::{ApiError, ApiResult, CompassEvent, CompassSnapshot, PositionStatus};
pub use gesture::{Swipe, SwipeOutcome, SwipeRecognizer};
pub use momentum::Momentum;
pub use session::{CastPhase, CastRefusal, CastSession, SessionToken, SwipeResult};
pub use callback::{CallbackHandle, CompassApi, EventCallback};
pub use formatting::{cardinal, format_coordinate, format_distance, format_dms};
