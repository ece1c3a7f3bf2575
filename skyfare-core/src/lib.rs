pub mod booking;
pub mod guard;
pub mod identity;
pub mod navigation;
pub mod repository;
pub mod session;

pub use booking::{BookingSelection, Flight, TripType};
pub use guard::{AuthGuard, GuardMode, GuardState, GuardView};
pub use identity::{Identity, IdentityResolver, Role};
pub use navigation::{HistoryNavigator, Navigator, RoleChoice};
pub use session::{Session, SessionHandle, SessionProvider};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Identity verification failed: {0}")]
    IdentityError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
