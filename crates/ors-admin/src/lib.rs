//! Client for the ORS admin notification API.
//!
//! Every call goes through a [`RequestDispatcher`], which runs the session
//! gate first and turns transport failures into ORS envelopes. The
//! [`NotificationController`] drives the admin notification form on top.

pub mod config;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod navigation;
pub mod notification;
pub mod session;
pub mod store;
pub mod transport;

pub use config::{ClientConfig, PUBLIC_PATHS};
pub use dispatcher::{Outcome, RequestDispatcher};
pub use envelope::Envelope;
pub use error::{ClientError, TransportError};
pub use navigation::{Navigator, RouteNavigator};
pub use notification::{FormState, NotificationController, NotificationDraft, NotificationKind};
pub use session::{SessionContext, SessionStatus};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use transport::{HttpTransport, Transport};
