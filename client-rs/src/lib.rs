//! Client library for the teams API.
//!
//! [`TeamBoard`] holds the list a user works on and applies every change
//! optimistically through [`Optimistic`], reporting outcomes through a
//! [`Notifier`]. [`HttpTeamsApi`] talks to the server.

pub mod api;
pub mod approval;
pub mod board;
pub mod error;
pub mod notify;
pub mod optimistic;
pub mod selection;

pub use api::{Ack, BulkDeleted, Created, HttpTeamsApi, TeamsApi};
pub use approval::ApprovalControl;
pub use board::TeamBoard;
pub use error::{ClientError, ClientResult};
pub use notify::{Notification, NotificationKind, Notifier, RecordingNotifier, TracingNotifier};
pub use optimistic::Optimistic;
pub use selection::Selection;

pub use team_core::{ApprovalField, ApprovalStatus, Member, NewTeam, Team, TeamPatch};
