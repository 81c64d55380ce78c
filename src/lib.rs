//! Ad-hoc local-network file sharing over HTTP.
//!
//! A [`FileRegistry`] holds the paths a user chose to share; the axum router
//! from [`routes::app`] exposes them to any device on the network:
//!
//! - `GET /` — index page linking every shared file
//! - `GET /file/{index}` — one file, by registry position, as an attachment
//! - `GET /download_all` — everything as a single ZIP
//!
//! The embedding application (the CLI in `main.rs`, or a GUI) mutates the
//! registry with [`AppState::share`] and [`AppState::clear`] while the server
//! answers requests; [`net::local_ip`] supplies the address for the URL shown
//! to the user.

pub mod archive;
pub mod error;
pub mod net;
pub mod registry;
pub mod routes;
pub mod state;

pub use error::ShareError;
pub use registry::FileRegistry;
pub use state::AppState;
