//! Collaborative pixel grid: view engine and document synchronization.
//!
//! This crate runs natively and as WebAssembly in the browser. It owns the
//! camera and gesture handling for a pannable, zoomable grid of colored
//! cells, and keeps a local mirror of that grid consistent with a replicated
//! shared document. The host is responsible for wiring DOM events to the
//! engine, delivering document readiness, and acting on the returned
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`view`] | Pan, pivot-preserving zoom and gesture disambiguation |
//! | [`camera`] | Camera, viewport and world/screen conversions |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`geometry`] | Grid placement in world space and cell hit-testing |
//! | [`grid`] | Grid mirror with edge-only row/column edits |
//! | [`bounds`] | Edge bound pairs and single-step growth planning |
//! | [`groups`] | Color-group index |
//! | [`doc`] | Shared document model and collaborator trait |
//! | [`event`] | Change paths adapted into typed sync events |
//! | [`sync`] | Reconciler applying change batches to the mirror |
//! | [`render`] | Scene rendering to a 2D canvas context |
//! | [`config`] | Engine configuration from environment |
//! | [`consts`] | Shared numeric constants (zoom limits, cell size, etc.) |

pub mod bounds;
pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod event;
pub mod geometry;
pub mod grid;
pub mod groups;
pub mod input;
pub mod render;
pub mod sync;
pub mod view;
