//! Agentic Service
//!
//! A small product-launch backend: a waitlist, a stubbed "AI" search and
//! messaging API, and an in-memory store simulator for trying out simple
//! monetization setups.
//!
//! # Architecture
//!
//! ## Core Components
//!
//! * `api` - HTTP endpoints using the Axum framework
//! * `waitlist` - Email waitlist persisted to a JSON file
//! * `assistant` - AI system object, its persisted configuration and the canned responder
//! * `store` - Item catalog, stock levels and sales ledger for the quick-start demo
//! * `persist` - Whole-file JSON writes shared by everything that touches disk
//! * `config` - Environment-based service configuration
//! * `error` - Error handling and HTTP response mapping
//!
//! ## Design
//!
//! ### API Layer (`api.rs`)
//! - Built with Axum web framework
//! - JSON request and response bodies; validation failures return 400 `{"error": ...}`
//! - Shared application state constructed once in `main`
//!
//! ### Storage Layer
//! - Flat JSON files rewritten wholesale on every change
//! - Writes go through a temporary file and a rename
//! - The waitlist is held in memory behind a single mutex so concurrent joins
//!   cannot lose updates
//!
//! ### AI System (`assistant.rs`)
//! - No model is called; `CannedResponder` returns fixed results
//! - The `Responder` trait is the seam for a real backend
//!
//! ### Store Simulator (`store.rs`)
//! - Stock lives only on the catalog item; the inventory map is a derived view
//! - Activity is reported through the `StoreReporter` trait instead of printed
//!
//! # Environment Configuration
//!
//! ```bash
//! HOST=0.0.0.0                    # Server host
//! PORT=8080                       # Server port
//! WAITLIST_FILE=waitlist.json     # Waitlist storage
//! AI_CONFIG_FILE=ai_config.json   # AI system configuration
//! INDEX_FILE=static/index.html    # Landing page served at /
//! RUST_LOG=info                   # Logging level
//! ```
//!
//! # API Endpoints
//!
//! ## GET /api/status
//! ```json
//! {
//!   "status": "active",
//!   "ai_system": { "initialized": true, "version": "1.0.0", "config": { } },
//!   "timestamp": "2026-01-01T00:00:00Z"
//! }
//! ```
//!
//! ## POST /api/waitlist
//! ### Request
//! ```json
//! { "email": "string" }
//! ```
//! ### Response
//! ```json
//! { "status": "success", "message": "Successfully added to waitlist", "position": 1 }
//! ```
//! or, for an email that is already on the list,
//! ```json
//! { "status": "already_exists", "message": "Email already on waitlist" }
//! ```
//!
//! ## GET /api/waitlist
//! ```json
//! { "total_subscribers": 2, "latest_signup": "2026-01-01T00:00:00Z" }
//! ```
//!
//! ## POST /api/ai/search
//! ```json
//! { "query": "string", "context": null }
//! ```
//!
//! ## POST /api/ai/message
//! ```json
//! { "recipient": "string", "message": "string", "priority": "normal" }
//! ```
//!
//! ## GET /api/ai/config, POST /api/ai/config
//! POST merges the top-level keys of the body into the current config.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use agentic_service::store::Store;
//! use rust_decimal::Decimal;
//!
//! let mut store = Store::new("AI Agent Store");
//! store
//!     .add_item("API Access Key", Decimal::new(5000, 2), 100, "Monthly API access")
//!     .unwrap();
//! let sale = store.sell("API Access Key", 10).unwrap();
//! assert_eq!(sale.revenue, Decimal::new(50000, 2));
//! println!("{}", store.summary());
//! ```

pub mod api;
pub mod assistant;
pub mod config;
pub mod error;
pub mod persist;
pub mod store;
pub mod waitlist;
