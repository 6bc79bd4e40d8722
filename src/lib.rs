//! # birdroutes - Country Prefix Lists to BIRD Static Routes
//!
//! Downloads an IPv4 prefix list (one CIDR per line, e.g. chnroutes2),
//! drops reserved address space, and writes a BIRD static route file that
//! either routes the listed prefixes through an interface or, in reverse
//! mode, routes everything else. BIRD is then reloaded with `birdc configure`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        birdroutes                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: update, generate, check, config, version   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── source, interface, reverse, output, reload, alerts   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls)          PrefixSource trait     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Parser ── Bogons ── AddressSet (collapse / complement)     │
//! │    └── Routes + Render: `route <cidr> via "<iface>";`       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Sink (atomic file write)            RouteSink trait        │
//! │  Reload (birdc configure)            Reloader trait         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Alerts (telegram, gotify, smtp, webhook)  Notifier trait   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use birdroutes::routes::{plan_routes, RouteMode};
//!
//! let list = "1.0.1.0/24\n1.0.2.0/23\n10.0.0.0/8\nnot-an-ip\n";
//! let plan = plan_routes(list, "eth0", RouteMode::Direct);
//!
//! assert_eq!(plan.parsed.networks.len(), 2);
//! assert_eq!(
//!     plan.rendered,
//!     "route 1.0.1.0/24 via \"eth0\";\nroute 1.0.2.0/23 via \"eth0\";\n"
//! );
//! ```
//!
//! ## Modules
//!
//! - [`address_set`] - Sorted disjoint CIDR sets: collapse, complement
//! - [`alerts`] - Alert destinations (Telegram, Gotify, Email, Webhook)
//! - [`bogons`] - Reserved and ignored IPv4 space
//! - [`cli`] - Command-line interface definitions
//! - [`cmd_abstraction`] - External command execution seam
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`error`] - Typed errors
//! - [`fetcher`] - HTTP client for downloading the prefix list
//! - [`lock`] - File locking for concurrent execution prevention
//! - [`parser`] - Prefix list parsing and filtering
//! - [`reload`] - Router reload
//! - [`render`] - BIRD route statements
//! - [`routes`] - Direct/reverse route generation
//! - [`sink`] - Route file destinations
//! - [`utils`] - Common utility functions (formatting, truncation)
//! - [`validation`] - Input validation

pub mod address_set;
pub mod alerts;
pub mod bogons;
pub mod cli;
pub mod cmd_abstraction;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod lock;
pub mod parser;
pub mod reload;
pub mod render;
pub mod routes;
pub mod sink;
pub mod utils;
pub mod validation;

pub use address_set::AddressSet;
pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::{PrefixError, RouteError};
pub use routes::{generate_routes, plan_routes, RouteMode};
