   /*
                                          ░░
                                        ░░▓▓░░
                                  ░▒▓██▓▓▒▒▒▒▓▓██▓▒░
                               ░▒█▓▒▒▒▒▒▓▒░█▒▓▒▒▒▒▒▓█▒░
                             ░▓▓▒▒▒▓▒▓▒▓▓▒░█▒▓▓▓▓▓▒▒▓▒▓▓▒
                           ░██▒▓▒▒▒▓█▓▒░░▒▒▒▓░░▒▓█▓▒▒▒▒▒▓█░
                          ▒█▒▒▓▓▓▓▓░     ▒▓█▒     ░▓▓▓▓▒▒▒█▒
                         ▒█▒▓▒▓▓▓░      ▒▓▓█▓▒      ░▓▓▒▒▓▒█▒
                        ░█▒▓▒▓▓▒       ▒█▓▓█▓█▒       ▒█▓▓▒▒█░
                       ░▓▓▒▒▓▓▒       ▒▓▓▓▓▓▓▓▓▒       ▒▓▓▒▒▓█░
                       ░█▒▒▓▒█░      ▒▓█▓█▓██▓█▓▒      ░█▒▓▒▒█▒
                       ▒▓▒▒▒▓▒      ░▓██▓▒▒█▒▓██▓░      ▒▓▒▓▒▓▒
                       ▒▓▒▒▒█▒     ░█▓██▓▓▒█▓▓███▓░     ▒█▒▓▒▓▒
                       ▒▓▒▒▓▓▓    ░▓▓█▓█▒▒▒█▒▒█▓█▓▓░    ▓▓▓▒▒▓▒
                       ░█▒▒▓▒█░  ░▓██▓▒  ░▒█░  ▒▓██▓░  ░█▒▒▒▒█░
                        ▓█▒▒▒▓▓░░▓▒▓▒░   ░▒█░   ░▒▓▒▓░░▓▓▓▒▒▓▓
                         █▓▒▒▒▓▓▓▒▓░     ░▒█░     ░▒▓▒▓▓▓▒▓▓█
                         ░▓▓▒▒▒▒█▒░      ░▒█░      ░▒█▓▒▒▒▓▓░
                          ░▓▓▒▒▒▓▓▓▓░    ░▒█░    ░▓▓▓▓▒▒▒▓▓░
                            ░█▓▒▓▒▓▓▒██▓▒▒▒█▒▒▓██▒▓▓▒▓▒▓█░
                             ░▒▓▓▓▒▒▒▒▓▒▒▒▒█▓▒▒▓▒▒▒▒▓▓▓▒░
                                ░▒▓█▓▒▒▒▒▒▒█▒▒▒▒▒▓██▒░
                                    ░▒▓███▓████▓▒░
                                          ▒▓░
                                          ░▒

                                    C R Y P T D E X
*/

//! Cryptdex builds encrypted multi-map indices over relational tables for searchable symmetric
//! encryption: given plaintext tables with declared primary/foreign keys, it derives trapdoors
//! and tokens for every filter and join predicate, encrypts every row, and persists the result to
//! a typed [redb](https://www.redb.org/)-backed store so that a query processor holding the
//! master secret can execute selection, equi-join, and semi/anti/outer-join queries against it
//! without the store ever seeing a plaintext value, predicate, or record identifier.
//!
//! Three independent encrypted multi-map (EMM) schemes are supported, chosen per build via
//! [`emm::Variant`]:
//!
//! - **SPX** — a filter EMM plus an uncorrelated-join EMM (§4.5).
//! - **CORR** — the same filter EMM plus a dependent-filter EMM and a correlated-join EMM (§4.6).
//! - **PKFK** — no separate EMM tables; every encrypted table embeds its own join tokens (§4.7).
//!
//! [`Builder`] is the library's single entry point: it validates a [`model::Catalog`], attaches
//! record identifiers, and drives whichever scheme's construction writes the resulting encrypted
//! tables to a [`store::Database`].

#![warn(
   clippy::all,
   clippy::cargo,
   clippy::nursery,
   clippy::pedantic,
   clippy::style,
)]
#![allow(clippy::multiple_crate_versions)]

mod error;
pub use crate::error::Error;

pub mod crypto;
pub mod identifiers;
pub mod model;
pub mod predicates;

mod counters;
mod rows;

/// The length-prefixed framing the store's raw values use; exposed so a query processor holding
/// the master secret can decode a fetched row or join-EMM entry without relinking this crate's
/// private wire format by hand.
pub mod wire;

pub mod row_encryptor;

pub mod emm;
pub mod store;

mod builder;
pub use crate::builder::{Builder, PlaintextRows};

pub mod config;
