//! Ingredient pairing engine.
//!
//! Reconciles FlavorDB entities and FooDB foods into one set of canonical
//! ingredients and molecules, aggregates FooDB content samples onto their
//! occurrences, scores every occurrence and ranks pairing suggestions for a
//! selection of ingredients by shared molecules.
//!
//! Write path: [`sync`] (FlavorDB pass, FooDB foods pass, FooDB content pass).
//! Read path: [`service::PairingService`] over [`ranker`] and [`library`].

#![warn(missing_docs)]

pub mod aggregate;
pub mod category;
pub mod config;
pub mod db;
pub mod ids;
pub mod kv;
pub mod library;
pub mod models;
pub mod ranker;
pub mod reconcile;
pub mod schema;
pub mod scoring;
pub mod service;
pub mod sync;
