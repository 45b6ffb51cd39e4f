//! Message handling for readlater.
//!
//! This crate ties together fetching, extraction, classification and
//! storage behind a single entry point, [`IntentRouter::handle`], and renders
//! every outcome as a [`Reply`].

pub mod responder;
pub mod router;
pub mod save;

pub use responder::{Reply, ReplyBody, Responder};
pub use router::{ArticleRef, Intent, IntentRouter, classify_intent};
pub use save::{Degradation, ProgressReporter, SaveReport, SilentProgress};
