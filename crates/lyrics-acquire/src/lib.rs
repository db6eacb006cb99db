//! Lyrics acquisition: the Genius REST API plus two lyrics page scrapers.
//!
//! All network access is sequential and paced by fixed delays, since the
//! lyrics sites ban clients that fetch too quickly.

pub mod azlyrics;
pub mod credentials;
pub mod genius;
pub mod genius_page;
pub mod html;
pub mod http;
pub mod normalize;
pub mod output;
