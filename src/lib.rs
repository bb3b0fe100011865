//! Ario Studio backend: lead capture, bilingual content reads and
//! notification delivery for the studio website.

pub mod cms;
pub mod config;
pub mod content;
pub mod db;
pub mod dispatch;
pub mod email;
pub mod form;
pub mod i18n;
pub mod lead;
pub mod retry;
pub mod routes;
pub mod scheduler;
pub mod security;
