//! # HTML Rendering
//!
//! Server-side markup built with [maud](https://maud.lambda.xyz/); every
//! interpolated value is escaped.
//!
//! - `email` - contact-form notification mail (text + HTML)
//! - `portfolio` - the portfolio grid page

pub mod email;
pub mod portfolio;

pub use email::contact_email;
pub use portfolio::portfolio_page;
