//! Campaign resolution from request filenames and query parameters.
//!
//! ```text
//! /reprints/summer-sale.promo.png        → campaign "summer-sale", keyword "promo"
//! /pixel.gif?pk_campaign=x&pk_keyword=y  → campaign "x", keyword "y"
//! ```

pub mod resolver;

pub use resolver::{CampaignResolver, CampaignSelection, CAMPAIGN_PARAM, KEYWORD_PARAM};
