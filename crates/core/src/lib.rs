pub mod config;
pub mod domain;
pub mod errors;
pub mod export;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod reply;
pub mod submission;

pub use domain::context::FormContext;
pub use domain::currency::Currency;
pub use domain::quote::{CustomerInfo, LineItem, NormalizedQuote, QuoteId, ServiceInfo};
pub use errors::{ApplicationError, DomainError};
pub use extract::ParseOptions;
pub use pipeline::{parse_quote, parse_quote_with};
pub use reply::{classify_reply, classify_reply_with, Estimate, QuoteReply};
