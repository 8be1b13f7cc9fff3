use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::context::FormContext;
use crate::reply::QuoteReply;

pub const SUBMISSION_SOURCE: &str = "web_smart_form";
pub const ACCEPTANCE_SOURCE: &str = "web_quote_acceptance";

/// Shown in place of a counter-offer when the negotiation webhook rejects
/// the message.
pub const NEGOTIATION_UNAVAILABLE_REPLY: &str =
    "I'm having trouble connecting to the negotiation service.";

/// Stand-in reply used when no webhook is configured.
pub const SIMULATION_REPLY: &str = "Simulation: Quote would appear here if connected.";

/// Body POSTed to the quote automation webhook.
#[derive(Clone, Debug, Serialize)]
pub struct SubmissionPayload<'a> {
    pub source: &'static str,
    pub timestamp: DateTime<Utc>,
    pub data: &'a FormContext,
}

impl<'a> SubmissionPayload<'a> {
    pub fn new(data: &'a FormContext, timestamp: DateTime<Utc>) -> Self {
        Self { source: SUBMISSION_SOURCE, timestamp, data }
    }
}

/// Body POSTed to the job webhook when the customer accepts a quote.
#[derive(Clone, Debug, Serialize)]
pub struct AcceptancePayload<'a> {
    pub source: &'static str,
    pub timestamp: DateTime<Utc>,
    pub customer_data: &'a FormContext,
    pub accepted_quote: &'a QuoteReply,
}

impl<'a> AcceptancePayload<'a> {
    pub fn new(
        customer_data: &'a FormContext,
        accepted_quote: &'a QuoteReply,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self { source: ACCEPTANCE_SOURCE, timestamp, customer_data, accepted_quote }
    }
}

/// One customer message to the negotiation webhook, with the quote under
/// discussion.
#[derive(Clone, Debug, Serialize)]
pub struct NegotiationPayload<'a> {
    pub message: &'a str,
    pub quote_data: &'a QuoteReply,
    pub timestamp: DateTime<Utc>,
}

/// Body of a webhook reachability check.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ConnectionTestPayload {
    pub test: bool,
    pub timestamp: DateTime<Utc>,
}

impl ConnectionTestPayload {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { test: true, timestamp }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionCheck {
    Ready,
    /// 404: the automation workflow exists but is not listening.
    WorkflowInactive,
    UnexpectedStatus(u16),
}

impl ConnectionCheck {
    /// Only 200 and 201 count as a working webhook.
    pub fn from_status(status: u16) -> Self {
        match status {
            200 | 201 => Self::Ready,
            404 => Self::WorkflowInactive,
            other => Self::UnexpectedStatus(other),
        }
    }
}

/// Reply text substituted for a non-success webhook status. The parser then
/// degrades it to a quote built from the form context.
pub fn server_error_reply(status: u16, reason: &str) -> String {
    format!("Error: Server returned {status} {reason}").trim_end().to_string()
}
