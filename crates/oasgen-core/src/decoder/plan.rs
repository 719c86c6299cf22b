use indexmap::IndexMap;

use crate::config::{ABSENT_TYPE, GenerationOptions};
use crate::error::DecodeError;
use crate::ir::{OperationInfo, ResponseType};

/// How the payload of one response status is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderStrategy {
    /// Validate against a named type.
    Exact(String),
    /// Raw bytes, no validation.
    Binary,
    /// No payload is expected.
    Constant,
    /// Validate against the configured error envelope type.
    ErrorEnvelope(String),
}

impl DecoderStrategy {
    /// The type name the strategy validates against, if any.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            DecoderStrategy::Exact(name) | DecoderStrategy::ErrorEnvelope(name) => Some(name),
            DecoderStrategy::Binary | DecoderStrategy::Constant => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderEntry {
    pub status: u16,
    pub strategy: DecoderStrategy,
    /// Declared response header names, carried as a literal union.
    pub headers: Vec<String>,
}

/// Type names substituted for responses without a schema reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultTypes {
    pub success: String,
    pub error: String,
}

impl Default for DefaultTypes {
    fn default() -> Self {
        Self {
            success: ABSENT_TYPE.to_string(),
            error: ABSENT_TYPE.to_string(),
        }
    }
}

impl From<&GenerationOptions> for DefaultTypes {
    fn from(options: &GenerationOptions) -> Self {
        Self {
            success: options.default_success_type.clone(),
            error: options.default_error_type.clone(),
        }
    }
}

/// A caller-supplied replacement for some of the default decoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderOverride {
    /// Replaces the primary success decoder only.
    Single(DecoderStrategy),
    /// Replaces exactly the listed statuses.
    Table(IndexMap<u16, DecoderStrategy>),
}

/// The per-status decoder table of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderPlan {
    /// The first three-digit `2xx` status.
    pub primary_success: u16,
    /// One entry per numeric status, in declaration order.
    pub entries: Vec<DecoderEntry>,
}

impl DecoderPlan {
    /// Build the default table. Operations without a three-digit `2xx`
    /// status get no decoder.
    pub fn for_operation(op: &OperationInfo, defaults: &DefaultTypes) -> Option<Self> {
        let primary_success = op
            .responses
            .iter()
            .filter_map(|r| r.status_code())
            .find(|code| (200..300).contains(code))?;

        Some(Self {
            primary_success,
            entries: Self::default_entries(op, defaults),
        })
    }

    /// The default strategy of every numeric status, in declaration order.
    /// Available even when the operation declares no success status.
    pub fn default_entries(op: &OperationInfo, defaults: &DefaultTypes) -> Vec<DecoderEntry> {
        op.responses
            .iter()
            .filter_map(|response| {
                let status = response.status_code()?;
                Some(DecoderEntry {
                    status,
                    strategy: strategy_for(&response.response_type, defaults),
                    headers: response.headers.clone(),
                })
            })
            .collect()
    }

    pub fn entry(&self, status: u16) -> Option<&DecoderEntry> {
        self.entries.iter().find(|e| e.status == status)
    }

    pub fn primary(&self) -> Option<&DecoderEntry> {
        self.entry(self.primary_success)
    }

    /// Right-biased merge of an override over the default table.
    pub fn with_override(&self, decoder_override: &DecoderOverride) -> Result<Self, DecodeError> {
        let mut merged = self.clone();
        match decoder_override {
            DecoderOverride::Single(strategy) => {
                merged.set(self.primary_success, strategy.clone())?;
            }
            DecoderOverride::Table(table) => {
                for (status, strategy) in table {
                    merged.set(*status, strategy.clone())?;
                }
            }
        }
        Ok(merged)
    }

    fn set(&mut self, status: u16, strategy: DecoderStrategy) -> Result<(), DecodeError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.status == status)
            .ok_or(DecodeError::UnknownStatus(status))?;
        entry.strategy = strategy;
        Ok(())
    }
}

fn strategy_for(response_type: &ResponseType, defaults: &DefaultTypes) -> DecoderStrategy {
    match response_type {
        ResponseType::Named(name) => DecoderStrategy::Exact(name.clone()),
        ResponseType::Binary => DecoderStrategy::Binary,
        ResponseType::DefaultSuccess if defaults.success == ABSENT_TYPE => {
            DecoderStrategy::Constant
        }
        ResponseType::DefaultSuccess => DecoderStrategy::Exact(defaults.success.clone()),
        ResponseType::DefaultError if defaults.error == ABSENT_TYPE => DecoderStrategy::Constant,
        ResponseType::DefaultError => DecoderStrategy::ErrorEnvelope(defaults.error.clone()),
    }
}
