//! Inbound composition specs, as they arrive on the wire
//!
//! The `model` field of a request is either a plain string or a composite
//! object. The raw shapes here accept anything JSON-shaped enough to parse;
//! [`RawModelRef::validate`] then checks every structural rule and reports
//! the first violation with its field path, before any upstream call.
//!
//! ```json
//! {"trio": [{"model": "a"}, {"model": "b"}, {"model": "c"}]}
//! {"ensemble": [{"model": "a", "system_prompt": "Be terse."}, {"model": "b"}],
//!  "aggregation_method": "judge", "judge_model": "j"}
//! ```

use super::method::AggregationMethod;
use super::spec::{CompositeSpec, EnsembleSpec, Member, ModelRef, TrioSpec};
use crate::conversation::ConversationMessage;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Unvalidated `model` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawModelRef {
    Named(String),
    Composite(Box<RawCompositeSpec>),
}

/// Unvalidated composite object (`trio` or `ensemble` form)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCompositeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trio: Option<Vec<RawMember>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensemble: Option<Vec<RawMember>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_model: Option<RawModelRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesize_model: Option<RawModelRef>,
}

/// Unvalidated member: `{model, messages?}` or `{model, system_prompt?}`
///
/// `model` is optional on the wire so a missing one is reported with its
/// field path instead of failing deserialization of the whole body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<RawModelRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<ConversationMessage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl RawModelRef {
    /// Validate the top-level `model` field.
    ///
    /// Fails with [`DomainError::Validation`] naming the offending field, or
    /// [`DomainError::CompositionTooDeep`] when composites nest deeper than
    /// `max_depth`.
    pub fn validate(&self, max_depth: usize) -> Result<ModelRef, DomainError> {
        let model = self.validate_at("model")?;
        if model.depth() > max_depth {
            return Err(DomainError::CompositionTooDeep { max_depth });
        }
        Ok(model)
    }

    fn validate_at(&self, field: &str) -> Result<ModelRef, DomainError> {
        match self {
            RawModelRef::Named(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(DomainError::validation(field, "Model name cannot be empty"));
                }
                Ok(ModelRef::Named(name.to_string()))
            }
            RawModelRef::Composite(spec) => spec
                .validate_at(field)
                .map(|spec| ModelRef::Composite(Box::new(spec))),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, RawModelRef::Composite(_))
    }
}

impl From<&str> for RawModelRef {
    fn from(name: &str) -> Self {
        RawModelRef::Named(name.to_string())
    }
}

impl RawCompositeSpec {
    fn validate_at(&self, field: &str) -> Result<CompositeSpec, DomainError> {
        match (&self.trio, &self.ensemble) {
            (Some(_), Some(_)) => Err(DomainError::validation(
                field,
                "Composite model cannot contain both 'trio' and 'ensemble'",
            )),
            (None, None) => Err(DomainError::validation(
                field,
                "Composite model must contain either 'trio' or 'ensemble'",
            )),
            (Some(trio), None) => self.validate_trio(field, trio).map(CompositeSpec::Trio),
            (None, Some(ensemble)) => self
                .validate_ensemble(field, ensemble)
                .map(CompositeSpec::Ensemble),
        }
    }

    fn validate_trio(&self, field: &str, members: &[RawMember]) -> Result<TrioSpec, DomainError> {
        if self.aggregation_method.is_some() {
            return Err(DomainError::validation(
                format!("{field}.aggregation_method"),
                "Trio always synthesizes with its third member and takes no aggregation method",
            ));
        }
        if self.judge_model.is_some() {
            return Err(DomainError::validation(
                format!("{field}.judge_model"),
                "Trio synthesizes with its third member and takes no judge_model",
            ));
        }
        if self.synthesize_model.is_some() {
            return Err(DomainError::validation(
                format!("{field}.synthesize_model"),
                "Trio synthesizes with its third member and takes no synthesize_model",
            ));
        }

        let [a, b, c] = members else {
            return Err(DomainError::validation(
                format!("{field}.trio"),
                format!(
                    "Trio must contain exactly three members, got {}",
                    members.len()
                ),
            ));
        };

        Ok(TrioSpec::new(
            a.validate_at(&format!("{field}.trio[0]"))?,
            b.validate_at(&format!("{field}.trio[1]"))?,
            c.validate_at(&format!("{field}.trio[2]"))?,
        ))
    }

    fn validate_ensemble(
        &self,
        field: &str,
        members: &[RawMember],
    ) -> Result<EnsembleSpec, DomainError> {
        if members.is_empty() {
            return Err(DomainError::validation(
                format!("{field}.ensemble"),
                "Ensemble must contain at least one member",
            ));
        }

        let method = match &self.aggregation_method {
            Some(raw) => raw.parse::<AggregationMethod>().map_err(|e| {
                DomainError::validation(format!("{field}.aggregation_method"), e)
            })?,
            None => AggregationMethod::default(),
        };

        let members = members
            .iter()
            .enumerate()
            .map(|(i, m)| m.validate_at(&format!("{field}.ensemble[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        let judge_model = self
            .judge_model
            .as_ref()
            .map(|m| m.validate_at(&format!("{field}.judge_model")))
            .transpose()?;
        if method == AggregationMethod::Judge && judge_model.is_none() {
            return Err(DomainError::validation(
                format!("{field}.judge_model"),
                "judge_model is required when aggregation_method is 'judge'",
            ));
        }

        let synthesize_model = self
            .synthesize_model
            .as_ref()
            .map(|m| m.validate_at(&format!("{field}.synthesize_model")))
            .transpose()?;
        if method == AggregationMethod::Synthesize && synthesize_model.is_none() {
            return Err(DomainError::validation(
                format!("{field}.synthesize_model"),
                "synthesize_model is required when aggregation_method is 'synthesize'",
            ));
        }

        Ok(EnsembleSpec {
            members,
            method,
            judge_model,
            synthesize_model,
        })
    }
}

impl RawMember {
    /// Member backed by a named model, without seed messages
    pub fn named(name: &str) -> Self {
        Self {
            model: Some(name.into()),
            messages: None,
            system_prompt: None,
        }
    }

    fn validate_at(&self, field: &str) -> Result<Member, DomainError> {
        let field = format!("{field}.model");
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| DomainError::validation(&field, "Member must name a model"))?
            .validate_at(&field)?;

        // `system_prompt` is sugar for a leading seed system message
        let mut seeds = Vec::new();
        if let Some(prompt) = &self.system_prompt
            && !prompt.trim().is_empty()
        {
            seeds.push(ConversationMessage::system(prompt.clone()));
        }
        seeds.extend(self.messages.iter().flatten().cloned());

        Ok(Member::new(model).with_seed_messages(seeds))
    }
}
