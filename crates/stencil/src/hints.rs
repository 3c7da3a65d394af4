//! Hierarchy hints from an external layout classifier.
//!
//! A classifier may predict a structural role for each element. Hints are
//! merged after detection: confident background and decoration predictions
//! remove an element from the variable set, and every accepted role is
//! attached to the element's record.

use std::collections::HashMap;

use log::debug;
use serde::Deserialize;

use stencil_core::variable::HierarchyRole;

/// One classifier prediction, in the classifier's wire format.
#[derive(Debug, Clone, Deserialize)]
pub struct HierarchyPrediction {
    pub element_id: String,
    pub predicted_role: String,
    pub confidence: f32,
}

/// A classifier response, either wrapped or as a bare prediction list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HintsFile {
    Response {
        hierarchy_predictions: Vec<HierarchyPrediction>,
    },
    Predictions(Vec<HierarchyPrediction>),
}

impl HintsFile {
    pub fn into_predictions(self) -> Vec<HierarchyPrediction> {
        match self {
            Self::Response {
                hierarchy_predictions,
            } => hierarchy_predictions,
            Self::Predictions(predictions) => predictions,
        }
    }
}

/// An accepted role with its confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hint {
    role: HierarchyRole,
    confidence: f32,
}

impl Hint {
    pub fn new(role: HierarchyRole, confidence: f32) -> Self {
        Self { role, confidence }
    }

    pub fn role(&self) -> HierarchyRole {
        self.role
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

/// Hints keyed by element id.
#[derive(Debug, Clone, Default)]
pub struct Hints {
    by_element: HashMap<String, Hint>,
}

impl Hints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds hints from raw predictions, dropping unknown roles.
    ///
    /// When an element is predicted more than once, the most confident
    /// prediction is kept.
    pub fn from_predictions(predictions: impl IntoIterator<Item = HierarchyPrediction>) -> Self {
        let mut hints = Self::new();
        for prediction in predictions {
            match prediction.predicted_role.parse::<HierarchyRole>() {
                Ok(role) => hints.insert(prediction.element_id, Hint::new(role, prediction.confidence)),
                Err(err) => debug!(element_id = prediction.element_id.as_str(); "Ignoring hint: {err}"),
            }
        }
        hints
    }

    /// Records a hint, keeping the more confident one on conflict.
    pub fn insert(&mut self, element_id: impl Into<String>, hint: Hint) {
        let slot = self.by_element.entry(element_id.into()).or_insert(hint);
        if hint.confidence > slot.confidence {
            *slot = hint;
        }
    }

    pub fn get(&self, element_id: &str) -> Option<&Hint> {
        self.by_element.get(element_id)
    }

    pub fn len(&self) -> usize {
        self.by_element.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_element.is_empty()
    }

    /// Returns the role to attach to an element, if its hint is confident
    /// enough.
    pub fn accepted_role(&self, element_id: &str, min_confidence: f32) -> Option<HierarchyRole> {
        self.get(element_id)
            .filter(|hint| hint.confidence >= min_confidence)
            .map(Hint::role)
    }

    /// Returns true when an element should be dropped from the variable set.
    ///
    /// Explicitly tagged elements are never excluded.
    pub fn excludes(&self, element_id: &str, explicit: bool, min_confidence: f32) -> bool {
        !explicit
            && self
                .accepted_role(element_id, min_confidence)
                .is_some_and(HierarchyRole::is_non_content)
    }
}
