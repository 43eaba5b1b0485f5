//! Protocol builders
//!
//! [`ProtocolBuilder`] assembles a [`ClinicalProtocolRule`] in code. The
//! shape helpers cover the common single-condition protocols and return a
//! builder, so preconditions can still be added before [`ProtocolBuilder::build`].
//! Shape helpers fall back to the default `no_action` token.

use clinguard_logic::{
    ClinicalProtocolRule, ComparisonOp, Expression, LogicError, LogicResult, ProtocolMetadata,
    ValidationRules,
};
use clinguard_types::Value;

const NO_ACTION: &str = "no_action";

/// Fluent constructor for [`ClinicalProtocolRule`]
#[derive(Debug, Clone)]
pub struct ProtocolBuilder {
    rule_id: String,
    name: String,
    category: String,
    version: String,
    source: String,
    logic: Option<Expression>,
    validation: ValidationRules,
    metadata: ProtocolMetadata,
}

impl ProtocolBuilder {
    pub fn new(rule_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            name: name.into(),
            category: String::new(),
            version: String::new(),
            source: String::new(),
            logic: None,
            validation: ValidationRules::default(),
            metadata: ProtocolMetadata::default(),
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Guideline or publication the protocol is derived from
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn logic(mut self, logic: Expression) -> Self {
        self.logic = Some(logic);
        self
    }

    pub fn min_confidence(mut self, min: f64) -> Self {
        self.validation.min_confidence = min;
        self
    }

    pub fn require_human_review(mut self, required: bool) -> Self {
        self.validation.require_human_review = required;
        self
    }

    pub fn max_data_age_hours(mut self, hours: f64) -> Self {
        self.validation.max_data_age_hours = Some(hours);
        self
    }

    /// Add a dot-path that must be present in the snapshot
    pub fn required_field(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if !self.validation.required_fields.contains(&path) {
            self.validation.required_fields.push(path);
        }
        self
    }

    /// Restrict the action identifiers the logic may produce
    pub fn allowed_action(mut self, action: impl Into<String>) -> Self {
        self.validation
            .allowed_actions
            .get_or_insert_with(Vec::new)
            .push(action.into());
        self
    }

    pub fn created_by(mut self, author: impl Into<String>) -> Self {
        self.metadata.created_by = author.into();
        self
    }

    pub fn evidence_level(mut self, level: impl Into<String>) -> Self {
        self.metadata.evidence_level = Some(level.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.metadata.references.push(reference.into());
        self
    }

    /// Mark the protocol as retired
    pub fn inactive(mut self) -> Self {
        self.metadata.is_active = false;
        self
    }

    /// Build and check the protocol
    pub fn build(self) -> LogicResult<ClinicalProtocolRule> {
        let logic = self.logic.ok_or_else(|| {
            LogicError::invalid_protocol(format!("{}: logic is required", self.rule_id))
        })?;

        let rule = ClinicalProtocolRule {
            rule_id: self.rule_id,
            name: self.name,
            category: self.category,
            version: self.version,
            source: self.source,
            logic,
            validation: self.validation,
            metadata: self.metadata,
        };
        rule.check()?;
        Ok(rule)
    }
}

/// `if(<path> <op> <threshold>, action, "no_action")`, requiring `path`
pub fn threshold_protocol(
    rule_id: impl Into<String>,
    name: impl Into<String>,
    path: impl Into<String>,
    op: ComparisonOp,
    threshold: f64,
    action: impl Into<String>,
) -> ProtocolBuilder {
    let path = path.into();
    let condition = Expression::compare(
        op,
        Expression::var(path.clone()),
        Expression::literal(threshold),
    );
    ProtocolBuilder::new(rule_id, name)
        .logic(action_if(condition, action))
        .required_field(path)
}

/// Triggers when the medication list contains `medication`
pub fn medication_protocol(
    rule_id: impl Into<String>,
    name: impl Into<String>,
    medication: impl Into<String>,
    action: impl Into<String>,
) -> ProtocolBuilder {
    let condition = Expression::has_medication(
        Expression::var("meds"),
        Expression::literal(Value::String(medication.into())),
    );
    ProtocolBuilder::new(rule_id, name).logic(action_if(condition, action))
}

/// Triggers when any condition code starts with `icd_prefix`
pub fn condition_protocol(
    rule_id: impl Into<String>,
    name: impl Into<String>,
    icd_prefix: impl Into<String>,
    action: impl Into<String>,
) -> ProtocolBuilder {
    let condition = Expression::has_condition_icd(
        Expression::var("conditions"),
        Expression::literal(Value::String(icd_prefix.into())),
    );
    ProtocolBuilder::new(rule_id, name).logic(action_if(condition, action))
}

/// Triggers when the `age` vital lies in `[low, high]`
pub fn age_bucket_protocol(
    rule_id: impl Into<String>,
    name: impl Into<String>,
    low: f64,
    high: f64,
    action: impl Into<String>,
) -> ProtocolBuilder {
    let condition = Expression::age_between(
        Expression::var("age"),
        Expression::literal(low),
        Expression::literal(high),
    );
    ProtocolBuilder::new(rule_id, name)
        .logic(action_if(condition, action))
        .required_field("age")
}

fn action_if(condition: Expression, action: impl Into<String>) -> Expression {
    Expression::if_then_else(
        condition,
        Expression::literal(Value::String(action.into())),
        Expression::literal(NO_ACTION),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_builder_sets_every_field() {
        let rule = ProtocolBuilder::new("htn-001", "Hypertension follow-up")
            .category("cardiology")
            .version("2.1.0")
            .source("ACC/AHA 2017")
            .logic(Expression::literal("schedule_bp_recheck"))
            .min_confidence(0.9)
            .require_human_review(true)
            .max_data_age_hours(72.0)
            .required_field("vitals.sbp")
            .required_field("vitals.sbp")
            .allowed_action("schedule_bp_recheck")
            .created_by("clinical-informatics")
            .evidence_level("A")
            .reference("doi:10.1161/HYP.0000000000000065")
            .build()
            .unwrap();

        assert_eq!(rule.rule_id, "htn-001");
        assert_eq!(rule.category, "cardiology");
        assert_eq!(rule.validation.required_fields, vec!["vitals.sbp".to_string()]);
        assert_eq!(
            rule.validation.allowed_actions,
            Some(vec!["schedule_bp_recheck".to_string()])
        );
        assert_eq!(rule.metadata.evidence_level.as_deref(), Some("A"));
        assert_eq!(rule.metadata.references.len(), 1);
        assert!(rule.validation.require_human_review);
        assert!(rule.is_active());
    }

    #[test]
    fn test_build_requires_logic() {
        assert!(ProtocolBuilder::new("x-001", "No logic").build().is_err());
    }

    #[test]
    fn test_build_checks_preconditions() {
        let result = ProtocolBuilder::new("x-001", "Bad confidence")
            .logic(Expression::literal("refer"))
            .min_confidence(1.5)
            .build();
        assert!(result.is_err());

        let result = ProtocolBuilder::new(" ", "Blank id")
            .logic(Expression::literal("refer"))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_inactive() {
        let rule = ProtocolBuilder::new("x-001", "Retired")
            .logic(Expression::literal("refer"))
            .inactive()
            .build()
            .unwrap();
        assert!(!rule.is_active());
    }

    #[test]
    fn test_threshold_protocol_shape() {
        let rule = threshold_protocol(
            "dm-a1c-001",
            "Elevated A1c",
            "a1c",
            ComparisonOp::Greater,
            6.5,
            "refer_endocrinology",
        )
        .build()
        .unwrap();

        assert_eq!(
            rule.logic.to_json(),
            json!({"if": [{">": [{"var": "a1c"}, 6.5]}, "refer_endocrinology", "no_action"]})
        );
        assert_eq!(rule.validation.required_fields, vec!["a1c".to_string()]);
    }

    #[test]
    fn test_clinical_shapes() {
        let med = medication_protocol("m-1", "Statin", "atorvastatin", "check_lipids")
            .build()
            .unwrap();
        assert_eq!(
            med.logic.to_json(),
            json!({"if": [
                {"has_medication": [{"var": "meds"}, "atorvastatin"]},
                "check_lipids",
                "no_action"
            ]})
        );

        let cond = condition_protocol("c-1", "Diabetes", "E11", "diabetic_foot_exam")
            .build()
            .unwrap();
        assert_eq!(cond.logic.result_literals(), vec!["diabetic_foot_exam", "no_action"]);

        let age = age_bucket_protocol("a-1", "Senior", 65.0, 120.0, "fall_risk_screen")
            .build()
            .unwrap();
        assert_eq!(age.logic.variables(), vec!["age"]);
        assert_eq!(age.validation.required_fields, vec!["age".to_string()]);
        let Expression::If { then, .. } = &age.logic else {
            panic!("expected if");
        };
        assert_eq!(**then, Expression::Literal(Value::string("fall_risk_screen")));
    }
}
