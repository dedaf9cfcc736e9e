//! The expression evaluator.
//!
//! Expressions are small literal/operator trees carried verbatim from
//! the parsed document. A scalar evaluates to itself; an object with a
//! single `$`-prefixed key applies an operator. Evaluation is recursive
//! and side-effect free apart from the `$random` operators.

use std::sync::Arc;

use rand::RngExt;
use serde_json::Value as Json;

use flowkit_core::{config::Expr, value::Value};

use super::variables::VariableStore;
use crate::error::Error;

/// Evaluates expressions against a shared [`VariableStore`].
pub struct Evaluator {
    variables: Arc<VariableStore>,
}

impl Evaluator {
    pub fn new(variables: Arc<VariableStore>) -> Self {
        Self { variables }
    }

    /// Evaluates an expression to a scalar value.
    pub fn evaluate(&self, expr: &Expr) -> Result<Value, Error> {
        match expr {
            Json::Number(_) | Json::String(_) | Json::Bool(_) => Value::from_json(expr)
                .ok_or_else(|| Error::execution(format!("invalid literal: {expr}"))),
            Json::Object(map) => {
                if let Some(name) = map.get("$var") {
                    return self.var(name);
                }
                if let Some(probability) = map.get("$random-bool") {
                    return self.random_bool(probability);
                }
                if let Some(spec) = map.get("$random") {
                    return self.random(spec);
                }
                if let Some(operands) = map.get("$add") {
                    return self.add(operands);
                }
                if let Some(operands) = map.get("$subtract") {
                    return self.numeric_binary(operands, "$subtract", |a, b| a - b);
                }
                if let Some(operands) = map.get("$multiply") {
                    return self.numeric_binary(operands, "$multiply", |a, b| a * b);
                }
                if let Some(operands) = map.get("$eq") {
                    let (a, b) = self.binary_operands(operands, "$eq")?;
                    return Ok(Value::Bool(a == b));
                }
                if let Some(operands) = map.get("$gt") {
                    let (a, b) = self.binary_numbers(operands, "$gt")?;
                    return Ok(Value::Bool(a > b));
                }
                if let Some(operands) = map.get("$and") {
                    return self.logical(operands, "$and", |acc, v| acc && v);
                }
                if let Some(operands) = map.get("$or") {
                    return self.logical(operands, "$or", |acc, v| acc || v);
                }
                if let Some(spec) = map.get("$if") {
                    return self.conditional(spec);
                }
                Err(Error::execution(format!("unknown expression: {expr}")))
            }
            Json::Null | Json::Array(_) => {
                Err(Error::execution(format!("invalid expression: {expr}")))
            }
        }
    }

    /// Evaluates and coerces the result to a boolean.
    ///
    /// Any scalar coerces: `0`, `NaN`, `""`, and `false` are falsy.
    pub fn evaluate_condition(&self, expr: &Expr) -> Result<bool, Error> {
        Ok(self.evaluate(expr)?.is_truthy())
    }

    /// Evaluates and requires a numeric result.
    pub fn evaluate_number(&self, expr: &Expr) -> Result<f64, Error> {
        let value = self.evaluate(expr)?;
        value.as_number().ok_or_else(|| {
            Error::execution(format!("expected number, got {}", value.type_name()))
        })
    }

    /// Evaluates and stringifies the result.
    pub fn evaluate_string(&self, expr: &Expr) -> Result<String, Error> {
        Ok(self.evaluate(expr)?.to_string())
    }

    fn var(&self, name: &Json) -> Result<Value, Error> {
        let name = name
            .as_str()
            .ok_or_else(|| Error::execution(format!("$var expects a name, got {name}")))?;
        self.variables
            .get(name)
            .ok_or_else(|| Error::execution(format!("undefined variable: {name}")))
    }

    fn random_bool(&self, probability: &Json) -> Result<Value, Error> {
        let p = probability.as_f64().ok_or_else(|| {
            Error::execution(format!("$random-bool expects a probability, got {probability}"))
        })?;
        Ok(Value::Bool(rand::rng().random_bool(p.clamp(0.0, 1.0))))
    }

    fn random(&self, spec: &Json) -> Result<Value, Error> {
        let obj = spec
            .as_object()
            .ok_or_else(|| Error::execution(format!("$random expects an object, got {spec}")))?;
        if let Some(probability) = obj.get("probability") {
            return self.random_bool(probability);
        }
        let min = obj.get("min").and_then(Json::as_i64);
        let max = obj.get("max").and_then(Json::as_i64);
        match (min, max) {
            (Some(min), Some(max)) if min <= max => {
                let n = rand::rng().random_range(min..=max);
                Ok(Value::Number(n as f64))
            }
            _ => Err(Error::execution(format!(
                "$random expects integer min <= max or a probability, got {spec}"
            ))),
        }
    }

    // Pairwise left fold; falls back to string concatenation when
    // either operand is non-numeric.
    fn add(&self, operands: &Json) -> Result<Value, Error> {
        let items = self.operand_list(operands, "$add", 2)?;
        let mut acc = self.evaluate(&items[0])?;
        for item in &items[1..] {
            let rhs = self.evaluate(item)?;
            acc = match (acc.as_number(), rhs.as_number()) {
                (Some(a), Some(b)) => Value::Number(a + b),
                _ => Value::Str(format!("{acc}{rhs}")),
            };
        }
        Ok(acc)
    }

    fn numeric_binary(
        &self,
        operands: &Json,
        op: &str,
        apply: impl Fn(f64, f64) -> f64,
    ) -> Result<Value, Error> {
        let (a, b) = self.binary_numbers(operands, op)?;
        Ok(Value::Number(apply(a, b)))
    }

    fn logical(
        &self,
        operands: &Json,
        op: &str,
        fold: impl Fn(bool, bool) -> bool,
    ) -> Result<Value, Error> {
        let items = self.operand_list(operands, op, 2)?;
        let mut acc = self.evaluate(&items[0])?.is_truthy();
        for item in &items[1..] {
            acc = fold(acc, self.evaluate(item)?.is_truthy());
        }
        Ok(Value::Bool(acc))
    }

    fn conditional(&self, spec: &Json) -> Result<Value, Error> {
        let obj = spec
            .as_object()
            .ok_or_else(|| Error::execution(format!("$if expects an object, got {spec}")))?;
        let condition = obj
            .get("condition")
            .ok_or_else(|| Error::execution("$if requires a condition".to_string()))?;
        if self.evaluate_condition(condition)? {
            let then = obj
                .get("then")
                .ok_or_else(|| Error::execution("$if requires a then branch".to_string()))?;
            self.evaluate(then)
        } else {
            match obj.get("else") {
                Some(other) => self.evaluate(other),
                None => Ok(Value::Bool(false)),
            }
        }
    }

    fn operand_list<'e>(
        &self,
        operands: &'e Json,
        op: &str,
        min_len: usize,
    ) -> Result<&'e Vec<Json>, Error> {
        match operands.as_array() {
            Some(items) if items.len() >= min_len => Ok(items),
            _ => Err(Error::execution(format!(
                "{op} expects at least {min_len} operands, got {operands}"
            ))),
        }
    }

    fn binary_operands(&self, operands: &Json, op: &str) -> Result<(Value, Value), Error> {
        let items = self.operand_list(operands, op, 2)?;
        Ok((self.evaluate(&items[0])?, self.evaluate(&items[1])?))
    }

    fn binary_numbers(&self, operands: &Json, op: &str) -> Result<(f64, f64), Error> {
        let (a, b) = self.binary_operands(operands, op)?;
        match (a.as_number(), b.as_number()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(Error::execution(format!(
                "{op} requires numeric operands, got {} and {}",
                a.type_name(),
                b.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn evaluator() -> (Evaluator, Arc<VariableStore>) {
        let variables = Arc::new(VariableStore::new());
        (Evaluator::new(Arc::clone(&variables)), variables)
    }

    #[test]
    fn literals_evaluate_to_themselves() {
        let (eval, _) = evaluator();
        assert_eq!(eval.evaluate(&json!(3.5)).unwrap(), Value::Number(3.5));
        assert_eq!(eval.evaluate(&json!("hi")).unwrap(), Value::Str("hi".into()));
        assert_eq!(eval.evaluate(&json!(true)).unwrap(), Value::Bool(true));
    }

    #[test]
    fn var_lookup_and_undefined() {
        let (eval, vars) = evaluator();
        vars.set("x", 3.0);
        assert_eq!(
            eval.evaluate(&json!({"$var": "x"})).unwrap(),
            Value::Number(3.0)
        );
        assert!(eval.evaluate(&json!({"$var": "y"})).is_err());
    }

    #[test]
    fn add_is_variadic_with_concat_fallback() {
        let (eval, vars) = evaluator();
        vars.set("x", 3.0);
        assert_eq!(
            eval.evaluate(&json!({"$add": [{"$var": "x"}, 2]})).unwrap(),
            Value::Number(5.0)
        );
        assert_eq!(
            eval.evaluate(&json!({"$add": [1, 2, 3]})).unwrap(),
            Value::Number(6.0)
        );
        assert_eq!(
            eval.evaluate(&json!({"$add": ["n=", 4]})).unwrap(),
            Value::Str("n=4".into())
        );
    }

    #[test]
    fn subtract_and_multiply_require_numbers() {
        let (eval, _) = evaluator();
        assert_eq!(
            eval.evaluate(&json!({"$subtract": [5, 2]})).unwrap(),
            Value::Number(3.0)
        );
        assert_eq!(
            eval.evaluate(&json!({"$multiply": [4, 2.5]})).unwrap(),
            Value::Number(10.0)
        );
        assert!(eval.evaluate(&json!({"$subtract": [5, "a"]})).is_err());
    }

    #[test]
    fn gt_is_numeric_only() {
        let (eval, _) = evaluator();
        assert_eq!(
            eval.evaluate(&json!({"$gt": [2, 1]})).unwrap(),
            Value::Bool(true)
        );
        assert!(eval.evaluate(&json!({"$gt": [1, "a"]})).is_err());
    }

    #[test]
    fn eq_is_structural() {
        let (eval, _) = evaluator();
        assert_eq!(
            eval.evaluate(&json!({"$eq": ["a", "a"]})).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval.evaluate(&json!({"$eq": [1, "1"]})).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn logical_operators_coerce() {
        let (eval, _) = evaluator();
        assert_eq!(
            eval.evaluate(&json!({"$and": [1, "yes"]})).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval.evaluate(&json!({"$and": [1, 0]})).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            eval.evaluate(&json!({"$or": [0, "", true]})).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn if_with_and_without_else() {
        let (eval, _) = evaluator();
        assert_eq!(
            eval.evaluate(&json!({"$if": {"condition": true, "then": 1, "else": 2}}))
                .unwrap(),
            Value::Number(1.0)
        );
        assert_eq!(
            eval.evaluate(&json!({"$if": {"condition": false, "then": 1, "else": 2}}))
                .unwrap(),
            Value::Number(2.0)
        );
        assert_eq!(
            eval.evaluate(&json!({"$if": {"condition": false, "then": 1}}))
                .unwrap(),
            Value::Bool(false),
            "missing else defaults to false"
        );
    }

    #[test]
    fn malformed_expressions_error() {
        let (eval, _) = evaluator();
        assert!(eval.evaluate(&json!(null)).is_err());
        assert!(eval.evaluate(&json!([1, 2])).is_err());
        assert!(eval.evaluate(&json!({"$nope": 1})).is_err());
        assert!(eval.evaluate(&json!({"$add": [1]})).is_err());
    }

    #[test]
    fn random_range_is_inclusive() {
        let (eval, _) = evaluator();
        for _ in 0..50 {
            let value = eval
                .evaluate(&json!({"$random": {"min": 1, "max": 3}}))
                .unwrap();
            let n = value.as_number().unwrap();
            assert!((1.0..=3.0).contains(&n));
            assert_eq!(n.fract(), 0.0);
        }
        assert!(eval.evaluate(&json!({"$random": {"min": 3, "max": 1}})).is_err());
    }

    #[test]
    fn random_bool_degenerate_probabilities() {
        let (eval, _) = evaluator();
        assert_eq!(
            eval.evaluate(&json!({"$random-bool": 0.0})).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            eval.evaluate(&json!({"$random-bool": 1.0})).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval.evaluate(&json!({"$random": {"probability": 1.0}})).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn typed_convenience_evaluators() {
        let (eval, vars) = evaluator();
        vars.set("x", 3.0);
        assert_eq!(eval.evaluate_number(&json!({"$var": "x"})).unwrap(), 3.0);
        assert!(eval.evaluate_number(&json!("abc")).is_err());
        assert_eq!(eval.evaluate_string(&json!(2.0)).unwrap(), "2");
        assert!(eval.evaluate_condition(&json!(0)).is_ok_and(|b| !b));
        assert!(eval.evaluate_condition(&json!("x")).is_ok_and(|b| b));
    }
}
