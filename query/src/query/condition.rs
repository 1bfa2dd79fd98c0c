//! Column normalization
//!
//! Turns one raw [`Column`] into a [`Predicate`]. The column is only
//! borrowed, so the same input can be converted any number of times.

use std::collections::HashSet;

use bson::{Bson, Document};

use super::error::QueryError;
use super::types::{Column, Logic, Operator};
use crate::utils::document::{json_to_bson, parse_object_id};

/// MongoDB primary key field
pub const PRIMARY_KEY: &str = "_id";

/// Suffix that tags a field for ObjectId coercion
pub const OID_SUFFIX: &str = ":oid";

/// Operator-wrapped operand of a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Bson),
    Ne(Bson),
    Gt(Bson),
    Gte(Bson),
    Lt(Bson),
    Lte(Bson),
    /// Case-insensitive match on an escaped pattern
    Regex(String),
    In(Vec<String>),
    NotIn(Vec<String>),
}

impl Condition {
    pub fn to_bson(&self) -> Bson {
        match self {
            Self::Eq(v) => v.clone(),
            Self::Ne(v) => wrap("$ne", v.clone()),
            Self::Gt(v) => wrap("$gt", v.clone()),
            Self::Gte(v) => wrap("$gte", v.clone()),
            Self::Lt(v) => wrap("$lt", v.clone()),
            Self::Lte(v) => wrap("$lte", v.clone()),
            Self::Regex(pattern) => {
                let mut doc = Document::new();
                doc.insert("$regex", pattern.clone());
                doc.insert("$options", "i");
                Bson::Document(doc)
            }
            Self::In(values) => wrap("$in", string_array(values)),
            Self::NotIn(values) => wrap("$nin", string_array(values)),
        }
    }
}

fn wrap(key: &str, value: Bson) -> Bson {
    let mut doc = Document::new();
    doc.insert(key, value);
    Bson::Document(doc)
}

fn string_array(values: &[String]) -> Bson {
    Bson::Array(values.iter().cloned().map(Bson::String).collect())
}

/// Single-field predicate: `{field: condition}`
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub condition: Condition,
}

impl Predicate {
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(self.field.clone(), self.condition.to_bson());
        doc
    }
}

impl Column {
    /// Reject names outside the whitelist; empty names are never allowed
    pub(crate) fn check_name(&self, whitelist: &HashSet<String>) -> Result<(), QueryError> {
        if self.name.is_empty() || !whitelist.contains(&self.name) {
            return Err(QueryError::disallowed_name(&self.name));
        }
        Ok(())
    }

    /// Normalize the logic token towards the next column
    pub(crate) fn normalized_logic(&self) -> Result<Logic, QueryError> {
        Logic::parse(&self.logic).ok_or_else(|| QueryError::unknown_logic(&self.name, &self.logic))
    }

    /// Convert into a predicate plus the normalized logic token
    pub(crate) fn convert(&self) -> Result<(Predicate, Logic), QueryError> {
        self.check_valid()?;

        let (field, value) = match parse_object_id(&self.value) {
            Some(oid) => {
                let field = if self.name == "id" {
                    PRIMARY_KEY.to_string()
                } else {
                    self.name
                        .strip_suffix(OID_SUFFIX)
                        .unwrap_or(&self.name)
                        .to_string()
                };
                (field, Bson::ObjectId(oid))
            }
            None => (self.name.clone(), json_to_bson(&self.value)),
        };

        let operator = Operator::parse(&self.exp)
            .ok_or_else(|| QueryError::unknown_operator(&self.name, &self.exp))?;

        let condition = match operator {
            Operator::Eq => Condition::Eq(value),
            Operator::Neq => Condition::Ne(value),
            Operator::Gt => Condition::Gt(value),
            Operator::Gte => Condition::Gte(value),
            Operator::Lt => Condition::Lt(value),
            Operator::Lte => Condition::Lte(value),
            Operator::Like => Condition::Regex(regex::escape(&self.value_text(&value))),
            Operator::In | Operator::NotIn => {
                let Bson::String(s) = &value else {
                    return Err(QueryError::InvalidSetValue {
                        name: self.name.clone(),
                        exp: self.exp.clone(),
                        value: self.value.to_string(),
                    });
                };
                let values = s.split(',').map(str::to_string).collect();
                if operator == Operator::In {
                    Condition::In(values)
                } else {
                    Condition::NotIn(values)
                }
            }
        };

        let logic = self.normalized_logic()?;

        tracing::trace!(
            field = %field,
            operator = %operator,
            logic = %logic,
            "Converted column"
        );

        Ok((Predicate { field, condition }, logic))
    }

    /// Text form of the operand used for pattern matching
    fn value_text(&self, value: &Bson) -> String {
        match value {
            Bson::String(s) => s.clone(),
            Bson::ObjectId(oid) => oid.to_hex(),
            _ => self.value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use bson::oid::ObjectId;
    use serde_json::json;

    const OID_HEX: &str = "507f1f77bcf86cd799439011";

    fn predicate(column: Column) -> Predicate {
        column.convert().unwrap().0
    }

    #[test]
    fn eq_keeps_plain_value() {
        let p = predicate(Column::new("age", "", 18, ""));
        assert_eq!(p.to_document(), doc! {"age": 18_i64});
    }

    #[test]
    fn comparison_operators_wrap_value() {
        let cases = [
            ("!=", "$ne"),
            ("gt", "$gt"),
            (">=", "$gte"),
            ("LT", "$lt"),
            ("<=", "$lte"),
        ];
        for (exp, key) in cases {
            let p = predicate(Column::new("age", exp, 18, ""));
            let mut inner = Document::new();
            inner.insert(key, 18_i64);
            assert_eq!(p.to_document(), doc! {"age": inner}, "exp {exp}");
        }
    }

    #[test]
    fn like_escapes_regex_metacharacters() {
        let p = predicate(Column::new("title", "like", "50% off (a.b*)", ""));
        assert_eq!(
            p.to_document(),
            doc! {"title": {"$regex": r"50% off \(a\.b\*\)", "$options": "i"}}
        );
    }

    #[test]
    fn like_on_number_uses_json_text() {
        let p = predicate(Column::new("code", "like", 1.5, ""));
        assert_eq!(p.condition, Condition::Regex(r"1\.5".to_string()));
    }

    #[test]
    fn in_splits_comma_separated_string() {
        let p = predicate(Column::new("status", "in", "a,b,c", ""));
        assert_eq!(p.to_document(), doc! {"status": {"$in": ["a", "b", "c"]}});

        let p = predicate(Column::new("status", "not in", "a", ""));
        assert_eq!(p.to_document(), doc! {"status": {"$nin": ["a"]}});
    }

    #[test]
    fn in_rejects_non_string_value() {
        let err = Column::new("status", "in", 3, "").convert().unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidSetValue {
                name: "status".to_string(),
                exp: "in".to_string(),
                value: "3".to_string(),
            }
        );
    }

    #[test]
    fn id_with_object_id_value_becomes_primary_key() {
        let p = predicate(Column::new("id", "eq", OID_HEX, ""));
        let oid = ObjectId::parse_str(OID_HEX).unwrap();
        assert_eq!(p.field, PRIMARY_KEY);
        assert_eq!(p.to_document(), doc! {"_id": oid});
    }

    #[test]
    fn oid_suffix_is_stripped() {
        let p = predicate(Column::new("owner_id:oid", "neq", OID_HEX, ""));
        let oid = ObjectId::parse_str(OID_HEX).unwrap();
        assert_eq!(p.to_document(), doc! {"owner_id": {"$ne": oid}});
    }

    #[test]
    fn oid_suffix_kept_for_non_object_id_value() {
        let p = predicate(Column::new("owner_id:oid", "", "short", ""));
        assert_eq!(p.field, "owner_id:oid");
    }

    #[test]
    fn id_without_object_id_value_is_unchanged() {
        let p = predicate(Column::new("id", "", 7, ""));
        assert_eq!(p.to_document(), doc! {"id": 7_i64});
    }

    #[test]
    fn empty_name_rejected() {
        let err = Column::new("", "", 1, "").convert().unwrap_err();
        assert_eq!(err, QueryError::EmptyName);
    }

    #[test]
    fn nil_value_rejected() {
        let err = Column::new("a", "", json!(null), "").convert().unwrap_err();
        assert_eq!(err, QueryError::NilValue { name: "a".into() });
    }

    #[test]
    fn unknown_operator_rejected() {
        let err = Column::new("x", "between", 1, "").convert().unwrap_err();
        assert_eq!(
            err,
            QueryError::UnknownOperator {
                name: "x".into(),
                exp: "between".into(),
            }
        );
    }

    #[test]
    fn unknown_logic_rejected() {
        let err = Column::new("x", "", 1, "xor").convert().unwrap_err();
        assert!(matches!(err, QueryError::UnknownLogic { logic, .. } if logic == "xor"));
    }

    #[test]
    fn logic_is_normalized() {
        let (_, logic) = Column::new("x", "", 1, "||").convert().unwrap();
        assert_eq!(logic, Logic::Or);
        let (_, logic) = Column::new("x", "", 1, "").convert().unwrap();
        assert_eq!(logic, Logic::And);
    }

    #[test]
    fn convert_leaves_column_untouched() {
        let column = Column::new("id", "LIKE", OID_HEX, "OR");
        let before = column.clone();
        let first = column.convert().unwrap();
        let second = column.convert().unwrap();
        assert_eq!(column, before);
        assert_eq!(first, second);
    }

    #[test]
    fn check_name_against_whitelist() {
        let whitelist: HashSet<String> = ["a".to_string()].into_iter().collect();
        assert!(Column::new("a", "", 1, "").check_name(&whitelist).is_ok());
        assert_eq!(
            Column::new("b", "", 1, "").check_name(&whitelist),
            Err(QueryError::DisallowedName { name: "b".into() })
        );
        assert!(Column::new("", "", 1, "").check_name(&whitelist).is_err());
    }
}
