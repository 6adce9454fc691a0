//! Call-shape adapter
//!
//! Callers hand over their values in one of three shapes: a positional sequence, the
//! per-invocation arguments capture, or a record of named fields. [`CallView`] turns all
//! three into the same ordered, index-addressable view; records contribute their values
//! in key order and remember the key of every slot for strict-mode messages. Opaque
//! embedder objects count as records without fields.
use smallvec::SmallVec;
use strum::{Display, IntoStaticStr};

use crate::{
    error::{GuardError, GuardResult},
    value::Value,
};

static UNDEFINED: Value = Value::Undefined;

/// The accepted call-value shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum CallShape {
    Positional,
    Arguments,
    Named,
}

/// Address of one call-value slot in the caller's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    Index(usize),
    Key(&'a str),
}

/// Ordered view over the caller-supplied values.
#[derive(Debug, Clone)]
pub struct CallView<'a> {
    shape: CallShape,
    slots: SmallVec<[(Slot<'a>, &'a Value); 8]>,
}

impl<'a> CallView<'a> {
    /// Adapt `values` into a view. Any shape other than a sequence, an arguments capture
    /// or a record (opaque objects included) is a usage error.
    pub fn adapt(values: &'a Value) -> GuardResult<Self> {
        let (shape, slots) = match values {
            Value::Array(items) => (CallShape::Positional, Self::indexed(items)),
            Value::Arguments(items) => (CallShape::Arguments, Self::indexed(items)),
            Value::Object(record) => (
                CallShape::Named,
                record
                    .iter()
                    .map(|(key, value)| (Slot::Key(key.as_str()), value))
                    .collect(),
            ),
            Value::Opaque(_) => (CallShape::Named, SmallVec::new()),
            other => return Err(GuardError::InvalidCallValues { found: other.kind() }),
        };
        Ok(Self { shape, slots })
    }

    fn indexed(items: &'a [Value]) -> SmallVec<[(Slot<'a>, &'a Value); 8]> {
        items
            .iter()
            .enumerate()
            .map(|(index, value)| (Slot::Index(index), value))
            .collect()
    }

    pub fn shape(&self) -> CallShape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&'a Value> {
        self.slots.get(position).map(|(_, value)| *value)
    }

    /// The value at `position`, or `Undefined` past the end.
    pub fn value_at(&self, position: usize) -> &'a Value {
        self.get(position).unwrap_or(&UNDEFINED)
    }

    pub fn slot(&self, position: usize) -> Option<Slot<'a>> {
        self.slots.get(position).map(|(slot, _)| *slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot<'a>, &'a Value)> + '_ {
        self.slots.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Record;

    #[test]
    fn positional_and_arguments_shapes_are_indexed() {
        let list = Value::Array(vec!["a".into(), 1.into()]);
        let view = CallView::adapt(&list).unwrap();
        assert_eq!(view.shape(), CallShape::Positional);
        assert_eq!(view.len(), 2);
        assert_eq!(view.slot(1), Some(Slot::Index(1)));
        assert_eq!(view.get(0), Some(&Value::from("a")));
        assert_eq!(view.value_at(5), &Value::Undefined);

        let args = Value::arguments(["x".into()]);
        let view = CallView::adapt(&args).unwrap();
        assert_eq!(view.shape(), CallShape::Arguments);
        assert_eq!(view.value_at(0), &Value::from("x"));
    }

    #[test]
    fn named_records_follow_key_order() {
        let mut record = Record::new();
        record.insert("zeta".into(), 1.into());
        record.insert("alpha".into(), Value::Undefined);
        let value = Value::Object(record);
        let view = CallView::adapt(&value).unwrap();

        assert_eq!(view.shape(), CallShape::Named);
        let slots: Vec<_> = view.iter().map(|(slot, _)| slot).collect();
        assert_eq!(slots, [Slot::Key("zeta"), Slot::Key("alpha")]);
    }

    #[test]
    fn opaque_objects_are_records_without_fields() {
        #[derive(Debug)]
        struct Handle;
        impl crate::value::OpaqueObject for Handle {}

        let value = Value::opaque(Handle);
        let view = CallView::adapt(&value).unwrap();
        assert_eq!(view.shape(), CallShape::Named);
        assert!(view.is_empty());
        assert_eq!(view.value_at(0), &Value::Undefined);
    }

    #[test]
    fn other_shapes_are_usage_errors() {
        for value in [
            Value::Undefined,
            Value::Null,
            Value::from(1),
            Value::from("str"),
            Value::from(true),
            Value::function("f", |_| Value::Null),
            Value::from(regex::Regex::new("x").unwrap()),
            Value::from(chrono::Utc::now()),
        ] {
            let err = CallView::adapt(&value).unwrap_err();
            assert!(err.is_usage());
            assert!(err.to_string().contains("argument should be"), "{err}");
        }
    }
}
