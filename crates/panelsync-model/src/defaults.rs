//! Default-population functions
//!
//! The server fills in these fields on save whether or not the client sent
//! them. Each function only inserts absent keys and is idempotent, so a value
//! with its defaults attached compares equal to the value the server returns.
//!
//! Operation and grouping definitions are polymorphic: the object is
//! classified first and only the chosen variant's defaults are applied.

use panelsync_classify::shapes::{GroupingKind, OperationKind, GROUPING, OPERATION};
use panelsync_value::{insert_absent, DefaultsFn, OpaqueValue};
use serde_json::{json, Value};

use crate::charts::EsqlColumn;

/// Percentile used when a percentile operation omits it
pub const DEFAULT_PERCENTILE: u64 = 95;

/// Terms size used when a terms grouping omits it
pub const DEFAULT_TERMS_SIZE: u64 = 5;

/// Role an opaque sub-object plays, which decides its defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpaqueRole {
    /// Metric operation definition
    Operation,
    /// Bucket grouping definition
    Grouping,
    /// Axis settings (`x`, `left`, `right`)
    Axis,
    /// Legend settings
    Legend,
    /// Reference-line threshold
    Threshold,
    /// Pie value display
    ValueDisplay,
    /// No server defaults
    Plain,
}

impl OpaqueRole {
    /// Default-population function for the role
    #[must_use]
    pub fn defaults_fn(self) -> Option<DefaultsFn> {
        match self {
            Self::Operation => Some(operation_defaults),
            Self::Grouping => Some(grouping_defaults),
            Self::Axis => Some(axis_defaults),
            Self::Legend => Some(legend_defaults),
            Self::Threshold => Some(threshold_defaults),
            Self::ValueDisplay => Some(value_display_defaults),
            Self::Plain => None,
        }
    }

    /// Wrap a JSON value with the role's defaults attached
    #[inline]
    #[must_use]
    pub fn attach(self, value: Value) -> OpaqueValue {
        OpaqueValue::from_value(value, self.defaults_fn())
    }

    /// Attach the role's defaults to an existing value
    #[must_use]
    pub fn bind(self, value: OpaqueValue) -> OpaqueValue {
        match self.defaults_fn() {
            Some(apply) => value.with_defaults(apply),
            None => value,
        }
    }
}

/// Chart body element that can take an opaque role
///
/// Operation definitions take the role's defaults; ES|QL columns have none.
pub trait AttachRole: Sized {
    /// Attach `role` to the element
    #[must_use]
    fn attach_role(self, role: OpaqueRole) -> Self;
}

impl AttachRole for OpaqueValue {
    #[inline]
    fn attach_role(self, role: OpaqueRole) -> Self {
        role.bind(self)
    }
}

impl AttachRole for EsqlColumn {
    #[inline]
    fn attach_role(self, _role: OpaqueRole) -> Self {
        self
    }
}

macro_rules! role_deserializers {
    ($($name:ident => $role:ident),* $(,)?) => {
        $(
            #[doc = concat!("Deserializers attaching [`OpaqueRole::", stringify!($role), "`]")]
            pub mod $name {
                use serde::{Deserialize, Deserializer};

                use crate::defaults::{AttachRole, OpaqueRole};

                /// Single element
                ///
                /// # Errors
                /// Propagates the deserializer's error
                pub fn one<'de, D, T>(deserializer: D) -> Result<T, D::Error>
                where
                    D: Deserializer<'de>,
                    T: Deserialize<'de> + AttachRole,
                {
                    T::deserialize(deserializer).map(|v| v.attach_role(OpaqueRole::$role))
                }

                /// Optional element
                ///
                /// # Errors
                /// Propagates the deserializer's error
                pub fn opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
                where
                    D: Deserializer<'de>,
                    T: Deserialize<'de> + AttachRole,
                {
                    Option::<T>::deserialize(deserializer)
                        .map(|v| v.map(|v| v.attach_role(OpaqueRole::$role)))
                }

                /// List of elements
                ///
                /// # Errors
                /// Propagates the deserializer's error
                pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
                where
                    D: Deserializer<'de>,
                    T: Deserialize<'de> + AttachRole,
                {
                    Vec::<T>::deserialize(deserializer).map(|items| {
                        items
                            .into_iter()
                            .map(|v| v.attach_role(OpaqueRole::$role))
                            .collect()
                    })
                }
            }
        )*
    };
}

/// Serde `deserialize_with` helpers, one module per role
///
/// Opaque values serialize as plain JSON, so the role is lost on the way out.
/// Model fields name their role here to get it back on the way in.
pub mod de {
    role_deserializers! {
        operation => Operation,
        grouping => Grouping,
        axis => Axis,
        legend => Legend,
        threshold => Threshold,
        value_display => ValueDisplay,
    }
}

/// Operation definition with defaults attached
#[inline]
#[must_use]
pub fn operation(value: Value) -> OpaqueValue {
    OpaqueRole::Operation.attach(value)
}

/// Grouping definition with defaults attached
#[inline]
#[must_use]
pub fn grouping(value: Value) -> OpaqueValue {
    OpaqueRole::Grouping.attach(value)
}

/// Axis settings with defaults attached
#[inline]
#[must_use]
pub fn axis(value: Value) -> OpaqueValue {
    OpaqueRole::Axis.attach(value)
}

/// Legend settings with defaults attached
#[inline]
#[must_use]
pub fn legend(value: Value) -> OpaqueValue {
    OpaqueRole::Legend.attach(value)
}

/// Threshold with defaults attached
#[inline]
#[must_use]
pub fn threshold(value: Value) -> OpaqueValue {
    OpaqueRole::Threshold.attach(value)
}

/// Value display with defaults attached
#[inline]
#[must_use]
pub fn value_display(value: Value) -> OpaqueValue {
    OpaqueRole::ValueDisplay.attach(value)
}

/// Opaque value without defaults
#[inline]
#[must_use]
pub fn plain(value: Value) -> OpaqueValue {
    OpaqueRole::Plain.attach(value)
}

/// Field metrics and formulas get a number format; percentiles get 95
pub fn operation_defaults(value: &mut Value) {
    let Ok(chosen) = OPERATION.classify(value) else {
        return;
    };
    let is_percentile = value.get("operation").and_then(Value::as_str) == Some("percentile");
    let Some(map) = value.as_object_mut() else {
        return;
    };
    match chosen.kind {
        OperationKind::FieldMetric => {
            insert_absent(map, "format", json!({"type": "number"}));
            if is_percentile {
                insert_absent(map, "percentile", json!(DEFAULT_PERCENTILE));
            }
        }
        OperationKind::Formula => insert_absent(map, "format", json!({"type": "number"})),
        OperationKind::StaticValue => {}
    }
}

/// Per-variant grouping defaults
pub fn grouping_defaults(value: &mut Value) {
    let Ok(chosen) = GROUPING.classify(value) else {
        return;
    };
    let Some(map) = value.as_object_mut() else {
        return;
    };
    match chosen.kind {
        GroupingKind::Terms => insert_absent(map, "size", json!(DEFAULT_TERMS_SIZE)),
        GroupingKind::DateHistogram => {
            insert_absent(map, "suggested_interval", json!("auto"));
            insert_absent(map, "use_original_time_range", json!(true));
        }
        GroupingKind::Intervals => insert_absent(map, "granularity", json!("auto")),
        GroupingKind::Filters => {}
    }
}

/// Grid lines and ticks on; value axes scale linearly
pub fn axis_defaults(value: &mut Value) {
    let Some(map) = value.as_object_mut() else {
        return;
    };
    for name in ["x", "left", "right"] {
        let Some(axis) = map.get_mut(name).and_then(Value::as_object_mut) else {
            continue;
        };
        insert_absent(axis, "grid", json!(true));
        insert_absent(axis, "ticks", json!(true));
        if name != "x" {
            insert_absent(axis, "scale", json!("linear"));
        }
    }
}

/// Visible legend on the right
pub fn legend_defaults(value: &mut Value) {
    if let Some(map) = value.as_object_mut() {
        insert_absent(map, "visible", json!(true));
        insert_absent(map, "position", json!("right"));
    }
}

/// Solid one-pixel line, no fill
pub fn threshold_defaults(value: &mut Value) {
    if let Some(map) = value.as_object_mut() {
        insert_absent(map, "line_style", json!("solid"));
        insert_absent(map, "line_width", json!(1));
        insert_absent(map, "icon_position", json!("auto"));
        insert_absent(map, "fill", json!("none"));
    }
}

/// Pie slices show percentages
pub fn value_display_defaults(value: &mut Value) {
    if let Some(map) = value.as_object_mut() {
        insert_absent(map, "mode", json!("percentage"));
    }
}
