//! Rhai engine setup and value conversion.

use std::path::Path;

use hookline_core::{ObjectRef, Payload, TypeRef, Variant};
use rhai::{AST, Dynamic, Engine};
use tracing::debug;

use crate::config::ScriptLimits;
use crate::types::{PluginError, PluginResult};

/// Build an engine with the given limits and the hookline script API.
pub fn build_engine(limits: &ScriptLimits) -> Engine {
    let mut engine = Engine::new();

    engine.set_max_expr_depths(limits.max_expr_depth, limits.max_expr_depth);
    engine.set_max_call_levels(limits.max_call_levels);
    engine.set_max_operations(limits.max_operations);
    engine.set_max_string_size(limits.max_string_size);
    engine.set_max_array_size(limits.max_array_size);
    engine.set_max_map_size(limits.max_map_size);

    register_api(&mut engine);
    engine
}

fn register_api(engine: &mut Engine) {
    engine.register_fn("log_info", |msg: &str| {
        tracing::info!(target: "plugin", "{}", msg);
    });

    engine.register_fn("log_warn", |msg: &str| {
        tracing::warn!(target: "plugin", "{}", msg);
    });

    engine.register_fn("log_error", |msg: &str| {
        tracing::error!(target: "plugin", "{}", msg);
    });

    // Host references are opaque to scripts apart from their names.
    engine
        .register_type_with_name::<TypeRef>("TypeRef")
        .register_fn("full_name", |r: &mut TypeRef| r.full_name().unwrap_or_default())
        .register_fn("is_alive", |r: &mut TypeRef| r.get().is_some());

    engine
        .register_type_with_name::<ObjectRef>("ObjectRef")
        .register_fn("full_name", |r: &mut ObjectRef| r.full_name().unwrap_or_default())
        .register_fn("is_alive", |r: &mut ObjectRef| r.get().is_some());
}

/// Compile a script file.
pub fn compile(engine: &Engine, name: &str, path: &Path) -> PluginResult<AST> {
    if !path.is_file() {
        return Err(PluginError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let code = std::fs::read_to_string(path)?;
    engine.compile(&code).map_err(|e| PluginError::LoadError {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Convert a variant to a Rhai value.
///
/// `None` and null array elements both become unit.
pub fn variant_to_dynamic(value: &Variant) -> Dynamic {
    match value {
        Variant::None => Dynamic::UNIT,
        Variant::Boolean(b) => Dynamic::from(*b),
        Variant::Integer(i) => Dynamic::from(rhai::INT::from(*i)),
        Variant::Float(f) => Dynamic::from(rhai::FLOAT::from(*f)),
        Variant::String(s) => Dynamic::from(s.clone()),
        Variant::TypeRef(r) => Dynamic::from(r.clone()),
        Variant::ObjectRef(r) => Dynamic::from(r.clone()),
        Variant::Array(elements) => Dynamic::from_array(
            elements
                .iter()
                .map(|element| element.as_ref().map_or(Dynamic::UNIT, variant_to_dynamic))
                .collect(),
        ),
    }
}

/// Convert a Rhai value to a variant.
///
/// Integers outside the 32-bit range saturate. Unit inside an array is a
/// null element. Values with no variant counterpart (maps, closures,
/// timestamps) become `None`.
pub fn dynamic_to_variant(value: &Dynamic) -> Variant {
    if value.is_unit() {
        Variant::None
    } else if let Ok(b) = value.as_bool() {
        Variant::Boolean(b)
    } else if let Ok(i) = value.as_int() {
        Variant::Integer(i.clamp(i32::MIN.into(), i32::MAX.into()) as i32)
    } else if let Ok(f) = value.as_float() {
        Variant::Float(f as f32)
    } else if value.is_string() {
        Variant::String(value.clone().into_string().unwrap_or_default())
    } else if value.is::<TypeRef>() {
        Variant::TypeRef(value.clone().cast::<TypeRef>())
    } else if value.is::<ObjectRef>() {
        Variant::ObjectRef(value.clone().cast::<ObjectRef>())
    } else if value.is_array() {
        let elements = value.clone().into_array().unwrap_or_default();
        Variant::Array(
            elements
                .iter()
                .map(|element| (!element.is_unit()).then(|| dynamic_to_variant(element)))
                .collect(),
        )
    } else {
        debug!(type_name = value.type_name(), "Script value has no variant form");
        Variant::None
    }
}

/// Convert a payload to a Rhai array.
pub fn payload_to_array(payload: &Payload) -> rhai::Array {
    payload.iter().map(variant_to_dynamic).collect()
}

/// Convert a Rhai array to a payload.
pub fn array_to_payload(array: &rhai::Array) -> Payload {
    array.iter().map(dynamic_to_variant).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_dynamic_round_trip_keeps_null_elements() {
        let value = Variant::array([Some(Variant::integer(1)), None, Some(Variant::string("a"))]);
        assert_eq!(dynamic_to_variant(&variant_to_dynamic(&value)), value);
    }

    #[test]
    fn test_none_element_becomes_null_slot() {
        let value = Variant::array([Some(Variant::None), Some(Variant::integer(2))]);
        assert_eq!(
            dynamic_to_variant(&variant_to_dynamic(&value)),
            Variant::array([None, Some(Variant::integer(2))])
        );
    }

    #[test]
    fn test_integers_saturate() {
        let big = Dynamic::from(rhai::INT::MAX);
        assert_eq!(dynamic_to_variant(&big), Variant::Integer(i32::MAX));
    }

    #[test]
    fn test_maps_become_none() {
        let map = Dynamic::from_map(rhai::Map::new());
        assert_eq!(dynamic_to_variant(&map), Variant::None);
    }

    #[test]
    fn test_engine_limits() {
        let limits = ScriptLimits {
            max_operations: 100,
            ..ScriptLimits::default()
        };
        let engine = build_engine(&limits);
        assert!(engine.eval::<rhai::INT>("let x = 0; loop { x += 1; }").is_err());
        assert_eq!(engine.eval::<rhai::INT>("40 + 2").unwrap(), 42);
    }
}
